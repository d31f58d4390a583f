//! Results of a single session run.

/// The three outcomes a run surfaces to the process layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// Rejected locally before any network call (e.g. empty room reference).
    InvalidInput,
    /// Any protocol, transport or input failure during the pipeline.
    OperationFailed,
}

/// What the message framer delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Standard input was empty; no send was issued.
    NothingSent,
    /// `messages` sends succeeded, in input order.
    Sent { messages: usize },
}

impl Delivery {
    pub fn messages(&self) -> usize {
        match self {
            Self::NothingSent => 0,
            Self::Sent { messages } => *messages,
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// The resolved room id the message went to.
    pub room_id: String,
    /// Whether this run had to join the room.
    pub joined: bool,
    pub delivery: Delivery,
}
