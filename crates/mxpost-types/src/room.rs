//! Room references: a literal room id or an alias to be resolved.

use std::fmt;

use crate::error::SessionError;

/// Leading character that marks a room reference as an alias.
pub const ALIAS_SIGIL: char = '#';

/// A configured room reference, classified but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomTarget {
    /// Already a room id; used as-is.
    Id(String),
    /// Alias such as `#room:example.org`; must be resolved server-side.
    Alias(String),
}

impl RoomTarget {
    /// Classify a room reference.
    ///
    /// An empty reference is invalid input. Anything starting with
    /// [`ALIAS_SIGIL`] is an alias; everything else is taken as a room id.
    pub fn parse(reference: &str) -> Result<Self, SessionError> {
        if reference.is_empty() {
            return Err(SessionError::InvalidInput(
                "room id or alias should not be empty".to_string(),
            ));
        }

        if reference.starts_with(ALIAS_SIGIL) {
            Ok(Self::Alias(reference.to_string()))
        } else {
            Ok(Self::Id(reference.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Id(s) | Self::Alias(s) => s,
        }
    }
}

impl fmt::Display for RoomTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reference_is_invalid_input() {
        let err = RoomTarget::parse("").unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput(_)));
    }

    #[test]
    fn test_alias_is_recognized_by_sigil() {
        let target = RoomTarget::parse("#general:example.org").unwrap();
        assert!(matches!(target, RoomTarget::Alias(_)));
        assert_eq!(target.as_str(), "#general:example.org");
    }

    #[test]
    fn test_plain_reference_is_room_id() {
        let target = RoomTarget::parse("!abc123:example.org").unwrap();
        assert_eq!(target, RoomTarget::Id("!abc123:example.org".to_string()));
    }

    #[test]
    fn test_sigil_only_counts_at_start() {
        let target = RoomTarget::parse("room#1").unwrap();
        assert_eq!(target, RoomTarget::Id("room#1".to_string()));
    }
}
