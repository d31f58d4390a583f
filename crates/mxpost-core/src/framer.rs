//! MessageFramer -- turns standard input into one or more room messages.
//!
//! Two mutually exclusive modes, selected by [`MaxChars`]:
//!
//! - **Bounded**: read at most `limit + 1` characters. Empty input sends
//!   nothing; input of up to `limit` characters is sent verbatim; longer input
//!   is cut to `limit - 3` characters followed by [`TRUNCATION_MARKER`].
//! - **Unbounded**: one send per input line, as soon as the line is complete.
//!   A line ends at `\n`, `\r` or `\r\n`. Nothing is buffered beyond the
//!   current line.
//!
//! Input is decoded as UTF-8 with invalid sequences replaced by U+FFFD.
//! Characters are Unicode scalar values.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use mxpost_types::config::{MaxChars, TRUNCATION_MARKER};
use mxpost_types::error::SessionError;
use mxpost_types::session::Delivery;

use crate::client::MatrixClient;

/// Delivers standard input to a room according to the configured mode.
#[derive(Debug, Clone, Copy)]
pub struct MessageFramer {
    mode: MaxChars,
}

impl MessageFramer {
    pub fn new(mode: MaxChars) -> Self {
        Self { mode }
    }

    /// Read `input` and send the resulting message(s) to `room_id`.
    ///
    /// Sends go straight to the client; the first failed send aborts delivery
    /// and is returned unchanged.
    pub async fn deliver<C, R>(
        &self,
        client: &C,
        room_id: &str,
        input: &mut R,
    ) -> Result<Delivery, SessionError>
    where
        C: MatrixClient,
        R: AsyncBufRead + Unpin + Send,
    {
        match self.mode {
            MaxChars::Limited(limit) => deliver_bounded(client, room_id, limit, input).await,
            MaxChars::Unlimited => deliver_lines(client, room_id, input).await,
        }
    }

    /// The verbose summary line for a finished delivery.
    pub fn summary(&self, delivery: Delivery, room_id: &str) -> String {
        match (delivery, self.mode) {
            (Delivery::NothingSent, _) => "No message given - nothing sent".to_string(),
            (Delivery::Sent { .. }, MaxChars::Limited(_)) => {
                format!("Message sent to room {room_id}")
            }
            (Delivery::Sent { messages }, MaxChars::Unlimited) => {
                format!("End of input stream - {messages} message(s) sent to room {room_id}")
            }
        }
    }
}

async fn deliver_bounded<C, R>(
    client: &C,
    room_id: &str,
    limit: usize,
    input: &mut R,
) -> Result<Delivery, SessionError>
where
    C: MatrixClient,
    R: AsyncBufRead + Unpin + Send,
{
    let captured = read_chars(input, limit + 1).await?;
    let Some(message) = frame_bounded(&captured, limit) else {
        return Ok(Delivery::NothingSent);
    };

    tracing::debug!(room_id, chars = message.chars().count(), "sending bounded message");
    client.send_message(room_id, &message).await?;
    Ok(Delivery::Sent { messages: 1 })
}

async fn deliver_lines<C, R>(
    client: &C,
    room_id: &str,
    input: &mut R,
) -> Result<Delivery, SessionError>
where
    C: MatrixClient,
    R: AsyncBufRead + Unpin + Send,
{
    let mut buf = Vec::new();
    let mut skip_lf = false;
    let mut sent = 0usize;

    loop {
        buf.clear();
        if !read_line(input, &mut buf, &mut skip_lf).await? {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        client.send_message(room_id, &line).await?;
        sent += 1;
        tracing::debug!(room_id, line = sent, "sent line");
    }

    if sent == 0 {
        Ok(Delivery::NothingSent)
    } else {
        Ok(Delivery::Sent { messages: sent })
    }
}

/// Build the single bounded-mode message from captured input.
///
/// `captured` holds at most `limit + 1` characters. Returns `None` for empty
/// input. Callers guarantee `limit >= 3`.
pub fn frame_bounded(captured: &str, limit: usize) -> Option<String> {
    if captured.is_empty() {
        return None;
    }

    if captured.chars().count() <= limit {
        return Some(captured.to_string());
    }

    let keep = limit.saturating_sub(TRUNCATION_MARKER.len());
    let mut message: String = captured.chars().take(keep).collect();
    message.push_str(TRUNCATION_MARKER);
    Some(message)
}

/// Read until `max_chars` characters have been decoded or the input ends.
///
/// Stops pulling from `input` as soon as enough characters are available, so
/// an endless stream cannot stall delivery.
async fn read_chars<R>(input: &mut R, max_chars: usize) -> std::io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut text = String::new();
    let mut pending = Vec::new();
    let mut chars = 0usize;

    while chars < max_chars {
        let chunk = input.fill_buf().await?;
        if chunk.is_empty() {
            // Truncated multi-byte sequence at end of input.
            if !pending.is_empty() {
                text.push(char::REPLACEMENT_CHARACTER);
                chars += 1;
            }
            break;
        }
        let len = chunk.len();
        pending.extend_from_slice(chunk);
        input.consume(len);
        chars += decode_utf8(&mut pending, &mut text);
    }

    if chars > max_chars {
        text = text.chars().take(max_chars).collect();
    }
    Ok(text)
}

/// Move every complete character out of `pending` into `out`.
///
/// An incomplete sequence at the end stays in `pending` for the next chunk.
/// Returns the number of characters appended.
fn decode_utf8(pending: &mut Vec<u8>, out: &mut String) -> usize {
    let mut appended = 0;
    let mut rest: &[u8] = pending;

    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                appended += valid.chars().count();
                out.push_str(valid);
                rest = &[];
            }
            Err(err) => {
                let (valid, tail) = rest.split_at(err.valid_up_to());
                let valid = String::from_utf8_lossy(valid);
                appended += valid.chars().count();
                out.push_str(&valid);

                let Some(invalid) = err.error_len() else {
                    rest = tail;
                    break;
                };
                out.push(char::REPLACEMENT_CHARACTER);
                appended += 1;
                rest = &tail[invalid..];
            }
        }
    }

    let consumed = pending.len() - rest.len();
    pending.drain(..consumed);
    appended
}

/// Read one line into `buf`, without its terminator.
///
/// Returns `false` once the input is exhausted. A `\r` ends the line right
/// away; `skip_lf` remembers to drop a `\n` that may follow it in the next
/// read.
async fn read_line<R>(input: &mut R, buf: &mut Vec<u8>, skip_lf: &mut bool) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (done, used) = {
            let chunk = input.fill_buf().await?;
            if chunk.is_empty() {
                return Ok(!buf.is_empty());
            }
            if std::mem::take(skip_lf) && chunk[0] == b'\n' {
                (false, 1)
            } else {
                match chunk.iter().position(|&b| b == b'\n' || b == b'\r') {
                    Some(end) => {
                        buf.extend_from_slice(&chunk[..end]);
                        *skip_lf = chunk[end] == b'\r';
                        (true, end + 1)
                    }
                    None => {
                        buf.extend_from_slice(chunk);
                        (false, chunk.len())
                    }
                }
            }
        };
        input.consume(used);
        if done {
            return Ok(true);
        }
    }
}
