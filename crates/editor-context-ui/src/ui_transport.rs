//! Stream framing for UI messages.
//!
//! Redraw notifications and UI requests travel as JSON values framed by HTTP-like headers:
//!
//! ```text
//! Content-Length: <n>\r\n
//! \r\n
//! <n bytes of UTF-8 JSON>
//! ```
//!
//! The peer is another process, so every header value is untrusted: bodies larger than
//! [`MAX_UI_MESSAGE`] are refused before anything is allocated for them.

use serde_json::Value;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

/// Largest body accepted from a UI, in bytes.
pub const MAX_UI_MESSAGE: usize = 16 * 1024 * 1024;

const CONTENT_LENGTH: &str = "Content-Length";

/// Failures reading or writing a framed UI message.
#[derive(Debug, Error)]
pub enum UiTransportError {
    /// The underlying stream failed.
    #[error("UI stream error: {0}")]
    Io(#[from] io::Error),
    /// A header block ended without a usable `Content-Length`.
    #[error("UI message has no valid Content-Length header")]
    MissingContentLength,
    /// The announced body exceeds [`MAX_UI_MESSAGE`].
    #[error("UI message of {len} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// Announced body length.
        len: u64,
        /// Accepted maximum.
        max: usize,
    },
    /// The stream ended before the message was complete.
    #[error("UI stream ended inside a message ({0})")]
    Truncated(&'static str),
    /// The body is not valid JSON.
    #[error("UI message body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write a single framed UI message to `writer`.
///
/// Header and body go out in one `write_all` so a concurrent reader never sees a header without
/// its body.
pub fn write_ui_message<W: Write>(writer: &mut W, value: &Value) -> Result<(), UiTransportError> {
    let body = serde_json::to_vec(value)?;
    let mut frame = format!("{CONTENT_LENGTH}: {}\r\n\r\n", body.len()).into_bytes();
    frame.extend_from_slice(&body);

    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Parse the value of a `Content-Length` header, rejecting lengths above [`MAX_UI_MESSAGE`].
fn parse_content_length(value: &str) -> Result<usize, UiTransportError> {
    let len: u64 = value
        .trim()
        .parse()
        .map_err(|_| UiTransportError::MissingContentLength)?;
    usize::try_from(len)
        .ok()
        .filter(|len| *len <= MAX_UI_MESSAGE)
        .ok_or(UiTransportError::TooLarge {
            len,
            max: MAX_UI_MESSAGE,
        })
}

/// Read a single framed UI message from `reader`.
///
/// Returns `Ok(None)` on clean EOF between messages. Blank lines between messages and headers
/// other than `Content-Length` (matched case-insensitively) are skipped.
pub fn read_ui_message<R: BufRead>(reader: &mut R) -> Result<Option<Value>, UiTransportError> {
    let mut content_length = None;
    let mut line = String::new();
    let mut in_headers = false;

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            if in_headers {
                return Err(UiTransportError::Truncated("headers"));
            }
            return Ok(None);
        }

        let header = line.trim_end_matches(['\r', '\n']);
        match (header.is_empty(), in_headers) {
            (true, true) => break,
            (true, false) => continue,
            (false, _) => in_headers = true,
        }

        if let Some((name, value)) = header.split_once(':')
            && name.trim().eq_ignore_ascii_case(CONTENT_LENGTH)
        {
            content_length = Some(parse_content_length(value)?);
        }
    }

    let len = content_length.ok_or(UiTransportError::MissingContentLength)?;
    let mut body = Vec::with_capacity(len);
    reader.by_ref().take(len as u64).read_to_end(&mut body)?;
    if body.len() < len {
        return Err(UiTransportError::Truncated("body"));
    }

    Ok(Some(serde_json::from_slice(&body)?))
}
