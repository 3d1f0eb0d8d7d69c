//! Requests sent by an external UI.
//!
//! A request is a JSON object `{"method": <name>, "params": [...]}`. The only request the popup
//! understands is:
//!
//! ```text
//! {"method": "select_popupmenu_item", "params": [item, insert, finish]}
//! ```
//!
//! where `item < 0` clears the selection.

use crate::ui_transport::{UiTransportError, read_ui_message};
use editor_context::PopupMenuSync;
use serde_json::Value;
use std::io::BufRead;
use thiserror::Error;

/// Method name of [`UiRequest::SelectPopupmenuItem`].
pub const SELECT_POPUPMENU_ITEM: &str = "select_popupmenu_item";

/// Errors decoding a UI request.
#[derive(Debug, Error)]
pub enum UiProtocolError {
    /// The body is not valid JSON.
    #[error("malformed UI request: {0}")]
    MalformedJson(#[from] serde_json::Error),
    /// The request has no string `method` field.
    #[error("UI request has no method")]
    MissingMethod,
    /// The method is not one this editor understands.
    #[error("unknown UI request method '{0}'")]
    UnknownMethod(String),
    /// The parameters do not match the method's signature.
    #[error("invalid params for '{method}': {reason}")]
    InvalidParams {
        /// Method whose params were rejected.
        method: String,
        /// What was wrong.
        reason: &'static str,
    },
}

/// A decoded UI request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiRequest {
    /// Select a popup item as if the user had navigated to it.
    SelectPopupmenuItem {
        /// Item to select, `None` to clear.
        item: Option<usize>,
        /// Whether the selection is inserted into the buffer.
        insert: bool,
        /// Commit and close the popup afterwards.
        finish: bool,
    },
}

impl UiRequest {
    /// Decode a request from an already parsed JSON value.
    pub fn from_json(value: &Value) -> Result<Self, UiProtocolError> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .ok_or(UiProtocolError::MissingMethod)?;
        let params = value.get("params").unwrap_or(&Value::Null);

        match method {
            SELECT_POPUPMENU_ITEM => decode_select_popupmenu_item(params),
            other => Err(UiProtocolError::UnknownMethod(other.to_string())),
        }
    }
}

fn decode_select_popupmenu_item(params: &Value) -> Result<UiRequest, UiProtocolError> {
    let invalid = |reason| UiProtocolError::InvalidParams {
        method: SELECT_POPUPMENU_ITEM.to_string(),
        reason,
    };

    let params = params
        .as_array()
        .ok_or_else(|| invalid("params must be an array"))?;
    // A trailing options map is accepted and ignored.
    if !(3..=4).contains(&params.len()) {
        return Err(invalid("expected [item, insert, finish]"));
    }

    let item = params[0]
        .as_i64()
        .ok_or_else(|| invalid("item must be an integer"))?;
    let insert = params[1]
        .as_bool()
        .ok_or_else(|| invalid("insert must be a boolean"))?;
    let finish = params[2]
        .as_bool()
        .ok_or_else(|| invalid("finish must be a boolean"))?;

    let item = if item < 0 {
        None
    } else {
        Some(usize::try_from(item).map_err(|_| invalid("item out of range"))?)
    };
    Ok(UiRequest::SelectPopupmenuItem {
        item,
        insert,
        finish,
    })
}

/// Decode a request from a raw JSON body.
pub fn decode_ui_request(body: &[u8]) -> Result<UiRequest, UiProtocolError> {
    let value: Value = serde_json::from_slice(body)?;
    UiRequest::from_json(&value)
}

/// Apply a request to the popup. Returns `false` if the popup rejected it.
pub fn apply_request(popup: &mut PopupMenuSync, request: &UiRequest) -> bool {
    match *request {
        UiRequest::SelectPopupmenuItem {
            item,
            insert,
            finish,
        } => popup.select_external(item, insert, finish),
    }
}

/// Read framed requests from `reader` until EOF and apply each to `popup`.
///
/// Requests that fail to decode are logged and skipped; transport errors (broken framing, an
/// oversized body, invalid JSON) end the loop. Returns the number of requests the popup accepted.
pub fn serve_requests<R: BufRead>(
    reader: &mut R,
    popup: &mut PopupMenuSync,
) -> Result<usize, UiTransportError> {
    let mut accepted = 0;
    while let Some(message) = read_ui_message(reader)? {
        match UiRequest::from_json(&message) {
            Ok(request) => {
                if apply_request(popup, &request) {
                    accepted += 1;
                } else {
                    log::debug!("UI request {request:?} rejected by popup");
                }
            }
            Err(err) => log::warn!("ignoring UI request: {err}"),
        }
    }
    Ok(accepted)
}
