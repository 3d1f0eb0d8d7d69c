#![warn(missing_docs)]
//! `editor-context-ui` - external-UI wire layer for `editor-context`.
//!
//! This crate turns the popup events of an [`editor_context::PopupMenuSync`] into redraw
//! notifications, frames them onto a byte stream with `Content-Length` headers, and decodes the
//! requests a UI sends back (currently `select_popupmenu_item`).
//!
//! ```rust
//! use editor_context::{PopupAnchor, PopupMenuItem, PopupMenuSync};
//! use editor_context_ui::{FramedUi, apply_request, decode_ui_request};
//!
//! let mut popup = PopupMenuSync::new();
//! popup.attach_ui(FramedUi::new(std::io::sink()));
//! popup.show(
//!     vec![PopupMenuItem::new("foo"), PopupMenuItem::new("bar")],
//!     true,
//!     PopupAnchor::CommandLine { col: 1 },
//! );
//!
//! let request =
//!     decode_ui_request(br#"{"method":"select_popupmenu_item","params":[1,true,true]}"#).unwrap();
//! assert!(apply_request(&mut popup, &request));
//! assert!(!popup.model().is_active());
//! ```

pub mod framed_ui;
pub mod redraw;
pub mod request;
pub mod ui_transport;

pub use framed_ui::FramedUi;
pub use redraw::{CMDLINE_GRID, POPUPMENU_HIDE, POPUPMENU_SELECT, POPUPMENU_SHOW, encode_event};
pub use request::{
    SELECT_POPUPMENU_ITEM, UiProtocolError, UiRequest, apply_request, decode_ui_request,
    serve_requests,
};
pub use ui_transport::{MAX_UI_MESSAGE, UiTransportError, read_ui_message, write_ui_message};
