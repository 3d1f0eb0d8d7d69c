#![warn(missing_docs)]
//! Editor Context - window context switching and popup synchronization for a headless editor
//!
//! # Overview
//!
//! `editor-context` is the part of an editor kernel that lets internal operations run "as if" a
//! different window/tabpage were focused, and that keeps an optionally attached external UI in
//! sync with the completion popup. Text storage, drawing and command evaluation live elsewhere
//! and are reached only through narrow interfaces (a buffer's text for bounds, a
//! [`Filesystem`] for directory queries, a [`UiBridge`] for notifications).
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorSession::execute_in_context          │  ← Public entry point
//! ├─────────────────────────────────────────────┤
//! │  Switcher (switch_to / restore)             │  ← Enter / exit pair
//! ├──────────────────────┬──────────────────────┤
//! │  Directory context   │  Cursor validity     │  ← Bookkeeping
//! ├──────────────────────┴──────────────────────┤
//! │  Window registry (windows, tabpages)        │  ← Ownership
//! └─────────────────────────────────────────────┘
//!
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │  PopupMenuModel      │──>│  PopupMenuSync       │──> UiBridge
//! └──────────────────────┘   └──────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_context::{ContextOptions, EditorSession, Position};
//!
//! let mut session = EditorSession::with_os_filesystem(ContextOptions::default());
//! let original = session.registry().current_window();
//! let tab = session.registry().current_tabpage();
//! let buffer = session.registry_mut().open_buffer(None, "hello\nworld");
//! let other = session.registry_mut().split_window(tab, buffer).unwrap();
//!
//! session
//!     .execute_in_context(other, tab, |session| {
//!         let here = session.registry().current_window();
//!         session.registry_mut().set_cursor(here, Position::new(1, 2)).unwrap();
//!     })
//!     .unwrap();
//!
//! assert_eq!(session.registry().current_window(), original);
//! assert!(session.registry().window(other).unwrap().status_dirty());
//! ```
//!
//! # Module Description
//!
//! - [`registry`] - windows, tabpages and buffers
//! - [`directory`] - working-directory capture/restore and auto-follow
//! - [`cursor`] - cursor and selection-anchor clamping
//! - [`switcher`] - enter/exit pair and `execute_in_context`
//! - [`popup`] - completion popup state machine
//! - [`popup_sync`] - external-UI notifications for the popup
//! - [`config`] - session options

pub mod config;
pub mod cursor;
pub mod directory;
pub mod popup;
pub mod popup_sync;
mod position;
pub mod registry;
mod session;
pub mod switcher;

pub use config::{ConfigError, ContextOptions};
pub use cursor::{
    ClampPolicy, VisualMode, VisualState, clamp_cursor, clamp_position,
    revalidate_selection_anchor,
};
pub use directory::{
    DirectoryContextManager, DirectoryError, DirectoryScope, Filesystem, OsFilesystem,
    needs_capture,
};
pub use popup::{
    PopupAnchor, PopupMenuItem, PopupMenuModel, PopupMenuWantState, PumChunk, PumRole,
    PumTransition, StyleId,
};
pub use popup_sync::{PopupMenuSync, UiBridge, UiEvent};
pub use position::Position;
pub use registry::{
    Buffer, BufferId, RegistryError, Tabpage, TabpageId, Window, WindowId, WindowRegistry,
};
pub use session::{EditorMode, EditorSession, SwitchHook};
pub use switcher::{SwitchContext, SwitchError, SwitchVerdict};
