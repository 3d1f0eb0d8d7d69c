//! A [`UiBridge`] that writes redraw notifications to a byte stream.

use crate::redraw::encode_event;
use crate::ui_transport::write_ui_message;
use editor_context::{UiBridge, UiEvent};
use std::io::Write;

/// Frames every popup event onto `W` (a pipe, socket or child's stdin).
///
/// Delivery is best effort: the editor never blocks on or fails because of a UI, so write errors
/// are logged and the event is dropped.
#[derive(Debug)]
pub struct FramedUi<W> {
    writer: W,
    failed_writes: usize,
}

impl<W: Write> FramedUi<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed_writes: 0,
        }
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Number of events dropped because the write failed.
    pub fn failed_writes(&self) -> usize {
        self.failed_writes
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> UiBridge for FramedUi<W> {
    fn emit(&mut self, event: &UiEvent) {
        let message = encode_event(event);
        if let Err(err) = write_ui_message(&mut self.writer, &message) {
            self.failed_writes += 1;
            log::warn!("dropping UI event {message}: {err}");
        }
    }
}
