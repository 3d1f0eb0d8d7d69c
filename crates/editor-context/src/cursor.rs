//! Cursor and selection-anchor validation.
//!
//! Operations run inside another window may edit buffers, so positions recorded before the
//! operation can point past the end of a line or past the last line afterwards. The helpers here
//! clamp such positions back into the buffer. All of them are idempotent and leave valid
//! positions untouched.

use crate::Position;
use crate::registry::{Buffer, WindowId, WindowRegistry};
use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;

/// How far past the last character a cursor column may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClampPolicy {
    /// Allow the column one past the last character (Insert mode, `virtualedit=onemore`).
    pub past_end: bool,
}

/// Text-selection (Visual) mode kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualMode {
    /// Characterwise selection.
    #[default]
    Char,
    /// Linewise selection.
    Line,
    /// Blockwise (rectangular) selection.
    Block,
}

/// Global text-selection state: whether a selection is active and where it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisualState {
    active: bool,
    mode: VisualMode,
    anchor: Position,
}

impl VisualState {
    /// Whether a selection mode is active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Selection kind (meaningful while active).
    pub fn mode(&self) -> VisualMode {
        self.mode
    }

    /// Selection start.
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    /// Start a selection anchored at `anchor`.
    pub fn start(&mut self, mode: VisualMode, anchor: Position) {
        self.active = true;
        self.mode = mode;
        self.anchor = anchor;
    }

    /// End the selection.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Toggle activation while keeping mode and anchor, used around window switches.
    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

fn line_content(text: &Rope, line: usize) -> String {
    let mut content = text.line(line).to_string();
    while content.ends_with(['\n', '\r']) {
        content.pop();
    }
    content
}

/// Snap a char column back onto the start of the grapheme cluster containing it.
fn snap_to_grapheme(line: &str, column: usize) -> usize {
    let mut boundary = 0;
    for grapheme in line.graphemes(true) {
        let next = boundary + grapheme.chars().count();
        if next > column {
            break;
        }
        boundary = next;
    }
    boundary
}

/// Clamp `pos` to the nearest valid position in `text`.
pub fn clamp_position(text: &Rope, pos: Position, policy: ClampPolicy) -> Position {
    let line = pos.line.min(text.len_lines().saturating_sub(1));
    let content = line_content(text, line);
    let len = content.chars().count();
    let max_column = if policy.past_end || len == 0 {
        len
    } else {
        len - 1
    };
    let column = snap_to_grapheme(&content, pos.column.min(max_column));
    Position::new(line, column)
}

/// Clamp a window's cursor into its buffer. Returns `true` if the cursor moved.
pub fn clamp_cursor(registry: &mut WindowRegistry, window: WindowId, policy: ClampPolicy) -> bool {
    let Some(win) = registry.window(window) else {
        return false;
    };
    let cursor = win.cursor();
    let Some(buffer) = registry.buffer(win.buffer()) else {
        return false;
    };

    let clamped = clamp_position(buffer.text(), cursor, policy);
    if clamped == cursor {
        return false;
    }
    log::trace!("cursor of {window:?} clamped from {cursor:?} to {clamped:?}");
    registry.set_cursor(window, clamped).is_ok()
}

/// Clamp an active selection anchor into `buffer`. Returns `true` if the anchor moved.
///
/// The anchor may sit one past the last character, like an Insert-mode cursor.
pub fn revalidate_selection_anchor(buffer: &Buffer, visual: &mut VisualState) -> bool {
    if !visual.active {
        return false;
    }
    let clamped = clamp_position(buffer.text(), visual.anchor, ClampPolicy { past_end: true });
    if clamped == visual.anchor {
        return false;
    }
    visual.anchor = clamped;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMAL: ClampPolicy = ClampPolicy { past_end: false };
    const INSERT: ClampPolicy = ClampPolicy { past_end: true };

    #[test]
    fn test_clamp_line_and_column() {
        let text = Rope::from_str("hello\nhi");
        assert_eq!(
            clamp_position(&text, Position::new(9, 9), NORMAL),
            Position::new(1, 1)
        );
        assert_eq!(
            clamp_position(&text, Position::new(9, 9), INSERT),
            Position::new(1, 2)
        );
        assert_eq!(
            clamp_position(&text, Position::new(0, 10), NORMAL),
            Position::new(0, 4)
        );
    }

    #[test]
    fn test_clamp_valid_position_is_noop() {
        let text = Rope::from_str("hello\r\nworld");
        for pos in [Position::new(0, 0), Position::new(0, 4), Position::new(1, 3)] {
            assert_eq!(clamp_position(&text, pos, NORMAL), pos);
        }
        // CRLF is not part of the line content.
        assert_eq!(
            clamp_position(&text, Position::new(0, 6), INSERT),
            Position::new(0, 5)
        );
    }

    #[test]
    fn test_clamp_empty_line() {
        let text = Rope::from_str("");
        assert_eq!(
            clamp_position(&text, Position::new(3, 7), NORMAL),
            Position::new(0, 0)
        );
    }

    #[test]
    fn test_clamp_snaps_to_grapheme_start() {
        // "e" + COMBINING ACUTE ACCENT is one cluster spanning chars 1..3.
        let text = Rope::from_str("ae\u{301}b");
        assert_eq!(
            clamp_position(&text, Position::new(0, 2), NORMAL),
            Position::new(0, 1)
        );
        assert_eq!(
            clamp_position(&text, Position::new(0, 3), NORMAL),
            Position::new(0, 3)
        );

        // Normal mode rests on the start of a trailing cluster.
        let text = Rope::from_str("ae\u{301}");
        assert_eq!(
            clamp_position(&text, Position::new(0, 9), NORMAL),
            Position::new(0, 1)
        );
    }

    #[test]
    fn test_anchor_only_revalidated_while_active() {
        let mut registry = WindowRegistry::new();
        let buf = registry.current_buffer();
        registry.set_buffer_text(buf, "ab").unwrap();
        let buffer = registry.buffer(buf).unwrap();

        let mut visual = VisualState::default();
        visual.start(VisualMode::Line, Position::new(4, 4));
        visual.stop();
        assert!(!revalidate_selection_anchor(buffer, &mut visual));
        assert_eq!(visual.anchor(), Position::new(4, 4));

        visual.set_active(true);
        assert!(revalidate_selection_anchor(buffer, &mut visual));
        assert_eq!(visual.anchor(), Position::new(0, 2));
        assert!(!revalidate_selection_anchor(buffer, &mut visual));
    }
}
