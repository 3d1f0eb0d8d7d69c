//! Encoding popup events as redraw notifications.
//!
//! Each [`UiEvent`] becomes one positional tuple, first element the event name:
//!
//! ```text
//! ["popupmenu_show",   items, selected, row, col, grid]
//! ["popupmenu_select", selected]
//! ["popupmenu_hide",   committed]
//! ```
//!
//! `items` is a list of four `[text, highlight]` pairs per candidate (text, kind, extra, info);
//! `highlight` is `null` for the default style. `selected` is `-1` when nothing is selected.
//! Command-line popups are sent with `grid = -1` and `row = 0`.

use editor_context::{PopupAnchor, PopupMenuItem, UiEvent};
use serde_json::{Value, json};

/// Redraw name of [`UiEvent::PopupShow`].
pub const POPUPMENU_SHOW: &str = "popupmenu_show";
/// Redraw name of [`UiEvent::PopupSelect`].
pub const POPUPMENU_SELECT: &str = "popupmenu_select";
/// Redraw name of [`UiEvent::PopupHide`].
pub const POPUPMENU_HIDE: &str = "popupmenu_hide";

/// Grid number used for command-line anchored popups.
pub const CMDLINE_GRID: i64 = -1;

/// Encode one event as a redraw tuple.
pub fn encode_event(event: &UiEvent) -> Value {
    match event {
        UiEvent::PopupShow {
            items,
            selected,
            anchor,
        } => {
            let (row, col, grid) = match *anchor {
                PopupAnchor::Window { window, row, col } => (row, col, grid_number(window.get())),
                PopupAnchor::CommandLine { col } => (0, col, CMDLINE_GRID),
            };
            let items: Vec<Value> = items.iter().map(encode_item).collect();
            json!([POPUPMENU_SHOW, items, encode_selected(*selected), row, col, grid])
        }
        UiEvent::PopupSelect { selected } => {
            json!([POPUPMENU_SELECT, encode_selected(*selected)])
        }
        UiEvent::PopupHide { committed } => json!([POPUPMENU_HIDE, committed]),
    }
}

fn encode_item(item: &PopupMenuItem) -> Value {
    Value::Array(
        item.chunks()
            .iter()
            .map(|chunk| json!([chunk.text, chunk.highlight]))
            .collect(),
    )
}

fn encode_selected(selected: Option<usize>) -> i64 {
    selected
        .and_then(|index| i64::try_from(index).ok())
        .unwrap_or(-1)
}

fn grid_number(window: u64) -> i64 {
    i64::try_from(window).unwrap_or(i64::MAX)
}
