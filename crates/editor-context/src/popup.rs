//! Completion popup menu model.
//!
//! The model owns the candidate list and the selection state machine:
//!
//! ```text
//!   Inactive --show--> Active{selected: none} --select/finish--> Active --hide--> Inactive
//! ```
//!
//! Calls that make no sense in the current state (a `select` before `show`, an out-of-range
//! index, a second `show` while visible) are rejected as no-ops instead of raising errors, so
//! every input has a defined response. Accepted calls return a [`PumTransition`] that
//! [`crate::PopupMenuSync`] turns into external-UI events.

use crate::registry::WindowId;
use serde::Serialize;

/// Highlight style reference attached to popup text.
pub type StyleId = u32;

/// Role of a text chunk within a popup item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PumRole {
    /// Candidate word.
    Text,
    /// Kind annotation (function, variable, ...).
    Kind,
    /// Extra menu text.
    Extra,
    /// Longer info text.
    Info,
}

impl PumRole {
    /// All roles in wire order.
    pub const ALL: [PumRole; 4] = [PumRole::Text, PumRole::Kind, PumRole::Extra, PumRole::Info];
}

/// One rich-text chunk: display text plus an optional highlight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PumChunk {
    /// Display text (may be empty).
    pub text: String,
    /// Highlight style, `None` for the popup's default.
    pub highlight: Option<StyleId>,
}

impl PumChunk {
    /// Create an unhighlighted chunk.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlight: None,
        }
    }

    /// Attach a highlight style.
    pub fn with_highlight(mut self, style: StyleId) -> Self {
        self.highlight = Some(style);
        self
    }
}

/// A completion candidate: exactly four chunks keyed by [`PumRole`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopupMenuItem {
    /// [`PumRole::Text`] chunk.
    pub text: PumChunk,
    /// [`PumRole::Kind`] chunk.
    pub kind: PumChunk,
    /// [`PumRole::Extra`] chunk.
    pub extra: PumChunk,
    /// [`PumRole::Info`] chunk.
    pub info: PumChunk,
}

impl PopupMenuItem {
    /// Create an item with only the candidate text set.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: PumChunk::new(text),
            ..Self::default()
        }
    }

    /// Builder: replace the chunk for `role`.
    pub fn with(mut self, role: PumRole, chunk: PumChunk) -> Self {
        *self.chunk_mut(role) = chunk;
        self
    }

    /// The chunk for `role`.
    pub fn chunk(&self, role: PumRole) -> &PumChunk {
        match role {
            PumRole::Text => &self.text,
            PumRole::Kind => &self.kind,
            PumRole::Extra => &self.extra,
            PumRole::Info => &self.info,
        }
    }

    /// The chunk for `role`, mutably.
    pub fn chunk_mut(&mut self, role: PumRole) -> &mut PumChunk {
        match role {
            PumRole::Text => &mut self.text,
            PumRole::Kind => &mut self.kind,
            PumRole::Extra => &mut self.extra,
            PumRole::Info => &mut self.info,
        }
    }

    /// All four chunks in wire order.
    pub fn chunks(&self) -> [&PumChunk; 4] {
        PumRole::ALL.map(|role| self.chunk(role))
    }
}

/// Where the popup is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopupAnchor {
    /// Below/above a cell of a window (Insert-mode completion).
    Window {
        /// Window whose grid the position refers to.
        window: WindowId,
        /// Grid row.
        row: usize,
        /// Grid column.
        col: usize,
    },
    /// On the command line (command-line completion).
    CommandLine {
        /// Command-line column.
        col: usize,
    },
}

/// Flat view of the popup state.
///
/// `active == false` implies `item == None` and `finish == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopupMenuWantState {
    /// The popup is shown.
    pub active: bool,
    /// Selected index, `None` when nothing is selected.
    pub item: Option<usize>,
    /// The popup was triggered from text insertion.
    pub insert: bool,
    /// The selection is being committed/ended by the next `hide`.
    pub finish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PumState {
    Inactive,
    Active {
        anchor: PopupAnchor,
        selected: Option<usize>,
        insert: bool,
        // Some(commit) once `finish` was called.
        finish: Option<bool>,
    },
}

/// An accepted state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumTransition {
    /// Inactive -> Active.
    Shown,
    /// Selection changed while Active.
    Selected(Option<usize>),
    /// Active -> Inactive; `committed` reflects a preceding `finish(true)`.
    Hidden {
        /// Whether the selection was committed rather than cancelled.
        committed: bool,
    },
}

/// Completion candidates plus the selection state machine.
#[derive(Debug, Clone)]
pub struct PopupMenuModel {
    items: Vec<PopupMenuItem>,
    state: PumState,
}

impl Default for PopupMenuModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupMenuModel {
    /// Create an inactive model.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            state: PumState::Inactive,
        }
    }

    /// Whether the popup is shown.
    pub fn is_active(&self) -> bool {
        matches!(self.state, PumState::Active { .. })
    }

    /// Candidates of the current activation (empty while inactive).
    pub fn items(&self) -> &[PopupMenuItem] {
        &self.items
    }

    /// Anchor of the current activation.
    pub fn anchor(&self) -> Option<PopupAnchor> {
        match self.state {
            PumState::Active { anchor, .. } => Some(anchor),
            PumState::Inactive => None,
        }
    }

    /// Selected index.
    pub fn selected(&self) -> Option<usize> {
        match self.state {
            PumState::Active { selected, .. } => selected,
            PumState::Inactive => None,
        }
    }

    /// Flat projection of the state.
    pub fn want(&self) -> PopupMenuWantState {
        match self.state {
            PumState::Inactive => PopupMenuWantState::default(),
            PumState::Active {
                selected,
                insert,
                finish,
                ..
            } => PopupMenuWantState {
                active: true,
                item: selected,
                insert,
                finish: finish.is_some(),
            },
        }
    }

    /// Show `items`. Rejected while already active.
    pub fn show(
        &mut self,
        items: Vec<PopupMenuItem>,
        insert: bool,
        anchor: PopupAnchor,
    ) -> Option<PumTransition> {
        if self.is_active() {
            log::debug!("popup show rejected: already active");
            return None;
        }
        self.items = items;
        self.state = PumState::Active {
            anchor,
            selected: None,
            insert,
            finish: None,
        };
        Some(PumTransition::Shown)
    }

    /// Select `item` (`None` clears the selection).
    ///
    /// Rejected while inactive or when the index is out of range; selecting the current item is
    /// a no-op.
    pub fn select(&mut self, item: Option<usize>) -> Option<PumTransition> {
        let item_count = self.items.len();
        let PumState::Active { selected, .. } = &mut self.state else {
            log::debug!("popup select {item:?} rejected: not active");
            return None;
        };
        if item.is_some_and(|index| index >= item_count) {
            log::debug!("popup select {item:?} rejected: {item_count} items");
            return None;
        }
        if *selected == item {
            return None;
        }
        *selected = item;
        Some(PumTransition::Selected(item))
    }

    /// Update whether the activation belongs to text insertion. Rejected while inactive.
    pub fn set_insert(&mut self, value: bool) -> bool {
        match &mut self.state {
            PumState::Active { insert, .. } => {
                *insert = value;
                true
            }
            PumState::Inactive => false,
        }
    }

    /// Mark the activation as finishing; the following `hide` reports `commit`.
    ///
    /// Emits nothing by itself. Rejected while inactive.
    pub fn finish(&mut self, commit: bool) -> bool {
        match &mut self.state {
            PumState::Active { finish, .. } => {
                *finish = Some(commit);
                true
            }
            PumState::Inactive => false,
        }
    }

    /// Hide the popup, dropping its items. A no-op while inactive.
    pub fn hide(&mut self) -> Option<PumTransition> {
        let PumState::Active { finish, .. } = self.state else {
            return None;
        };
        self.state = PumState::Inactive;
        self.items.clear();
        Some(PumTransition::Hidden {
            committed: finish == Some(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> PopupAnchor {
        PopupAnchor::CommandLine { col: 3 }
    }

    fn items(n: usize) -> Vec<PopupMenuItem> {
        (0..n).map(|i| PopupMenuItem::new(format!("item{i}"))).collect()
    }

    #[test]
    fn test_inactive_rejects_everything_but_show() {
        let mut model = PopupMenuModel::new();
        assert_eq!(model.select(Some(0)), None);
        assert!(!model.finish(true));
        assert!(!model.set_insert(true));
        assert_eq!(model.hide(), None);
        assert_eq!(model.want(), PopupMenuWantState::default());
    }

    #[test]
    fn test_show_select_hide() {
        let mut model = PopupMenuModel::new();
        assert_eq!(model.show(items(3), true, anchor()), Some(PumTransition::Shown));
        assert_eq!(model.show(items(1), true, anchor()), None);
        assert_eq!(model.items().len(), 3);

        assert_eq!(model.select(Some(2)), Some(PumTransition::Selected(Some(2))));
        assert_eq!(model.select(Some(2)), None);
        assert_eq!(model.select(Some(3)), None);
        assert_eq!(model.selected(), Some(2));
        assert_eq!(model.select(None), Some(PumTransition::Selected(None)));

        assert_eq!(
            model.want(),
            PopupMenuWantState {
                active: true,
                item: None,
                insert: true,
                finish: false,
            }
        );

        assert_eq!(
            model.hide(),
            Some(PumTransition::Hidden { committed: false })
        );
        assert!(model.items().is_empty());
        assert_eq!(model.anchor(), None);
    }

    #[test]
    fn test_finish_is_reported_by_hide() {
        let mut model = PopupMenuModel::new();
        model.show(items(2), false, anchor());
        model.select(Some(1));
        assert!(model.finish(true));
        let want = model.want();
        assert!(want.active && want.finish);
        assert_eq!(model.hide(), Some(PumTransition::Hidden { committed: true }));
        assert_eq!(model.want(), PopupMenuWantState::default());

        // A cancelled finish still hides as not committed.
        model.show(items(2), false, anchor());
        model.finish(false);
        assert_eq!(
            model.hide(),
            Some(PumTransition::Hidden { committed: false })
        );
    }

    #[test]
    fn test_item_chunks_by_role() {
        let item = PopupMenuItem::new("foo")
            .with(PumRole::Kind, PumChunk::new("fn").with_highlight(7))
            .with(PumRole::Info, PumChunk::new("docs"));
        let texts: Vec<&str> = item.chunks().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["foo", "fn", "", "docs"]);
        assert_eq!(item.chunk(PumRole::Kind).highlight, Some(7));
    }
}
