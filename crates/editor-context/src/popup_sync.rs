//! External-UI synchronization for the completion popup.
//!
//! [`PopupMenuSync`] wraps a [`PopupMenuModel`] and forwards every accepted transition to an
//! optionally attached [`UiBridge`]. Rejected calls produce no event, so a UI never sees a
//! `PopupSelect` outside a `PopupShow`/`PopupHide` bracket.

use crate::popup::{
    PopupAnchor, PopupMenuItem, PopupMenuModel, PopupMenuWantState, PumTransition,
};
use serde::Serialize;

/// Notification sent to an external UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    /// The popup became visible with the full candidate list.
    PopupShow {
        /// Candidates in display order.
        items: Vec<PopupMenuItem>,
        /// Initially selected index.
        selected: Option<usize>,
        /// Where to draw the popup.
        anchor: PopupAnchor,
    },
    /// The selection changed.
    PopupSelect {
        /// New selection, `None` when cleared.
        selected: Option<usize>,
    },
    /// The popup was dismissed.
    PopupHide {
        /// `true` when the selection was committed, `false` on cancel.
        committed: bool,
    },
}

/// Receiver of [`UiEvent`]s.
pub trait UiBridge {
    /// Deliver one event. Delivery failures are the bridge's concern.
    fn emit(&mut self, event: &UiEvent);
}

impl<F> UiBridge for F
where
    F: FnMut(&UiEvent),
{
    fn emit(&mut self, event: &UiEvent) {
        self(event)
    }
}

/// Popup model plus the external UI it is mirrored to.
#[derive(Default)]
pub struct PopupMenuSync {
    model: PopupMenuModel,
    ui: Option<Box<dyn UiBridge>>,
}

impl std::fmt::Debug for PopupMenuSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopupMenuSync")
            .field("model", &self.model)
            .field("ui_attached", &self.ui.is_some())
            .finish()
    }
}

impl PopupMenuSync {
    /// Create an inactive popup with no UI attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an external UI, replacing any previous one.
    ///
    /// If the popup is visible the new UI receives a `PopupShow` with the current selection.
    pub fn attach_ui(&mut self, ui: impl UiBridge + 'static) {
        self.ui = Some(Box::new(ui));
        if self.model.is_active() {
            self.publish(PumTransition::Shown);
        }
    }

    /// Detach the external UI. Returns `true` if one was attached.
    pub fn detach_ui(&mut self) -> bool {
        self.ui.take().is_some()
    }

    /// Whether an external UI is attached.
    pub fn has_ui(&self) -> bool {
        self.ui.is_some()
    }

    /// The underlying model.
    pub fn model(&self) -> &PopupMenuModel {
        &self.model
    }

    /// Flat projection of the popup state.
    pub fn want(&self) -> PopupMenuWantState {
        self.model.want()
    }

    /// Show the popup. Returns `false` if rejected.
    pub fn show(&mut self, items: Vec<PopupMenuItem>, insert: bool, anchor: PopupAnchor) -> bool {
        let transition = self.model.show(items, insert, anchor);
        self.publish_opt(transition)
    }

    /// Select an item (`None` clears). Returns `false` if rejected or unchanged.
    pub fn select(&mut self, item: Option<usize>) -> bool {
        let transition = self.model.select(item);
        self.publish_opt(transition)
    }

    /// Mark the activation as finishing. Emits nothing.
    pub fn finish(&mut self, commit: bool) -> bool {
        self.model.finish(commit)
    }

    /// Hide the popup. Returns `false` if it was not visible.
    pub fn hide(&mut self) -> bool {
        let transition = self.model.hide();
        self.publish_opt(transition)
    }

    /// Apply a selection requested by the external UI.
    ///
    /// Selects `item`, records `insert`, and with `finish` commits and hides the popup. The whole
    /// request is rejected while the popup is hidden or when `item` is out of range.
    pub fn select_external(&mut self, item: Option<usize>, insert: bool, finish: bool) -> bool {
        if !self.model.is_active() {
            log::debug!("external popup selection {item:?} ignored: popup hidden");
            return false;
        }
        if item.is_some_and(|index| index >= self.model.items().len()) {
            log::debug!("external popup selection {item:?} ignored: out of range");
            return false;
        }
        self.model.set_insert(insert);
        self.select(item);
        if finish {
            self.finish(true);
            self.hide();
        }
        true
    }

    fn publish_opt(&mut self, transition: Option<PumTransition>) -> bool {
        match transition {
            Some(transition) => {
                self.publish(transition);
                true
            }
            None => false,
        }
    }

    fn publish(&mut self, transition: PumTransition) {
        let Some(ui) = self.ui.as_mut() else {
            return;
        };
        let event = match transition {
            PumTransition::Shown => {
                let Some(anchor) = self.model.anchor() else {
                    return;
                };
                UiEvent::PopupShow {
                    items: self.model.items().to_vec(),
                    selected: self.model.selected(),
                    anchor,
                }
            }
            PumTransition::Selected(selected) => UiEvent::PopupSelect { selected },
            PumTransition::Hidden { committed } => UiEvent::PopupHide { committed },
        };
        ui.emit(&event);
    }
}
