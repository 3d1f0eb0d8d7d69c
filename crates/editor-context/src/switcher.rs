//! Running operations "as if" another window were current.
//!
//! [`EditorSession::switch_to`] enters a window and hands back a [`SwitchContext`];
//! [`EditorSession::restore`] consumes it and puts the previous window back. The context lives on
//! the caller's stack, so nested switches unwind in strict LIFO order without sharing any slot.
//!
//! [`EditorSession::execute_in_context`] wraps the pair with the working-directory and cursor
//! bookkeeping:
//!
//! ```text
//! capture cwd? ──> auto-follow probe ──> switch_to ──ok──> check cursor ──> operation ──> restore
//!                                            │                                              │
//!                                            └──err─────────────────────────────────────────┤
//!                                                                                           v
//!                                        re-apply auto-follow / restore cwd, status line, cursor
//! ```

use crate::EditorSession;
use crate::cursor::VisualState;
use crate::directory::needs_capture;
use crate::registry::{RegistryError, TabpageId, WindowId};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Answer of a switch hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchVerdict {
    /// Let the switch happen.
    Allow,
    /// Refuse the switch.
    Veto,
}

/// Why a window switch was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchError {
    /// The target window/tabpage did not resolve.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A switch hook refused the switch.
    #[error("switch from {from:?} to {to:?} vetoed")]
    Vetoed {
        /// Window that was current.
        from: WindowId,
        /// Requested window.
        to: WindowId,
    },
}

/// What [`EditorSession::restore`] needs to undo one [`EditorSession::switch_to`].
#[must_use = "a SwitchContext must be handed back to EditorSession::restore"]
#[derive(Debug, PartialEq, Eq)]
pub struct SwitchContext {
    previous_window: WindowId,
    previous_tabpage: TabpageId,
    same_window: bool,
    visual: VisualState,
}

impl SwitchContext {
    /// The window that was current before the switch.
    pub fn previous_window(&self) -> WindowId {
        self.previous_window
    }

    /// The tabpage that was current before the switch.
    pub fn previous_tabpage(&self) -> TabpageId {
        self.previous_tabpage
    }

    /// `true` when the target already was current and nothing changed.
    pub fn is_noop(&self) -> bool {
        self.same_window
    }

    /// Whether a selection mode was active before the switch.
    pub fn visual_was_active(&self) -> bool {
        self.visual.is_active()
    }
}

impl EditorSession {
    /// Make `window` in `tabpage` current.
    ///
    /// Entering the window that already is current yields a no-op context. Otherwise the switch
    /// hooks are consulted and the active selection is suspended until [`Self::restore`]. On
    /// error nothing has changed.
    pub fn switch_to(
        &mut self,
        window: WindowId,
        tabpage: TabpageId,
    ) -> Result<SwitchContext, SwitchError> {
        let owner = self
            .registry
            .tabpage_of(window)
            .ok_or(RegistryError::WindowNotFound(window))?;
        if !self.registry.is_tabpage_valid(tabpage) {
            return Err(RegistryError::TabpageNotFound(tabpage).into());
        }
        if owner != tabpage {
            return Err(RegistryError::WindowNotInTabpage { window, tabpage }.into());
        }

        let previous_window = self.registry.current_window();
        let previous_tabpage = self.registry.current_tabpage();
        if window == previous_window {
            return Ok(SwitchContext {
                previous_window,
                previous_tabpage,
                same_window: true,
                visual: self.visual,
            });
        }

        for hook in &mut self.switch_hooks {
            if hook(previous_window, window) == SwitchVerdict::Veto {
                return Err(SwitchError::Vetoed {
                    from: previous_window,
                    to: window,
                });
            }
        }

        self.registry.make_current(window, tabpage)?;
        let visual = self.visual;
        self.visual.set_active(false);
        log::debug!("entered {window:?} in {tabpage:?} from {previous_window:?}");

        Ok(SwitchContext {
            previous_window,
            previous_tabpage,
            same_window: false,
            visual,
        })
    }

    /// Undo a [`Self::switch_to`].
    ///
    /// The selection state saved by the switch replaces whatever the operation left behind. If
    /// the previous window was closed meanwhile, the registry's fallback stays current and no
    /// selection is active.
    pub fn restore(&mut self, context: SwitchContext) {
        if context.same_window {
            return;
        }

        // A selection started in the entered window must not survive the return.
        self.visual.set_active(false);
        let previous = context.previous_window;
        let Some(tabpage) = self.registry.tabpage_of(previous) else {
            log::debug!(
                "{previous:?} closed during switch; staying in {:?}",
                self.registry.current_window()
            );
            return;
        };

        match self.registry.make_current(previous, tabpage) {
            Ok(()) => {
                self.visual = context.visual;
                log::debug!("restored {previous:?} in {tabpage:?}");
            }
            Err(err) => log::warn!("restoring {previous:?}: {err}"),
        }
    }

    /// Run `operation` with `window` in `tabpage` current, then restore everything.
    ///
    /// The previous window, the working directory and cursor validity are restored however the
    /// operation ends, including by panic (the panic is resumed afterwards). If the switch is
    /// refused the operation is skipped but the directory and cursor bookkeeping still runs.
    /// Directory failures are logged, never returned.
    pub fn execute_in_context<F>(
        &mut self,
        window: WindowId,
        tabpage: TabpageId,
        operation: F,
    ) -> Result<(), SwitchError>
    where
        F: FnOnce(&mut EditorSession),
    {
        let saved_cursor = self.registry.window(window).map(|w| w.cursor());
        let current = self.registry.current_window();
        let auto_follow = self.options.auto_follow_directory;

        let saved_dir = if needs_capture(&self.registry, current, window, auto_follow) {
            match self.directories.capture_cwd() {
                Ok(dir) => Some(dir),
                Err(err) => {
                    log::debug!("working directory not captured: {err}");
                    None
                }
            }
        } else {
            None
        };

        // If auto-follow leaves the directory where it was, it is in effect: re-apply it for the
        // restored window afterwards instead of forcing the snapshot back.
        let mut reapply_auto_follow = false;
        if auto_follow && let Some(dir) = &saved_dir {
            self.apply_auto_follow();
            reapply_auto_follow = self
                .directories
                .capture_cwd()
                .is_ok_and(|now| now == *dir);
        }

        let (status, panic_payload) = match self.switch_to(window, tabpage) {
            Ok(context) => {
                self.check_cursor();
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| operation(self)));
                self.restore(context);
                (Ok(()), outcome.err())
            }
            Err(err) => {
                log::debug!("switch to {window:?} refused: {err}");
                (Err(err), None)
            }
        };

        if reapply_auto_follow {
            self.apply_auto_follow();
        } else if let Some(dir) = &saved_dir
            && let Err(err) = self.directories.restore_cwd(dir)
        {
            log::warn!("restoring working directory: {err}");
        }

        if let Some(saved) = saved_cursor
            && let Some(win) = self.registry.window_mut(window)
            && win.cursor() != saved
        {
            win.mark_status_dirty();
        }
        self.check_cursor();
        self.check_selection_anchor();

        if let Some(payload) = panic_payload {
            panic::resume_unwind(payload);
        }
        status
    }

    /// [`Self::execute_in_context`] in the tabpage that owns `window`.
    pub fn execute_in_window<F>(
        &mut self,
        window: WindowId,
        operation: F,
    ) -> Result<(), SwitchError>
    where
        F: FnOnce(&mut EditorSession),
    {
        let tabpage = self
            .registry
            .tabpage_of(window)
            .ok_or(RegistryError::WindowNotFound(window))?;
        self.execute_in_context(window, tabpage, operation)
    }
}
