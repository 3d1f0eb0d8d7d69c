//! The editor session: shared mutable state touched by context switches.

use crate::config::ContextOptions;
use crate::cursor::{self, ClampPolicy, VisualMode, VisualState};
use crate::directory::{
    DirectoryContextManager, DirectoryError, DirectoryScope, Filesystem, OsFilesystem,
};
use crate::popup_sync::PopupMenuSync;
use crate::registry::{WindowId, WindowRegistry};
use crate::switcher::SwitchVerdict;
use std::path::{Path, PathBuf};

/// Input mode, as far as cursor validation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// Normal mode: the cursor rests on a character.
    #[default]
    Normal,
    /// Insert mode: the cursor may sit after the last character.
    Insert,
}

/// Hook consulted before the switcher enters another window: `(from, to)`.
pub type SwitchHook = Box<dyn FnMut(WindowId, WindowId) -> SwitchVerdict>;

/// Windows, directory state, selection state and the completion popup of one editor session.
///
/// Everything runs on the editor's control thread; [`EditorSession::execute_in_context`] may be
/// re-entered from inside its own operation.
pub struct EditorSession {
    pub(crate) registry: WindowRegistry,
    pub(crate) directories: DirectoryContextManager,
    pub(crate) visual: VisualState,
    pub(crate) options: ContextOptions,
    pub(crate) switch_hooks: Vec<SwitchHook>,
    mode: EditorMode,
    popup: PopupMenuSync,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("registry", &self.registry)
            .field("visual", &self.visual)
            .field("options", &self.options)
            .field("switch_hooks", &self.switch_hooks.len())
            .field("mode", &self.mode)
            .field("popup", &self.popup)
            .finish()
    }
}

impl EditorSession {
    /// Create a session over a file-system collaborator.
    pub fn new(fs: impl Filesystem + 'static, options: ContextOptions) -> Self {
        Self {
            registry: WindowRegistry::new(),
            directories: DirectoryContextManager::new(fs),
            visual: VisualState::default(),
            options,
            switch_hooks: Vec::new(),
            mode: EditorMode::Normal,
            popup: PopupMenuSync::new(),
        }
    }

    /// Create a session operating on the real process working directory.
    pub fn with_os_filesystem(options: ContextOptions) -> Self {
        Self::new(OsFilesystem, options)
    }

    /// Windows, tabpages and buffers.
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Windows, tabpages and buffers, mutably.
    pub fn registry_mut(&mut self) -> &mut WindowRegistry {
        &mut self.registry
    }

    /// Current options.
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: ContextOptions) {
        self.options = options;
    }

    /// Current input mode.
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Change the input mode.
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
    }

    /// Text-selection state.
    pub fn visual(&self) -> &VisualState {
        &self.visual
    }

    /// Start a selection anchored at the current window's cursor.
    pub fn start_visual(&mut self, mode: VisualMode) {
        let anchor = self
            .registry
            .window(self.registry.current_window())
            .map(|w| w.cursor())
            .unwrap_or_default();
        self.visual.start(mode, anchor);
    }

    /// End the selection.
    pub fn stop_visual(&mut self) {
        self.visual.stop();
    }

    /// Completion popup and its external UI.
    pub fn popup(&self) -> &PopupMenuSync {
        &self.popup
    }

    /// Completion popup and its external UI, mutably.
    pub fn popup_mut(&mut self) -> &mut PopupMenuSync {
        &mut self.popup
    }

    /// Register a hook that may veto entering another window.
    pub fn add_switch_hook<F>(&mut self, hook: F)
    where
        F: FnMut(WindowId, WindowId) -> SwitchVerdict + 'static,
    {
        self.switch_hooks.push(Box::new(hook));
    }

    /// The process working directory.
    pub fn current_directory(&self) -> Result<PathBuf, DirectoryError> {
        self.directories.capture_cwd()
    }

    /// Change directory and record it at `scope` (`:cd`, `:tcd`, `:lcd`).
    ///
    /// A global change clears the current window's and tabpage's local directories; a tabpage
    /// change clears the current window's. Nothing is recorded if the change fails.
    pub fn change_directory(
        &mut self,
        scope: DirectoryScope,
        path: &Path,
    ) -> Result<(), DirectoryError> {
        self.directories.change_dir(path)?;
        let dir = self
            .directories
            .capture_cwd()
            .unwrap_or_else(|_| path.to_path_buf());

        let window = self.registry.current_window();
        let tabpage = self.registry.current_tabpage();
        let (window_dir, tabpage_dir) = match scope {
            DirectoryScope::Global => (None, Some(None)),
            DirectoryScope::Tabpage => (None, Some(Some(dir))),
            DirectoryScope::Window => (Some(dir), None),
        };
        if let Some(win) = self.registry.window_mut(window) {
            win.set_local_dir(window_dir);
        }
        if let Some(tabpage_dir) = tabpage_dir
            && let Some(tab) = self.registry.tabpage_mut(tabpage)
        {
            tab.set_local_dir(tabpage_dir);
        }
        log::debug!("changed {scope:?} directory to '{}'", path.display());
        Ok(())
    }

    pub(crate) fn clamp_policy(&self) -> ClampPolicy {
        ClampPolicy {
            past_end: self.mode == EditorMode::Insert || self.options.virtual_edit_past_end,
        }
    }

    /// Clamp the current window's cursor into its buffer. Returns `true` if it moved.
    pub fn check_cursor(&mut self) -> bool {
        let window = self.registry.current_window();
        let policy = self.clamp_policy();
        cursor::clamp_cursor(&mut self.registry, window, policy)
    }

    /// Clamp an active selection anchor into the current buffer. Returns `true` if it moved.
    pub fn check_selection_anchor(&mut self) -> bool {
        let buffer = self.registry.current_buffer();
        match self.registry.buffer(buffer) {
            Some(buffer) => cursor::revalidate_selection_anchor(buffer, &mut self.visual),
            None => false,
        }
    }

    /// Change into the directory implied by the current buffer, if any. Failures are logged.
    pub(crate) fn apply_auto_follow(&mut self) {
        let path = self
            .registry
            .buffer(self.registry.current_buffer())
            .and_then(|b| b.path());
        if let Err(err) = self.directories.apply_auto_follow(path) {
            log::warn!("auto-follow directory: {err}");
        }
    }
}
