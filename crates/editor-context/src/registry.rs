//! Window, tabpage and buffer ownership.
//!
//! The [`WindowRegistry`] is the single owner of every window and tabpage in a session and the
//! source of truth for "which window is current". Windows and tabpages are addressed through
//! opaque ids, so a handle held across an operation that closes the window simply stops resolving
//! instead of dangling.
//!
//! Buffers are kept only to the extent the context-switch layer needs them: the text (for cursor
//! bounds) and the optional file path (for directory auto-follow).

use crate::Position;
use ropey::Rope;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Opaque identifier for a window in a [`WindowRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WindowId(u64);

impl WindowId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Opaque identifier for a tabpage in a [`WindowRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TabpageId(u64);

impl TabpageId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Opaque identifier for a buffer in a [`WindowRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BufferId(u64);

impl BufferId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Registry-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A window id was not found (never existed or already closed).
    #[error("window {0:?} not found")]
    WindowNotFound(WindowId),
    /// A tabpage id was not found.
    #[error("tabpage {0:?} not found")]
    TabpageNotFound(TabpageId),
    /// A buffer id was not found.
    #[error("buffer {0:?} not found")]
    BufferNotFound(BufferId),
    /// The window exists but belongs to another tabpage.
    #[error("window {window:?} is not in tabpage {tabpage:?}")]
    WindowNotInTabpage {
        /// Requested window.
        window: WindowId,
        /// Requested tabpage.
        tabpage: TabpageId,
    },
    /// Closing would leave the session without any window.
    #[error("cannot close the last window")]
    LastWindow,
}

/// A text buffer as seen by the window layer.
#[derive(Debug, Clone)]
pub struct Buffer {
    id: BufferId,
    path: Option<PathBuf>,
    text: Rope,
}

impl Buffer {
    /// Buffer id.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// File path backing this buffer (`None` for unnamed buffers).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Buffer contents.
    pub fn text(&self) -> &Rope {
        &self.text
    }

    /// Number of logical lines (an empty buffer has one line).
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }
}

/// A viewport onto a buffer within a tabpage.
#[derive(Debug, Clone)]
pub struct Window {
    id: WindowId,
    buffer: BufferId,
    tabpage: TabpageId,
    cursor: Position,
    local_dir: Option<PathBuf>,
    status_dirty: bool,
}

impl Window {
    /// Window id.
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Buffer displayed in this window.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Tabpage owning this window.
    pub fn tabpage(&self) -> TabpageId {
        self.tabpage
    }

    /// Cursor position (may be out of bounds until validated).
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Set the cursor position without validation.
    pub fn set_cursor(&mut self, cursor: Position) {
        self.cursor = cursor;
    }

    /// Window-local working directory (`:lcd`).
    pub fn local_dir(&self) -> Option<&Path> {
        self.local_dir.as_deref()
    }

    /// Set or clear the window-local working directory.
    pub fn set_local_dir(&mut self, dir: Option<PathBuf>) {
        self.local_dir = dir;
    }

    /// Whether the status line needs a redraw.
    pub fn status_dirty(&self) -> bool {
        self.status_dirty
    }

    /// Request a status line redraw.
    pub fn mark_status_dirty(&mut self) {
        self.status_dirty = true;
    }

    /// Clear the redraw request, returning whether it was set.
    pub fn take_status_dirty(&mut self) -> bool {
        std::mem::take(&mut self.status_dirty)
    }
}

/// A collection of windows presented together.
#[derive(Debug, Clone)]
pub struct Tabpage {
    id: TabpageId,
    local_dir: Option<PathBuf>,
    windows: Vec<WindowId>,
    current_window: WindowId,
}

impl Tabpage {
    /// Tabpage id.
    pub fn id(&self) -> TabpageId {
        self.id
    }

    /// Tabpage-local working directory (`:tcd`).
    pub fn local_dir(&self) -> Option<&Path> {
        self.local_dir.as_deref()
    }

    /// Set or clear the tabpage-local working directory.
    pub fn set_local_dir(&mut self, dir: Option<PathBuf>) {
        self.local_dir = dir;
    }

    /// Windows in layout order.
    pub fn windows(&self) -> &[WindowId] {
        &self.windows
    }

    /// The window that is (or becomes) current whenever this tabpage is entered.
    pub fn current_window(&self) -> WindowId {
        self.current_window
    }
}

/// Owner of all windows, tabpages and buffers of a session.
#[derive(Debug)]
pub struct WindowRegistry {
    next_buffer_id: u64,
    next_window_id: u64,
    next_tabpage_id: u64,
    buffers: BTreeMap<BufferId, Buffer>,
    windows: BTreeMap<WindowId, Window>,
    tabpages: Vec<Tabpage>,
    current_window: WindowId,
    current_tabpage: TabpageId,
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowRegistry {
    /// Create a registry holding one empty unnamed buffer shown in one window of one tabpage.
    pub fn new() -> Self {
        let buffer = BufferId(0);
        let window = WindowId(0);
        let tabpage = TabpageId(0);

        let mut buffers = BTreeMap::new();
        buffers.insert(
            buffer,
            Buffer {
                id: buffer,
                path: None,
                text: Rope::new(),
            },
        );

        let mut windows = BTreeMap::new();
        windows.insert(window, Self::fresh_window(window, buffer, tabpage));

        Self {
            next_buffer_id: 1,
            next_window_id: 1,
            next_tabpage_id: 1,
            buffers,
            windows,
            tabpages: vec![Tabpage {
                id: tabpage,
                local_dir: None,
                windows: vec![window],
                current_window: window,
            }],
            current_window: window,
            current_tabpage: tabpage,
        }
    }

    fn fresh_window(id: WindowId, buffer: BufferId, tabpage: TabpageId) -> Window {
        Window {
            id,
            buffer,
            tabpage,
            cursor: Position::new(0, 0),
            local_dir: None,
            status_dirty: false,
        }
    }

    fn tabpage_index(&self, id: TabpageId) -> Option<usize> {
        self.tabpages.iter().position(|t| t.id == id)
    }

    fn alloc_window_id(&mut self) -> WindowId {
        let id = WindowId(self.next_window_id);
        self.next_window_id = self.next_window_id.saturating_add(1);
        id
    }

    /// Open a new buffer. It is not displayed until a window is created for it.
    pub fn open_buffer(&mut self, path: Option<PathBuf>, text: &str) -> BufferId {
        let id = BufferId(self.next_buffer_id);
        self.next_buffer_id = self.next_buffer_id.saturating_add(1);
        self.buffers.insert(
            id,
            Buffer {
                id,
                path,
                text: Rope::from_str(text),
            },
        );
        id
    }

    /// Replace a buffer's contents. Cursors are left untouched; validation happens lazily.
    pub fn set_buffer_text(&mut self, id: BufferId, text: &str) -> Result<(), RegistryError> {
        let buffer = self
            .buffers
            .get_mut(&id)
            .ok_or(RegistryError::BufferNotFound(id))?;
        buffer.text = Rope::from_str(text);
        Ok(())
    }

    /// Look up a buffer.
    pub fn buffer(&self, id: BufferId) -> Option<&Buffer> {
        self.buffers.get(&id)
    }

    /// Look up a window.
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    /// Look up a window mutably.
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    /// Look up a tabpage.
    pub fn tabpage(&self, id: TabpageId) -> Option<&Tabpage> {
        self.tabpages.iter().find(|t| t.id == id)
    }

    /// Look up a tabpage mutably.
    pub fn tabpage_mut(&mut self, id: TabpageId) -> Option<&mut Tabpage> {
        self.tabpages.iter_mut().find(|t| t.id == id)
    }

    /// Tabpage ids in display order.
    pub fn tabpage_ids(&self) -> impl Iterator<Item = TabpageId> + '_ {
        self.tabpages.iter().map(|t| t.id)
    }

    /// Returns the number of open windows across all tabpages.
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Returns `true` if the window still exists.
    pub fn is_window_valid(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    /// Returns `true` if the tabpage still exists.
    pub fn is_tabpage_valid(&self, id: TabpageId) -> bool {
        self.tabpage_index(id).is_some()
    }

    /// The globally focused window.
    pub fn current_window(&self) -> WindowId {
        self.current_window
    }

    /// The globally focused tabpage.
    pub fn current_tabpage(&self) -> TabpageId {
        self.current_tabpage
    }

    /// The buffer shown in the current window.
    pub fn current_buffer(&self) -> BufferId {
        // Resolves by the invariant checked in `debug_check_current`.
        self.windows[&self.current_window].buffer
    }

    /// The current window exists, belongs to the current tabpage, and is that tabpage's
    /// remembered window. Every operation that moves or removes windows re-establishes this.
    fn debug_check_current(&self) {
        debug_assert!(
            self.windows
                .get(&self.current_window)
                .is_some_and(|w| w.tabpage == self.current_tabpage),
            "current {:?} does not resolve in {:?}",
            self.current_window,
            self.current_tabpage
        );
        debug_assert!(
            self.tabpage(self.current_tabpage)
                .is_some_and(|t| t.current_window == self.current_window),
            "{:?} does not remember {:?} as current",
            self.current_tabpage,
            self.current_window
        );
    }

    /// The tabpage a window belongs to.
    pub fn tabpage_of(&self, id: WindowId) -> Option<TabpageId> {
        self.windows.get(&id).map(|w| w.tabpage)
    }

    /// Split a new window for `buffer` into `tabpage`, placed after the tabpage's current window.
    ///
    /// The new window does not become current.
    pub fn split_window(
        &mut self,
        tabpage: TabpageId,
        buffer: BufferId,
    ) -> Result<WindowId, RegistryError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(RegistryError::BufferNotFound(buffer));
        }
        let index = self
            .tabpage_index(tabpage)
            .ok_or(RegistryError::TabpageNotFound(tabpage))?;

        let id = self.alloc_window_id();
        self.windows
            .insert(id, Self::fresh_window(id, buffer, tabpage));

        let tab = &mut self.tabpages[index];
        let at = tab
            .windows
            .iter()
            .position(|w| *w == tab.current_window)
            .map_or(tab.windows.len(), |p| p + 1);
        tab.windows.insert(at, id);
        Ok(id)
    }

    /// Open a new tabpage (appended last) with a single window showing `buffer`.
    ///
    /// The new tabpage does not become current.
    pub fn new_tabpage(
        &mut self,
        buffer: BufferId,
    ) -> Result<(TabpageId, WindowId), RegistryError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(RegistryError::BufferNotFound(buffer));
        }
        let tabpage = TabpageId(self.next_tabpage_id);
        self.next_tabpage_id = self.next_tabpage_id.saturating_add(1);

        let window = self.alloc_window_id();
        self.windows
            .insert(window, Self::fresh_window(window, buffer, tabpage));
        self.tabpages.push(Tabpage {
            id: tabpage,
            local_dir: None,
            windows: vec![window],
            current_window: window,
        });
        Ok((tabpage, window))
    }

    /// Close a window.
    ///
    /// Closing the last window of a tabpage closes the tabpage. If the window was current, the
    /// neighbouring window (previous, else next) becomes current.
    pub fn close_window(&mut self, id: WindowId) -> Result<(), RegistryError> {
        let tabpage = self
            .tabpage_of(id)
            .ok_or(RegistryError::WindowNotFound(id))?;
        let index = self
            .tabpage_index(tabpage)
            .ok_or(RegistryError::TabpageNotFound(tabpage))?;

        if self.tabpages[index].windows.len() == 1 {
            return self.close_tabpage(tabpage);
        }

        self.windows.remove(&id);
        let tab = &mut self.tabpages[index];
        if let Some(pos) = tab.windows.iter().position(|w| *w == id) {
            tab.windows.remove(pos);
            if tab.current_window == id {
                tab.current_window = tab.windows[pos.saturating_sub(1)];
            }
        }
        if self.current_window == id {
            self.current_window = tab.current_window;
        }
        self.debug_check_current();
        Ok(())
    }

    /// Close a tabpage and all of its windows.
    ///
    /// If it was current, the neighbouring tabpage (previous, else next) becomes current.
    pub fn close_tabpage(&mut self, id: TabpageId) -> Result<(), RegistryError> {
        let index = self
            .tabpage_index(id)
            .ok_or(RegistryError::TabpageNotFound(id))?;
        if self.tabpages.len() == 1 {
            return Err(RegistryError::LastWindow);
        }

        let tab = self.tabpages.remove(index);
        for window in &tab.windows {
            self.windows.remove(window);
        }

        if self.current_tabpage == id {
            let fallback = &self.tabpages[index.saturating_sub(1)];
            self.current_tabpage = fallback.id;
            self.current_window = fallback.current_window;
        }
        self.debug_check_current();
        Ok(())
    }

    /// Make `window` (inside `tabpage`) the current window.
    ///
    /// This is the raw registry operation; switch hooks and selection handling live in
    /// [`crate::EditorSession::switch_to`].
    pub fn make_current(
        &mut self,
        window: WindowId,
        tabpage: TabpageId,
    ) -> Result<(), RegistryError> {
        let owner = self
            .tabpage_of(window)
            .ok_or(RegistryError::WindowNotFound(window))?;
        let index = self
            .tabpage_index(tabpage)
            .ok_or(RegistryError::TabpageNotFound(tabpage))?;
        if owner != tabpage {
            return Err(RegistryError::WindowNotInTabpage { window, tabpage });
        }

        self.tabpages[index].current_window = window;
        self.current_tabpage = tabpage;
        self.current_window = window;
        self.debug_check_current();
        Ok(())
    }

    /// Move a window's cursor without validation.
    pub fn set_cursor(&mut self, id: WindowId, cursor: Position) -> Result<(), RegistryError> {
        let window = self
            .windows
            .get_mut(&id)
            .ok_or(RegistryError::WindowNotFound(id))?;
        window.cursor = cursor;
        Ok(())
    }

    /// The local directory in effect for a window: its own, else its tabpage's.
    ///
    /// `None` means the window follows the global working directory.
    pub fn effective_local_dir(&self, id: WindowId) -> Option<&Path> {
        let window = self.windows.get(&id)?;
        window
            .local_dir()
            .or_else(|| self.tabpage(window.tabpage)?.local_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_one_current_window() {
        let registry = WindowRegistry::new();
        let win = registry.current_window();
        let tab = registry.current_tabpage();
        assert_eq!(registry.window_count(), 1);
        assert_eq!(registry.tabpage_of(win), Some(tab));
        assert_eq!(registry.tabpage(tab).unwrap().windows(), &[win]);
        assert_eq!(registry.buffer(registry.current_buffer()).unwrap().line_count(), 1);
    }

    #[test]
    fn test_effective_local_dir_prefers_window() {
        let mut registry = WindowRegistry::new();
        let win = registry.current_window();
        let tab = registry.current_tabpage();
        assert_eq!(registry.effective_local_dir(win), None);

        registry
            .tabpage_mut(tab)
            .unwrap()
            .set_local_dir(Some(PathBuf::from("/tab")));
        assert_eq!(registry.effective_local_dir(win), Some(Path::new("/tab")));

        registry
            .window_mut(win)
            .unwrap()
            .set_local_dir(Some(PathBuf::from("/win")));
        assert_eq!(registry.effective_local_dir(win), Some(Path::new("/win")));
    }

    #[test]
    fn test_split_inserts_after_current() {
        let mut registry = WindowRegistry::new();
        let first = registry.current_window();
        let tab = registry.current_tabpage();
        let buf = registry.current_buffer();

        let second = registry.split_window(tab, buf).unwrap();
        let third = registry.split_window(tab, buf).unwrap();
        assert_eq!(
            registry.tabpage(tab).unwrap().windows(),
            &[first, third, second]
        );
        assert_eq!(registry.current_window(), first);
    }

    #[test]
    fn test_current_window_resolves_after_every_close() {
        let mut registry = WindowRegistry::new();
        let first = registry.current_window();
        let tab = registry.current_tabpage();
        let text = registry.open_buffer(None, "one\ntwo");
        let second = registry.split_window(tab, text).unwrap();
        let third = registry.split_window(tab, text).unwrap();
        let (other_tab, other_win) = registry.new_tabpage(text).unwrap();

        // [first, third, second]: closing the current window falls back to the previous one.
        registry.make_current(third, tab).unwrap();
        registry.close_window(third).unwrap();
        assert_eq!(registry.current_window(), first);
        assert_eq!(registry.tabpage(tab).unwrap().current_window(), first);

        // The first window has no previous neighbour, so the next one takes over.
        registry.close_window(first).unwrap();
        assert_eq!(registry.current_window(), second);
        assert_eq!(registry.current_buffer(), text);

        // Closing the last window of the current tabpage moves to the neighbouring tabpage.
        registry.close_window(second).unwrap();
        assert_eq!(registry.current_tabpage(), other_tab);
        assert_eq!(registry.current_window(), other_win);
        assert_eq!(registry.current_buffer(), text);

        assert_eq!(
            registry.close_window(other_win),
            Err(RegistryError::LastWindow)
        );
        assert_eq!(registry.current_window(), other_win);
    }

    #[test]
    fn test_status_dirty_take() {
        let mut registry = WindowRegistry::new();
        let win = registry.current_window();
        let window = registry.window_mut(win).unwrap();
        assert!(!window.take_status_dirty());
        window.mark_status_dirty();
        assert!(window.status_dirty());
        assert!(window.take_status_dirty());
        assert!(!window.status_dirty());
    }
}
