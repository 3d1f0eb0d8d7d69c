//! Working-directory bookkeeping around window context switches.
//!
//! Querying and changing the process working directory can be slow (network mounts, deleted
//! directories), so the switcher only captures it when a switch could actually observe a
//! different directory. Every failure here is reported as a value and logged by the caller; none
//! of it is allowed to abort the surrounding operation.

use crate::registry::{WindowId, WindowRegistry};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory query/change failures.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The current directory could not be determined (e.g. it was deleted).
    #[error("failed to query the current directory: {0}")]
    Query(#[source] io::Error),
    /// Changing into `path` failed.
    #[error("failed to change directory to '{}': {source}", .path.display())]
    Change {
        /// Target directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// File-system collaborator used for directory queries and changes.
pub trait Filesystem {
    /// Return the process working directory.
    fn current_dir(&self) -> io::Result<PathBuf>;

    /// Change the process working directory.
    fn set_current_dir(&mut self, path: &Path) -> io::Result<()>;

    /// Directory implied by the current buffer under the auto-follow policy.
    ///
    /// The default follows the directory containing the buffer's file; unnamed buffers imply no
    /// change.
    fn auto_follow_target(&self, buffer_path: Option<&Path>) -> Option<PathBuf> {
        let parent = buffer_path?.parent()?;
        (!parent.as_os_str().is_empty()).then(|| parent.to_path_buf())
    }
}

/// [`Filesystem`] backed by the real process working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn set_current_dir(&mut self, path: &Path) -> io::Result<()> {
        std::env::set_current_dir(path)
    }
}

/// Which local directory a scoped directory change records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryScope {
    /// Global directory (`:cd`).
    Global,
    /// Current tabpage (`:tcd`).
    Tabpage,
    /// Current window (`:lcd`).
    Window,
}

/// Captures, restores and auto-follows the process working directory.
pub struct DirectoryContextManager {
    fs: Box<dyn Filesystem>,
}

impl std::fmt::Debug for DirectoryContextManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryContextManager").finish_non_exhaustive()
    }
}

impl DirectoryContextManager {
    /// Create a manager over the given file-system collaborator.
    pub fn new(fs: impl Filesystem + 'static) -> Self {
        Self { fs: Box::new(fs) }
    }

    /// Snapshot the current working directory.
    pub fn capture_cwd(&self) -> Result<PathBuf, DirectoryError> {
        self.fs.current_dir().map_err(DirectoryError::Query)
    }

    /// Change back into a previously captured directory.
    pub fn restore_cwd(&mut self, path: &Path) -> Result<(), DirectoryError> {
        self.change_dir(path)
    }

    /// Change the working directory.
    pub fn change_dir(&mut self, path: &Path) -> Result<(), DirectoryError> {
        self.fs
            .set_current_dir(path)
            .map_err(|source| DirectoryError::Change {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Change into the directory implied by `buffer_path`.
    ///
    /// Returns `Ok(false)` when the buffer implies no directory.
    pub fn apply_auto_follow(
        &mut self,
        buffer_path: Option<&Path>,
    ) -> Result<bool, DirectoryError> {
        let Some(target) = self.fs.auto_follow_target(buffer_path) else {
            return Ok(false);
        };
        self.change_dir(&target)?;
        Ok(true)
    }
}

/// Decide whether switching from `current` to `target` must snapshot the working directory.
///
/// Staying in the same window never needs it. Otherwise the snapshot is required when
/// auto-follow may move the directory, or when the two windows resolve to different local
/// directories.
pub fn needs_capture(
    registry: &WindowRegistry,
    current: WindowId,
    target: WindowId,
    auto_follow: bool,
) -> bool {
    if current == target {
        return false;
    }
    auto_follow || registry.effective_local_dir(current) != registry.effective_local_dir(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_auto_follow_target() {
        let fs = OsFilesystem;
        assert_eq!(
            fs.auto_follow_target(Some(Path::new("/src/lib.rs"))),
            Some(PathBuf::from("/src"))
        );
        assert_eq!(fs.auto_follow_target(Some(Path::new("lib.rs"))), None);
        assert_eq!(fs.auto_follow_target(None), None);
    }

    #[test]
    fn test_needs_capture_rules() {
        let mut registry = WindowRegistry::new();
        let a = registry.current_window();
        let tab = registry.current_tabpage();
        let b = registry
            .split_window(tab, registry.current_buffer())
            .unwrap();

        assert!(!needs_capture(&registry, a, a, true));
        assert!(!needs_capture(&registry, a, b, false));
        assert!(needs_capture(&registry, a, b, true));

        // Same tabpage-local directory on both sides: still nothing to capture.
        registry
            .tabpage_mut(tab)
            .unwrap()
            .set_local_dir(Some(PathBuf::from("/tab")));
        assert!(!needs_capture(&registry, a, b, false));

        registry
            .window_mut(b)
            .unwrap()
            .set_local_dir(Some(PathBuf::from("/win")));
        assert!(needs_capture(&registry, a, b, false));
        assert!(needs_capture(&registry, b, a, false));
    }
}
