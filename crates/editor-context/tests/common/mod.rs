#![allow(dead_code)]

use editor_context::{ContextOptions, EditorSession, Filesystem, UiEvent};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct FakeFsState {
    pub cwd: PathBuf,
    pub dirs: HashSet<PathBuf>,
    pub queries: usize,
    pub changes: Vec<PathBuf>,
    pub query_fails: bool,
}

/// In-memory working directory shared between a session and the test body.
#[derive(Debug, Clone, Default)]
pub struct FakeFilesystem(Rc<RefCell<FakeFsState>>);

impl FakeFilesystem {
    pub fn new(cwd: &str, dirs: &[&str]) -> Self {
        let fs = Self::default();
        {
            let mut state = fs.0.borrow_mut();
            state.cwd = PathBuf::from(cwd);
            state.dirs.insert(PathBuf::from(cwd));
            state.dirs.extend(dirs.iter().map(PathBuf::from));
        }
        fs
    }

    pub fn cwd(&self) -> PathBuf {
        self.0.borrow().cwd.clone()
    }

    pub fn queries(&self) -> usize {
        self.0.borrow().queries
    }

    pub fn changes(&self) -> Vec<PathBuf> {
        self.0.borrow().changes.clone()
    }

    pub fn remove_dir(&self, dir: &str) {
        self.0.borrow_mut().dirs.remove(Path::new(dir));
    }

    pub fn set_query_fails(&self, fails: bool) {
        self.0.borrow_mut().query_fails = fails;
    }
}

impl Filesystem for FakeFilesystem {
    fn current_dir(&self) -> io::Result<PathBuf> {
        let mut state = self.0.borrow_mut();
        state.queries += 1;
        if state.query_fails {
            return Err(io::Error::new(io::ErrorKind::NotFound, "cwd unavailable"));
        }
        Ok(state.cwd.clone())
    }

    fn set_current_dir(&mut self, path: &Path) -> io::Result<()> {
        let mut state = self.0.borrow_mut();
        if !state.dirs.contains(path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        state.cwd = path.to_path_buf();
        state.changes.push(path.to_path_buf());
        Ok(())
    }
}

pub fn session_with(fs: &FakeFilesystem, options: ContextOptions) -> EditorSession {
    EditorSession::new(fs.clone(), options)
}

pub fn record_events(session: &mut EditorSession) -> Rc<RefCell<Vec<UiEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    session
        .popup_mut()
        .attach_ui(move |event: &UiEvent| sink.borrow_mut().push(event.clone()));
    events
}
