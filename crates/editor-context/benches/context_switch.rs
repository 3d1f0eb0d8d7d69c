use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use editor_context::{
    ContextOptions, EditorSession, Filesystem, PopupAnchor, PopupMenuItem, Position, WindowId,
};
use std::io;
use std::path::{Path, PathBuf};

/// Working directory that never touches the process state.
struct InMemoryFs {
    cwd: PathBuf,
}

impl Filesystem for InMemoryFs {
    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn set_current_dir(&mut self, path: &Path) -> io::Result<()> {
        self.cwd = path.to_path_buf();
        Ok(())
    }
}

fn session_with_windows(window_count: usize) -> (EditorSession, Vec<WindowId>) {
    let mut session = EditorSession::new(
        InMemoryFs {
            cwd: PathBuf::from("/bench"),
        },
        ContextOptions::default(),
    );
    let tab = session.registry().current_tabpage();
    let text = "fn main() {}\n".repeat(1_000);
    let buffer = session.registry_mut().open_buffer(None, &text);

    let mut windows = vec![session.registry().current_window()];
    for i in 1..window_count {
        let id = session.registry_mut().split_window(tab, buffer).unwrap();
        if i % 2 == 0 {
            session
                .registry_mut()
                .window_mut(id)
                .unwrap()
                .set_local_dir(Some(PathBuf::from(format!("/bench/{i}"))));
        }
        windows.push(id);
    }
    (session, windows)
}

fn bench_execute_in_context(c: &mut Criterion) {
    let (mut session, windows) = session_with_windows(16);
    let target = windows[8];
    c.bench_function("execute_in_context/local_dir", |b| {
        b.iter(|| {
            session
                .execute_in_window(black_box(target), |session| {
                    let here = session.registry().current_window();
                    session
                        .registry_mut()
                        .set_cursor(here, Position::new(500, 3))
                        .unwrap();
                })
                .unwrap();
        })
    });
}

fn bench_nested_contexts(c: &mut Criterion) {
    fn visit(session: &mut EditorSession, windows: &[WindowId]) {
        let Some((first, rest)) = windows.split_first() else {
            return;
        };
        session
            .execute_in_window(*first, |session| visit(session, rest))
            .unwrap();
    }

    c.bench_function("execute_in_context/nested_16", |b| {
        b.iter_batched(
            || session_with_windows(16),
            |(mut session, windows)| {
                visit(&mut session, &windows[1..]);
                black_box(session.registry().current_window());
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_popup_selection(c: &mut Criterion) {
    let (mut session, _) = session_with_windows(1);
    session.popup_mut().attach_ui(|event: &editor_context::UiEvent| {
        black_box(event);
    });
    let items: Vec<PopupMenuItem> = (0..200)
        .map(|i| PopupMenuItem::new(format!("candidate_{i}")))
        .collect();

    c.bench_function("popup/show_cycle_hide_200", |b| {
        b.iter(|| {
            let popup = session.popup_mut();
            popup.show(items.clone(), true, PopupAnchor::CommandLine { col: 0 });
            for i in 0..items.len() {
                popup.select(Some(i));
            }
            popup.hide();
        })
    });
}

criterion_group!(
    benches,
    bench_execute_in_context,
    bench_nested_contexts,
    bench_popup_selection
);
criterion_main!(benches);
