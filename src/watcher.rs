//! File watcher for continuous precompilation
//!
//! Implements the `watch` command with:
//! - Debouncing (100ms)
//! - Entity-scoped incremental rebuilds
//! - Graceful Ctrl+C shutdown
//! - NDJSON output for CI

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::catalog::{Entity, FileCatalog};
use crate::error::{BinderyError, BinderyResult};
use crate::events::{BuildEvent, Reporter};

/// Debounce duration in milliseconds
const DEBOUNCE_MS: u64 = 100;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Source tree to watch
    pub source: PathBuf,
    /// Entity query limiting the initial build
    pub query: String,
}

/// Watcher state for debouncing
struct WatcherState {
    pending_changes: HashSet<PathBuf>,
    last_change: Option<Instant>,
}

impl WatcherState {
    fn new() -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
        }
    }

    fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    fn should_rebuild(&self) -> bool {
        if let Some(last) = self.last_change {
            !self.pending_changes.is_empty()
                && last.elapsed() >= Duration::from_millis(DEBOUNCE_MS)
        } else {
            false
        }
    }

    fn take_changes(&mut self) -> Vec<PathBuf> {
        let changes: Vec<_> = self.pending_changes.drain().collect();
        self.last_change = None;
        changes
    }
}

/// Only javascript sources trigger rebuilds
fn is_watched(path: &Path) -> bool {
    path.extension().map(|e| e == "js").unwrap_or(false)
}

/// Map a batch of changed paths to the entities that own them, deduplicated,
/// catalog order. Paths outside any known entity are dropped.
fn entities_for_changes<'a>(
    catalog: &'a FileCatalog,
    changes: &[PathBuf],
) -> Vec<&'a Entity> {
    let mut seen = HashSet::new();
    let mut entities = Vec::new();
    for path in changes {
        if let Some(entity) = catalog.entity_for_path(path) {
            if seen.insert(entity.path_string.clone()) {
                entities.push(entity);
            }
        }
    }
    entities
}

/// Start watching for file changes.
///
/// `rebuild` runs the precompile pipeline for a single entity and returns
/// the number of files written. Rebuilds are serialized; a failing rebuild
/// is reported and the loop keeps running.
pub fn watch<F>(
    catalog: &FileCatalog,
    options: WatchOptions,
    running: Arc<AtomicBool>,
    reporter: &Reporter,
    mut rebuild: F,
) -> BinderyResult<()>
where
    F: FnMut(&Entity) -> BinderyResult<usize>,
{
    reporter.emit(BuildEvent::WatchStarted {
        source: options.source.display().to_string(),
    });

    // Full build first so the output tree is current before we go incremental
    let initial: Vec<Entity> = catalog
        .entities(&options.query)?
        .into_iter()
        .cloned()
        .collect();
    for entity in &initial {
        rebuild_one(entity, reporter, &mut rebuild);
    }

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        Config::default(),
    )
    .map_err(|e| {
        BinderyError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))
    })?;

    watcher
        .watch(&options.source, RecursiveMode::Recursive)
        .map_err(|e| {
            BinderyError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                e.to_string(),
            ))
        })?;

    let mut state = WatcherState::new();

    while running.load(Ordering::SeqCst) {
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            if is_watched(&path) {
                reporter.emit(BuildEvent::FileChanged {
                    path: path.display().to_string(),
                });
                state.add_change(path);
            }
        }

        if state.should_rebuild() {
            let changes = state.take_changes();
            let entities: Vec<Entity> = entities_for_changes(catalog, &changes)
                .into_iter()
                .cloned()
                .collect();
            for entity in &entities {
                rebuild_one(entity, reporter, &mut rebuild);
            }
        }
    }

    reporter.emit(BuildEvent::Shutdown);
    Ok(())
}

fn rebuild_one<F>(entity: &Entity, reporter: &Reporter, rebuild: &mut F)
where
    F: FnMut(&Entity) -> BinderyResult<usize>,
{
    reporter.emit(BuildEvent::RebuildStarted {
        entity: entity.path_string.clone(),
    });
    match rebuild(entity) {
        Ok(written) => reporter.emit(BuildEvent::RebuildComplete {
            entity: entity.path_string.clone(),
            written,
        }),
        Err(e) => reporter.emit(BuildEvent::Error {
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Site, SourceFile};
    use tempfile::tempdir;

    fn catalog() -> FileCatalog {
        let mut catalog = FileCatalog::new("/project/sources");
        catalog.add_site(Site::new("base"));
        catalog.add_entity(
            Entity::new("base", "base/modules/teaser").with_file(SourceFile::new(
                "/project/sources/base/modules/teaser/js/teaser.js",
                "base",
            )),
        );
        catalog.add_entity(
            Entity::new("base", "base/global/js").with_file(SourceFile::new(
                "/project/sources/base/global/js/bootstrap.js",
                "base",
            )),
        );
        catalog
    }

    #[test]
    fn only_js_files_are_watched() {
        assert!(is_watched(Path::new("sources/base/modules/teaser/js/teaser.js")));
        assert!(!is_watched(Path::new("sources/base/modules/teaser/css/teaser.css")));
        assert!(!is_watched(Path::new("sources/base/modules/teaser/README")));
    }

    #[test]
    fn changes_map_to_owning_entities_without_duplicates() {
        let catalog = catalog();
        let changes = vec![
            PathBuf::from("/project/sources/base/modules/teaser/js/teaser.js"),
            PathBuf::from("/project/sources/base/modules/teaser/js/helper.js"),
            PathBuf::from("/project/elsewhere/stray.js"),
        ];

        let entities = entities_for_changes(&catalog, &changes);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].path_string, "base/modules/teaser");
    }

    #[test]
    fn watcher_state_debounces() {
        let mut state = WatcherState::new();
        assert!(!state.should_rebuild());

        state.add_change(PathBuf::from("teaser.js"));
        assert!(!state.should_rebuild());

        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 10));
        assert!(state.should_rebuild());

        let changes = state.take_changes();
        assert_eq!(changes.len(), 1);
        assert!(!state.should_rebuild());
    }

    #[test]
    fn watcher_state_coalesces_repeated_changes() {
        let mut state = WatcherState::new();
        state.add_change(PathBuf::from("teaser.js"));
        state.add_change(PathBuf::from("teaser.js"));
        state.add_change(PathBuf::from("teaser.js"));

        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 10));
        assert_eq!(state.take_changes().len(), 1);
    }

    #[test]
    fn initial_build_covers_every_matched_entity() {
        let dir = tempdir().unwrap();
        let catalog = catalog();

        let options = WatchOptions {
            source: dir.path().to_path_buf(),
            query: "*".to_string(),
        };
        let running = Arc::new(AtomicBool::new(false)); // stop right after initial build
        let mut rebuilt = Vec::new();

        watch(&catalog, options, running, &Reporter::silent(), |entity| {
            rebuilt.push(entity.path_string.clone());
            Ok(1)
        })
        .unwrap();

        assert_eq!(rebuilt, vec!["base/modules/teaser", "base/global/js"]);
    }

    #[test]
    fn failing_rebuild_does_not_stop_the_loop() {
        let dir = tempdir().unwrap();
        let catalog = catalog();

        let options = WatchOptions {
            source: dir.path().to_path_buf(),
            query: "*".to_string(),
        };
        let running = Arc::new(AtomicBool::new(false));
        let mut calls = 0;

        watch(&catalog, options, running, &Reporter::silent(), |_entity| {
            calls += 1;
            Err(BinderyError::Transpile {
                file: PathBuf::from("teaser.js"),
                message: "unexpected token".to_string(),
            })
        })
        .unwrap();

        assert_eq!(calls, 2);
    }
}
