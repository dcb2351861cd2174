// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! File system watching for development-mode regeneration.
//!
//! [`ChangeWatcher::subscribe`] returns a cancellable subscription: a handle
//! plus a stream of debounced [`ChangeBatch`] values. Dropping the handle
//! releases the underlying watcher deterministically; no orphaned watchers
//! survive a dev-session shutdown.
//!
//! Batches keep removed paths separate from changed/added ones so the
//! consumer can skip deletions of files that were never part of the current
//! component registry.

use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, Debouncer, RecommendedCache};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Debounce window for file-change events.
const DEBOUNCE: Duration = Duration::from_millis(750);

/// Watcher setup failure.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The watcher could not be created or attached to the path.
    #[error("failed to watch {path}: {source}")]
    Watch {
        /// The path that could not be watched.
        path: PathBuf,
        /// The underlying notify error.
        source: notify::Error,
    },
}

/// One debounced batch of relevant file-system events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    /// Files added or modified.
    pub changed: Vec<PathBuf>,
    /// Files removed.
    pub removed: Vec<PathBuf>,
}

impl ChangeBatch {
    /// Whether the batch carries no events at all.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// A cancellable file-watch subscription.
///
/// The subscription stays active for the lifetime of this handle; dropping
/// it stops the watcher and closes the event stream.
pub struct ChangeWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl ChangeWatcher {
    /// Subscribes to the component source tree: recursive, `.vue` files.
    pub fn components(
        src_dir: &Path,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ChangeBatch>), WatchError> {
        Self::subscribe(src_dir, RecursiveMode::Recursive, |path: &Path| {
            path.extension().and_then(|e| e.to_str()) == Some("vue")
        })
    }

    /// Subscribes to manifest changes in the project root.
    pub fn manifest(
        project_dir: &Path,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ChangeBatch>), WatchError> {
        Self::subscribe(project_dir, RecursiveMode::NonRecursive, |path: &Path| {
            path.file_name().and_then(|n| n.to_str()) == Some(crate::manifest::MANIFEST_FILE)
        })
    }

    /// Subscribes to `path`, forwarding debounced batches of events whose
    /// paths pass `filter`.
    pub fn subscribe<F>(
        path: &Path,
        mode: RecursiveMode,
        filter: F,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ChangeBatch>), WatchError>
    where
        F: Fn(&Path) -> bool + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let watch_err = |source: notify::Error| WatchError::Watch {
            path: path.to_path_buf(),
            source,
        };

        let mut debouncer = new_debouncer(
            DEBOUNCE,
            None,
            move |result: Result<Vec<notify_debouncer_full::DebouncedEvent>, Vec<notify::Error>>| {
                let Ok(events) = result else {
                    return;
                };

                let mut batch = ChangeBatch::default();
                for event in &events {
                    let removed = matches!(event.kind, EventKind::Remove(_));
                    for event_path in &event.paths {
                        if !filter(event_path) {
                            continue;
                        }
                        let bucket = if removed {
                            &mut batch.removed
                        } else {
                            &mut batch.changed
                        };
                        if !bucket.contains(event_path) {
                            bucket.push(event_path.clone());
                        }
                    }
                }

                if !batch.is_empty() {
                    // The receiver side going away just means the dev
                    // session is shutting down.
                    let _ = tx.send(batch);
                }
            },
        )
        .map_err(watch_err)?;

        debouncer.watch(path, mode).map_err(watch_err)?;

        Ok((Self { _debouncer: debouncer }, rx))
    }
}
