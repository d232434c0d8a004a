//! Single-file watching for cache invalidation.
//!
//! Each cached map gets its own watcher on the generated file. Events are
//! debounced so a burst of saves collapses into one invalidation, then
//! forwarded into a channel; the store drains that channel from its own
//! task.

use std::path::Path;
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{DebouncedEvent, Debouncer, new_debouncer};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::host::{WatchEvent, WatchSubscription};

/// Default debounce for filesystem events (in milliseconds).
const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Watches one file and forwards debounced change/delete events into a
/// channel. Dropping the watcher cancels the subscription.
pub struct FileWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
}

impl FileWatcher {
    /// Watch `path` with the default debounce.
    pub fn watch(path: &Path, events: UnboundedSender<WatchEvent>) -> notify::Result<Self> {
        Self::watch_with_debounce(path, events, Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    pub fn watch_with_debounce(
        path: &Path,
        events: UnboundedSender<WatchEvent>,
        debounce: Duration,
    ) -> notify::Result<Self> {
        let mut debouncer = new_debouncer(
            debounce,
            move |result: std::result::Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(batch) => {
                    for event in batch {
                        // The debouncer reports only that something happened
                        // to the path; distinguish deletion by looking at the
                        // filesystem.
                        let watch_event = if event.path.exists() {
                            WatchEvent::Changed(event.path)
                        } else {
                            WatchEvent::Removed(event.path)
                        };
                        debug!(event = ?watch_event, "watched file event");
                        if events.send(watch_event).is_err() {
                            // Receiver dropped, watcher is moot.
                            break;
                        }
                    }
                }
                Err(error) => {
                    warn!(error = %error, "filesystem watch error");
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(path, RecursiveMode::NonRecursive)?;

        debug!(path = %path.display(), "watching file");
        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

impl WatchSubscription for FileWatcher {}
