//! Process-wide cache of parsed source maps.
//!
//! Maps are cached per generated file, with a reverse index so a lookup
//! from any of a map's original sources lands on the same entry. Every
//! cached entry is paired with a watcher on the generated file; a change or
//! delete event evicts the entry outright, and the next lookup re-fetches.
//! There is no refresh path and no staleness check on reads.
//!
//! The cache, the reverse index, and the watcher table live behind one
//! mutex and are mutated together; a lookup never observes one updated
//! without the others.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use sourcenav_map::{SourceMapItem, paths};

use crate::error::Result;
use crate::fetch::{self, MapReference};
use crate::host::{EditorHost, WatchEvent, WatchSubscription};

#[derive(Default)]
struct StoreInner {
    /// Generated-file path → parsed map.
    cache: HashMap<PathBuf, Arc<SourceMapItem>>,
    /// Original-source path → generated-file path. Many-to-one; when two
    /// maps claim the same source the last writer wins.
    reverse: HashMap<PathBuf, PathBuf>,
    /// Generated-file path → live watch subscription.
    watchers: HashMap<PathBuf, Box<dyn WatchSubscription>>,
    disposed: bool,
}

/// The map cache, owned by whoever drives navigation and torn down with
/// [`SourceMapStore::dispose`].
pub struct SourceMapStore {
    inner: Arc<Mutex<StoreInner>>,
    host: Arc<dyn EditorHost>,
    events: mpsc::UnboundedSender<WatchEvent>,
    invalidation: JoinHandle<()>,
}

impl SourceMapStore {
    /// Create a store. Must be called inside a tokio runtime: the store
    /// spawns a task that turns watcher events into evictions.
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        let inner: Arc<Mutex<StoreInner>> = Arc::default();
        let (events, receiver) = mpsc::unbounded_channel();
        let invalidation = tokio::spawn(invalidation_loop(Arc::downgrade(&inner), receiver));
        Self {
            inner,
            host,
            events,
            invalidation,
        }
    }

    /// Resolve the map for a document, fetching and caching on a miss.
    ///
    /// The document may be a generated file (looked up directly, or via its
    /// trailing directive on a miss) or a known original source (looked up
    /// through the reverse index). Hits return synchronously with no
    /// staleness check; a concurrent miss for the same document duplicates
    /// the fetch, and the last write wins on the cache slot.
    pub async fn get_for_document(&self, path: &Path, text: &str) -> Result<Arc<SourceMapItem>> {
        let normalized = paths::normalize(path);
        if let Some(item) = self.get_cached(&normalized) {
            debug!(path = %normalized.display(), "source map cache hit");
            return Ok(item);
        }

        let fetched = fetch::fetch_map_reference(&normalized, text)?;
        let item = Arc::new(match fetched.reference {
            MapReference::DataUrl(url) => SourceMapItem::from_data_url(&url, &normalized)?,
            MapReference::MapFile(map_path) => SourceMapItem::from_file(&map_path).await?,
        });

        // A registration failure (the watcher could not be started) leaves
        // the entry uncached so the watch invariant holds; the caller still
        // gets a usable item for this navigation.
        if let Err(error) = self.register(Arc::clone(&item)) {
            warn!(
                generated = %item.generated_file().display(),
                error = %error,
                "source map not cached"
            );
        }
        Ok(item)
    }

    /// The cached map covering `path`, which may be a generated file or one
    /// of a cached map's original sources.
    pub fn get_cached(&self, path: &Path) -> Option<Arc<SourceMapItem>> {
        let normalized = paths::normalize(path);
        let inner = self.locked();
        if let Some(item) = inner.cache.get(&normalized) {
            return Some(Arc::clone(item));
        }
        let generated = inner.reverse.get(&normalized)?;
        inner.cache.get(generated).map(Arc::clone)
    }

    /// Evict the entry for a generated file: its watcher, its cache slot,
    /// and every reverse-index entry pointing at it. No-op when absent.
    pub fn remove_item(&self, generated: &Path) {
        let normalized = paths::normalize(generated);
        let (watcher, removed) = {
            let mut inner = self.locked();
            let removed = inner.cache.remove(&normalized).is_some();
            inner.reverse.retain(|_, target| *target != normalized);
            (inner.watchers.remove(&normalized), removed)
        };
        // The watcher teardown joins its worker thread; keep that outside
        // the lock.
        drop(watcher);
        if removed {
            debug!(generated = %normalized.display(), "evicted source map");
        }
    }

    /// Tear the store down: evict everything and stop the invalidation
    /// task. Idempotent.
    pub fn dispose(&self) {
        self.invalidation.abort();
        let watchers: Vec<Box<dyn WatchSubscription>> = {
            let mut inner = self.locked();
            inner.disposed = true;
            inner.cache.clear();
            inner.reverse.clear();
            inner.watchers.drain().map(|(_, watcher)| watcher).collect()
        };
        if !watchers.is_empty() {
            debug!(count = watchers.len(), "source map store disposed");
        }
        drop(watchers);
    }

    fn register(&self, item: Arc<SourceMapItem>) -> Result<()> {
        let generated = item.generated_file().to_path_buf();
        let watcher = self.host.watch_file(&generated, self.events.clone())?;

        let replaced = {
            let mut inner = self.locked();
            if inner.disposed {
                return Ok(());
            }
            let replaced = inner.watchers.insert(generated.clone(), watcher);
            inner.cache.insert(generated.clone(), Arc::clone(&item));
            for source in item.source_files() {
                inner.reverse.insert(source.clone(), generated.clone());
            }
            replaced
        };
        drop(replaced);

        debug!(
            generated = %generated.display(),
            sources = item.source_files().len(),
            "cached source map"
        );
        Ok(())
    }

    fn locked(&self) -> MutexGuard<'_, StoreInner> {
        // A panic while holding the lock poisons it; the tables are still
        // consistent enough to keep serving lookups.
        self.inner.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl Drop for SourceMapStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn invalidation_loop(
    inner: Weak<Mutex<StoreInner>>,
    mut events: mpsc::UnboundedReceiver<WatchEvent>,
) {
    while let Some(event) = events.recv().await {
        let (WatchEvent::Changed(path) | WatchEvent::Removed(path)) = event;
        let Some(inner) = inner.upgrade() else {
            break;
        };

        let normalized = paths::normalize(&path);
        let watcher = {
            let mut inner = inner.lock().unwrap_or_else(|err| err.into_inner());
            inner.cache.remove(&normalized);
            inner.reverse.retain(|_, target| *target != normalized);
            inner.watchers.remove(&normalized)
        };
        drop(watcher);
        debug!(generated = %normalized.display(), "evicted source map after file event");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

    use super::*;
    use crate::host::testing::MockHost;

    const MAP_JSON: &str = r#"{
        "version": 3,
        "file": "app.js",
        "sourceRoot": "../src",
        "sources": ["a.ts"],
        "names": [],
        "mappings": "AAAA,IAAI;AACJ"
    }"#;

    /// A generated document whose map rides along as a data URI, so store
    /// tests never touch the filesystem.
    fn generated_text() -> String {
        format!(
            "const x = 1;\n//# sourceMappingURL=data:application/json;base64,{}\n",
            BASE64_STANDARD.encode(MAP_JSON)
        )
    }

    async fn wait_until(mut check: impl FnMut() -> bool) {
        for _ in 0..100 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within timeout");
    }

    #[tokio::test]
    async fn caches_on_miss_and_hits_afterwards() {
        let host = MockHost::new();
        let store = SourceMapStore::new(Arc::new(host.clone()));

        let item = store
            .get_for_document(Path::new("/proj/dist/app.js"), &generated_text())
            .await
            .unwrap();
        assert_eq!(item.generated_file(), Path::new("/proj/dist/app.js"));
        assert_eq!(host.watch_count(), 1);

        // Second lookup hits the cache: text without a directive would fail
        // a fetch, so a success proves no fetch happened.
        let again = store
            .get_for_document(Path::new("/proj/dist/app.js"), "no directive here")
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&item, &again));
    }

    #[tokio::test]
    async fn original_source_resolves_through_reverse_index() {
        let host = MockHost::new();
        let store = SourceMapStore::new(Arc::new(host.clone()));

        store
            .get_for_document(Path::new("/proj/dist/app.js"), &generated_text())
            .await
            .unwrap();

        // The source document has no directive of its own; only the reverse
        // index can resolve it.
        let item = store
            .get_for_document(Path::new("/proj/src/a.ts"), "let a = 1;")
            .await
            .unwrap();
        assert_eq!(item.generated_file(), Path::new("/proj/dist/app.js"));
    }

    #[tokio::test]
    async fn fetch_failure_leaves_no_state_behind() {
        let host = MockHost::new();
        let store = SourceMapStore::new(Arc::new(host.clone()));

        let err = store
            .get_for_document(Path::new("/proj/dist/app.js"), "no directive")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "can't fetch url from current document");
        assert!(store.get_cached(Path::new("/proj/dist/app.js")).is_none());
        assert_eq!(host.watch_count(), 0);
    }

    #[tokio::test]
    async fn change_event_evicts_cache_and_reverse_entries() {
        let host = MockHost::new();
        let store = SourceMapStore::new(Arc::new(host.clone()));

        store
            .get_for_document(Path::new("/proj/dist/app.js"), &generated_text())
            .await
            .unwrap();
        assert!(store.get_cached(Path::new("/proj/src/a.ts")).is_some());

        host.fire_change(Path::new("/proj/dist/app.js"));
        wait_until(|| store.get_cached(Path::new("/proj/dist/app.js")).is_none()).await;

        // Reverse entries for the evicted map are gone too, and the watcher
        // was dropped.
        assert!(store.get_cached(Path::new("/proj/src/a.ts")).is_none());
        wait_until(|| host.watch_count() == 0).await;

        // The next lookup is a genuine miss and re-fetches.
        let item = store
            .get_for_document(Path::new("/proj/dist/app.js"), &generated_text())
            .await
            .unwrap();
        assert_eq!(item.generated_file(), Path::new("/proj/dist/app.js"));
    }

    #[tokio::test]
    async fn remove_item_is_a_no_op_when_absent() {
        let host = MockHost::new();
        let store = SourceMapStore::new(Arc::new(host));
        store.remove_item(Path::new("/proj/dist/never-cached.js"));
    }

    #[tokio::test]
    async fn watch_failure_returns_item_uncached() {
        let host = MockHost::new();
        host.set_fail_watch(true);
        let store = SourceMapStore::new(Arc::new(host.clone()));

        let item = store
            .get_for_document(Path::new("/proj/dist/app.js"), &generated_text())
            .await
            .unwrap();
        assert_eq!(item.generated_file(), Path::new("/proj/dist/app.js"));
        // Not cached: the watch invariant would be broken.
        assert!(store.get_cached(Path::new("/proj/dist/app.js")).is_none());
    }

    #[tokio::test]
    async fn dispose_clears_everything_and_is_idempotent() {
        let host = MockHost::new();
        let store = SourceMapStore::new(Arc::new(host.clone()));

        store
            .get_for_document(Path::new("/proj/dist/app.js"), &generated_text())
            .await
            .unwrap();
        assert_eq!(host.watch_count(), 1);

        store.dispose();
        assert!(store.get_cached(Path::new("/proj/dist/app.js")).is_none());
        assert_eq!(host.watch_count(), 0);

        store.dispose();
        assert_eq!(host.watch_count(), 0);
    }
}
