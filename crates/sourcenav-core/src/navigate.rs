//! The top-level navigation use case.
//!
//! A navigation resolves the active document's map, picks the mapping
//! direction from which side of the map the document is on, translates the
//! cursor, and hands the destination to the host: the file on disk when it
//! exists, otherwise an untitled buffer filled with embedded source text.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use sourcenav_map::FilePosition;

use crate::error::{Error, Result};
use crate::fetch::{self, MapReference};
use crate::host::{EditorHost, Selection};
use crate::store::SourceMapStore;

/// A clickable range in a document, pointing at its map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// 0-based line of the directive value.
    pub line: u32,
    /// 0-based column range of the directive value.
    pub start_column: u32,
    pub end_column: u32,
    pub target: LinkTarget,
}

/// What a document link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A map file on disk.
    MapFile(std::path::PathBuf),
    /// A map embedded in the document itself; there is nothing on disk to
    /// point at.
    InlineMap,
}

/// Drives navigations against a host editor. Owns the map store; dropping
/// the navigator tears the store down.
pub struct Navigator {
    host: Arc<dyn EditorHost>,
    store: SourceMapStore,
}

impl Navigator {
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        let store = SourceMapStore::new(Arc::clone(&host));
        Self { host, store }
    }

    pub fn store(&self) -> &SourceMapStore {
        &self.store
    }

    /// Resolve the active cursor through the map and open the destination.
    ///
    /// Strictly sequential: fetch the map, translate, open, place the
    /// selection. Any stage failing fails the navigation; nothing is
    /// retried.
    pub async fn navigate(&self) -> Result<()> {
        let active = self.host.active_document()?;
        let item = self.store.get_for_document(&active.path, &active.text).await?;

        let cursor = FilePosition::new(&active.path, active.line, active.column);
        let destination = if item.is_generated_file(&active.path) {
            debug!(document = %active.path.display(), "translating generated → original");
            item.original_position_for(&cursor)?
        } else {
            debug!(document = %active.path.display(), "translating original → generated");
            item.generated_position_for(&cursor)?
        };

        self.open_destination(&destination).await
    }

    /// Run a navigation, reducing any failure to one user-facing warning
    /// plus a diagnostic log entry. This is the only place errors reach the
    /// user.
    pub async fn navigate_or_warn(&self) {
        if let Err(error) = self.navigate().await {
            warn!(error = ?error, "navigation failed");
            self.host.show_warning(&error.to_string());
        }
    }

    /// Link-provider query: the clickable directive range of `text`, when
    /// it has one that resolves. Failures yield no links rather than an
    /// error.
    pub fn document_links(&self, document: &Path, text: &str) -> Vec<DocumentLink> {
        match fetch::locate(document, text) {
            Ok((fetched, span)) => {
                let target = match fetched.reference {
                    MapReference::MapFile(path) => LinkTarget::MapFile(path),
                    MapReference::DataUrl(_) => LinkTarget::InlineMap,
                };
                vec![DocumentLink {
                    line: span.line,
                    start_column: span.start_column,
                    end_column: span.end_column,
                    target,
                }]
            }
            Err(_) => Vec::new(),
        }
    }

    /// Text of an inline/embedded original source, for read-only display of
    /// files that exist only inside a cached map.
    pub fn virtual_content(&self, source: &Path) -> Option<String> {
        let item = self.store.get_cached(source)?;
        item.embedded_content(source).map(str::to_string)
    }

    async fn open_destination(&self, destination: &FilePosition) -> Result<()> {
        let selection = Selection {
            line: destination.line(),
            column: destination.column(),
        };

        match self.host.open_file(destination.file(), selection).await {
            Ok(()) => Ok(()),
            Err(open_error) => match destination.contents() {
                Some(contents) => {
                    debug!(
                        file = %destination.file().display(),
                        "destination not openable on disk; using embedded content"
                    );
                    self.host.open_untitled(contents, selection).await
                }
                None => {
                    debug!(
                        file = %destination.file().display(),
                        error = %open_error,
                        "destination not openable and no embedded content"
                    );
                    Err(Error::Destination(destination.file().to_path_buf()))
                }
            },
        }
    }
}
