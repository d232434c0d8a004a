//! The host editor collaborator boundary.
//!
//! The engine never talks to an editor directly; everything it needs from
//! the host (the active document, destination opening, file watching,
//! user-facing warnings) goes through [`EditorHost`]. Hosts differ widely
//! (a terminal front end, an editor plugin, a test double), so the trait is
//! defined purely in terms of Rust types and keeps each capability to one
//! method.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::Result;

/// A view of the host's active document.
#[derive(Debug, Clone)]
pub struct ActiveDocument {
    /// Absolute path of the document.
    pub path: PathBuf,
    /// Full document text.
    pub text: String,
    /// 0-based cursor line.
    pub line: u32,
    /// 0-based cursor column.
    pub column: u32,
}

/// Cursor placement for an opened destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// 0-based line.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
}

/// A change to a watched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Changed(PathBuf),
    Removed(PathBuf),
}

/// An active watch registration; dropping it cancels the subscription.
pub trait WatchSubscription: Send {}

/// The editor capabilities the engine consumes.
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// The currently focused document and cursor.
    fn active_document(&self) -> Result<ActiveDocument>;

    /// Subscribe to change/delete events for a single file. Events are
    /// delivered on `events`; the returned subscription is cancelled by
    /// dropping it.
    fn watch_file(
        &self,
        path: &Path,
        events: UnboundedSender<WatchEvent>,
    ) -> io::Result<Box<dyn WatchSubscription>>;

    /// Open a file that exists on disk and place the cursor. Fails when the
    /// file is absent.
    async fn open_file(&self, path: &Path, selection: Selection) -> Result<()>;

    /// Open an untitled buffer pre-filled with `text` and place the cursor,
    /// for destinations that exist only inside a map payload.
    async fn open_untitled(&self, text: &str, selection: Selection) -> Result<()>;

    /// Present a single human-readable warning to the user.
    fn show_warning(&self, message: &str);
}
