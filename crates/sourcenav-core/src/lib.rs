//! Source-map navigation engine.
//!
//! Resolves bidirectional position mappings between a generated artifact
//! (bundled or transpiled code) and its original sources: given a cursor in
//! either file, it finds the corresponding position in the other and hands
//! the destination to a host editor, including sources that exist only as
//! content embedded in the map payload.
//!
//! The engine is host-agnostic: everything editor-shaped (active document,
//! opening destinations, file watching, warnings) goes through the
//! [`EditorHost`] trait. Parsed maps are cached per generated file in a
//! [`SourceMapStore`] and evicted when the file changes on disk; the
//! [`Navigator`] ties the pieces into the navigate / document-link /
//! virtual-content operations a front end exposes.

pub mod error;
pub mod fetch;
pub mod host;
pub mod navigate;
pub mod store;
pub mod watch;

// Re-export main types
pub use error::{Error, Result};
pub use fetch::{DirectiveSpan, FetchedMap, MapReference, fetch_map_reference};
pub use host::{ActiveDocument, EditorHost, Selection, WatchEvent, WatchSubscription};
pub use navigate::{DocumentLink, LinkTarget, Navigator};
pub use store::SourceMapStore;
pub use watch::FileWatcher;
