//! Locating the source-map reference inside a generated document.
//!
//! Generated files conventionally carry a trailing comment naming their
//! map. Only the last few lines are scanned, and when several lines match
//! the one closest to the end of the document wins; bundles sometimes
//! contain stray comment text resembling the directive further up.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use sourcenav_map::paths;

use crate::error::{Error, Result};

/// How many trailing lines of a document are scanned for the directive.
const SCAN_WINDOW: usize = 10;

static SOURCE_MAPPING_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//[#@]? ?sourceMappingURL=(\S+)").unwrap());

/// Where a document's source map lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapReference {
    /// An inline `data:` URI, kept verbatim.
    DataUrl(String),
    /// A map file path, resolved against the document's directory.
    MapFile(PathBuf),
}

/// The resolved directive of a generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMap {
    /// The document's own absolute path. Always the generated side,
    /// whatever direction the caller later maps in.
    pub file: PathBuf,
    pub reference: MapReference,
}

/// Where the directive's value sits in the document, for link providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveSpan {
    /// 0-based line.
    pub line: u32,
    /// 0-based column of the value's first character.
    pub start_column: u32,
    /// 0-based column one past the value's last character.
    pub end_column: u32,
}

/// Find the map reference for `document`, scanning the last lines of
/// `text`.
pub fn fetch_map_reference(document: &Path, text: &str) -> Result<FetchedMap> {
    locate(document, text).map(|(fetched, _)| fetched)
}

/// As [`fetch_map_reference`], additionally reporting where the directive
/// value sits.
pub fn locate(document: &Path, text: &str) -> Result<(FetchedMap, DirectiveSpan)> {
    let lines: Vec<&str> = text.lines().collect();

    for (index, line) in lines.iter().enumerate().rev().take(SCAN_WINDOW) {
        let Some(captures) = SOURCE_MAPPING_URL.captures(line) else {
            continue;
        };
        let Some(value) = captures.get(1) else {
            continue;
        };

        let reference = if value.as_str().starts_with("data:") {
            MapReference::DataUrl(value.as_str().to_string())
        } else {
            let document_dir = document.parent().unwrap_or(Path::new(""));
            MapReference::MapFile(paths::resolve_from(document_dir, [value.as_str()]))
        };
        debug!(
            document = %document.display(),
            line = index,
            reference = ?reference,
            "found sourceMappingURL directive"
        );

        let fetched = FetchedMap {
            file: paths::normalize(document),
            reference,
        };
        let span = DirectiveSpan {
            line: index as u32,
            start_column: value.start() as u32,
            end_column: value.end() as u32,
        };
        return Ok((fetched, span));
    }

    Err(Error::FetchUrl)
}
