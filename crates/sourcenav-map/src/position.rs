//! Cursor positions tied to a file on either side of a source map.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A cursor position in a file.
///
/// Lines and columns are 0-based, matching editor coordinates. The decoder
/// side of this crate speaks 1-based lines and 0-based columns (the map
/// format's native convention), and the +1/-1 adjustment lives entirely in
/// [`FilePosition::decoder_line`] and [`FilePosition::from_decoded`] so it
/// cannot drift between call sites.
///
/// Positions are immutable: translation produces a new instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePosition {
    file: PathBuf,
    line: u32,
    column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contents: Option<String>,
}

impl FilePosition {
    /// Create a position from editor coordinates (0-based line and column).
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            contents: None,
        }
    }

    /// Build a position from a decoder result.
    ///
    /// `source` is the resolved original file when the decoder yielded one;
    /// at map edges the decoder yields no source and the position falls back
    /// to `fallback`. `decoder_line` is 1-based.
    pub fn from_decoded(
        source: Option<&Path>,
        fallback: &Path,
        decoder_line: u32,
        column: u32,
    ) -> Self {
        Self {
            file: source.unwrap_or(fallback).to_path_buf(),
            line: decoder_line.saturating_sub(1),
            column,
            contents: None,
        }
    }

    /// Attach embedded source text, for destinations that exist only inside
    /// the map payload.
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// 0-based line.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 0-based column.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// 1-based line, as the decoder expects in queries.
    pub fn decoder_line(&self) -> u32 {
        self.line + 1
    }

    /// Embedded source text, present only when the file need not exist on
    /// disk.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}
