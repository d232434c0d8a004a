//! Source-map parsing and bidirectional position translation.
//!
//! This crate decodes standard JSON source maps and answers position
//! queries in both directions: from a generated file back to the original
//! source, and from an original source forward to the generated file.
//!
//! # Overview
//!
//! The core types are:
//! - [`SourceMapItem`]: one parsed map with its resolved file paths and
//!   translation queries
//! - [`FilePosition`]: a cursor position tied to a file, with optional
//!   embedded source text
//! - [`RawSourceMap`]: the serde model of the JSON payload
//!
//! # Example
//!
//! ```rust
//! use std::path::Path;
//! use sourcenav_map::{FilePosition, SourceMapItem};
//!
//! let payload = br#"{
//!     "version": 3,
//!     "file": "app.js",
//!     "sources": ["app.ts"],
//!     "names": [],
//!     "mappings": "AAAA,IAAI;AACJ"
//! }"#;
//! let map = SourceMapItem::from_slice(payload, Path::new("/proj/dist/app.js.map"))?;
//! assert_eq!(map.generated_file(), Path::new("/proj/dist/app.js"));
//!
//! // A cursor on line 2, column 0 of the generated file maps back to app.ts.
//! let cursor = FilePosition::new("/proj/dist/app.js", 1, 0);
//! let original = map.original_position_for(&cursor)?;
//! assert_eq!(original.file(), Path::new("/proj/dist/app.ts"));
//! assert_eq!(original.line(), 1);
//! # Ok::<(), sourcenav_map::Error>(())
//! ```

pub mod decode;
pub mod error;
pub mod item;
pub mod paths;
pub mod position;
pub mod raw;
mod vlq;

// Re-export main types
pub use decode::{DecodedMappings, Origin, Segment};
pub use error::{CreateError, DataUriError, DecodeError, Error, Result};
pub use item::SourceMapItem;
pub use position::FilePosition;
pub use raw::RawSourceMap;
