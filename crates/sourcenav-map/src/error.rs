//! Error types for sourcenav-map

use std::path::PathBuf;

/// Failures at the boundaries of map construction and position translation.
///
/// Each variant carries a single descriptive message; the underlying cause
/// (I/O, JSON, base64, mappings decoding) is preserved as a `source` for
/// diagnostics rather than folded into the message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create source map object")]
    CreateMapObject(#[source] CreateError),

    #[error("can't read source map from map file: {path}")]
    ReadMapFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't read source map from data URI")]
    ReadDataUri(#[source] DataUriError),

    #[error("failed to get generated position for original file: {0}")]
    GeneratedPosition(PathBuf),

    #[error("failed to get original position for generated file: {0}")]
    OriginalPosition(PathBuf),
}

/// Why a raw payload could not be turned into a map.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Mappings(#[from] DecodeError),
}

/// Why a `data:` URI could not be read.
#[derive(Debug, thiserror::Error)]
pub enum DataUriError {
    #[error("no payload after the comma separator")]
    MissingPayload,

    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Why a `mappings` string could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64 character {0:?} in mappings")]
    InvalidBase64(char),

    #[error("truncated VLQ value in mappings")]
    Truncated,

    #[error("VLQ value out of range")]
    Overflow,

    #[error("mapping segment has {0} fields, expected 1, 4, or 5")]
    FieldCount(usize),

    #[error("mapping field underflowed below zero")]
    Underflow,

    #[error("source index {index} out of range for {count} declared sources")]
    SourceIndex { index: i64, count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
