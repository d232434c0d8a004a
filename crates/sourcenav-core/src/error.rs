//! Error types for sourcenav-core

use std::path::PathBuf;

/// Failures surfaced by the navigation engine.
///
/// Map construction and translation failures pass through transparently
/// from `sourcenav-map`; the variants here cover the fetch and destination
/// stages plus host-side I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("can't fetch url from current document")]
    FetchUrl,

    #[error("no active document")]
    NoActiveDocument,

    #[error("can't open destination file: {0}")]
    Destination(PathBuf),

    #[error(transparent)]
    Map(#[from] sourcenav_map::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_message_is_stable() {
        assert_eq!(
            Error::FetchUrl.to_string(),
            "can't fetch url from current document"
        );
    }

    #[test]
    fn map_errors_pass_through_transparently() {
        let map_err = sourcenav_map::Error::OriginalPosition(PathBuf::from("/dist/app.js"));
        let err = Error::from(map_err);
        assert_eq!(
            err.to_string(),
            "failed to get original position for generated file: /dist/app.js"
        );
    }
}
