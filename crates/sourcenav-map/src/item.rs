//! A single parsed source map and its position translations.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use tracing::debug;

use crate::decode::DecodedMappings;
use crate::error::{CreateError, DataUriError, Error, Result};
use crate::paths;
use crate::position::FilePosition;
use crate::raw::RawSourceMap;

/// One parsed source map, bound to the location it was read from.
///
/// All paths are resolved exactly once at construction and never
/// recomputed: each declared source against the map file's directory plus
/// the declared `sourceRoot`, and the generated file against the map file's
/// directory, falling back to the map file's own path when the payload
/// declares no `file`, as with maps embedded in the artifact itself.
///
/// Items are immutable; the store discards them wholesale on invalidation.
#[derive(Debug)]
pub struct SourceMapItem {
    map_path: PathBuf,
    generated_file: PathBuf,
    source_files: Vec<PathBuf>,
    raw: RawSourceMap,
    mappings: DecodedMappings,
}

impl SourceMapItem {
    /// Parse a raw JSON payload read from `map_path`.
    pub fn from_slice(payload: &[u8], map_path: &Path) -> Result<Self> {
        Self::parse(payload, map_path).map_err(Error::CreateMapObject)
    }

    /// Read and parse a map file.
    pub async fn from_file(map_path: &Path) -> Result<Self> {
        let payload = tokio::fs::read(map_path)
            .await
            .map_err(|source| Error::ReadMapFile {
                path: map_path.to_path_buf(),
                source,
            })?;
        Self::from_slice(&payload, map_path)
    }

    /// Decode a `data:` URI carrying a base64 map payload.
    ///
    /// The document's own path stands in for the map file's location, so a
    /// payload without a `file` field names the document itself as the
    /// generated file.
    pub fn from_data_url(url: &str, document_path: &Path) -> Result<Self> {
        let payload = decode_data_url(url).map_err(Error::ReadDataUri)?;
        Self::from_slice(&payload, document_path)
    }

    fn parse(payload: &[u8], map_path: &Path) -> std::result::Result<Self, CreateError> {
        let raw: RawSourceMap = serde_json::from_slice(payload)?;
        let mappings = DecodedMappings::decode(&raw.mappings, raw.sources.len())?;

        let map_dir = map_path.parent().unwrap_or(Path::new(""));
        let source_root = raw.source_root.clone().unwrap_or_default();
        let source_files: Vec<PathBuf> = raw
            .sources
            .iter()
            .map(|source| paths::resolve_from(map_dir, [source_root.as_str(), source.as_str()]))
            .collect();
        let generated_file = match raw.file.as_deref() {
            Some(file) => paths::resolve_from(map_dir, [file]),
            None => paths::normalize(map_path),
        };

        debug!(
            map = %map_path.display(),
            generated = %generated_file.display(),
            sources = source_files.len(),
            segments = mappings.len(),
            "parsed source map"
        );

        Ok(Self {
            map_path: paths::normalize(map_path),
            generated_file,
            source_files,
            raw,
            mappings,
        })
    }

    /// The map file's own path (equals the document path for data-URI maps).
    pub fn map_path(&self) -> &Path {
        &self.map_path
    }

    /// The generated file this map describes.
    pub fn generated_file(&self) -> &Path {
        &self.generated_file
    }

    /// Resolved original files, in the map's declared order.
    pub fn source_files(&self) -> &[PathBuf] {
        &self.source_files
    }

    /// Whether `path` is this map's generated file. This is the mapping
    /// direction decision point: a generated-side document translates
    /// generated→original, anything else original→generated.
    pub fn is_generated_file(&self, path: &Path) -> bool {
        paths::normalize(path) == self.generated_file
    }

    /// Embedded text for the given original file, when the payload carries
    /// it.
    pub fn embedded_content(&self, source: &Path) -> Option<&str> {
        let index = self.source_index_of(source)?;
        self.raw.content_for(index)
    }

    fn source_index_of(&self, file: &Path) -> Option<usize> {
        let normalized = paths::normalize(file);
        self.source_files
            .iter()
            .position(|source| *source == normalized)
    }

    /// Translate a position in one of this map's original files to the
    /// corresponding generated-file position.
    ///
    /// Fails when `position.file` is not among the declared sources or the
    /// decoder has no segment covering the position; no best-effort result
    /// is returned.
    pub fn generated_position_for(&self, position: &FilePosition) -> Result<FilePosition> {
        let miss = || Error::GeneratedPosition(position.file().to_path_buf());

        let source = self.source_index_of(position.file()).ok_or_else(miss)?;
        let segment = self
            .mappings
            .generated_for(source as u32, position.decoder_line(), position.column())
            .ok_or_else(miss)?;

        Ok(FilePosition::from_decoded(
            None,
            &self.generated_file,
            segment.generated_line,
            segment.generated_column,
        ))
    }

    /// Translate a generated-file position to the corresponding original
    /// position, attaching embedded source text when the payload carries it.
    ///
    /// Fails when the decoder has no segment covering the position or the
    /// covering segment maps to no original location.
    pub fn original_position_for(&self, position: &FilePosition) -> Result<FilePosition> {
        let miss = || Error::OriginalPosition(position.file().to_path_buf());

        let segment = self
            .mappings
            .original_for(position.decoder_line(), position.column())
            .ok_or_else(miss)?;
        let origin = segment.origin.ok_or_else(miss)?;

        let source_file = self
            .source_files
            .get(origin.source as usize)
            .ok_or_else(miss)?;
        let resolved = FilePosition::from_decoded(
            Some(source_file),
            position.file(),
            origin.line,
            origin.column,
        );

        Ok(match self.raw.content_for(origin.source as usize) {
            Some(contents) => resolved.with_contents(contents),
            None => resolved,
        })
    }
}

fn decode_data_url(url: &str) -> std::result::Result<Vec<u8>, DataUriError> {
    let payload = url
        .split_once(',')
        .map(|(_, payload)| payload)
        .filter(|payload| !payload.is_empty())
        .ok_or(DataUriError::MissingPayload)?;
    Ok(BASE64_STANDARD.decode(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Three segments over one source:
    //   generated 1:0 <-> a.ts 1:0
    //   generated 1:4 <-> a.ts 1:4
    //   generated 2:0 <-> a.ts 2:0
    const MAP_JSON: &str = r#"{
        "version": 3,
        "file": "app.js",
        "sourceRoot": "../src",
        "sources": ["a.ts"],
        "names": [],
        "mappings": "AAAA,IAAI;AACJ"
    }"#;

    fn item() -> SourceMapItem {
        SourceMapItem::from_slice(MAP_JSON.as_bytes(), Path::new("/proj/dist/app.js.map"))
            .unwrap()
    }

    #[test]
    fn resolves_sources_through_source_root() {
        let item = item();
        assert_eq!(item.source_files(), [PathBuf::from("/proj/src/a.ts")]);
        assert_eq!(item.generated_file(), Path::new("/proj/dist/app.js"));
    }

    #[test]
    fn generated_file_defaults_to_map_path() {
        let item = SourceMapItem::from_slice(
            br#"{"version":3,"sources":["a.ts"],"mappings":"AAAA"}"#,
            Path::new("/proj/dist/app.js"),
        )
        .unwrap();
        assert_eq!(item.generated_file(), Path::new("/proj/dist/app.js"));
        assert!(item.is_generated_file(Path::new("/proj/dist/app.js")));
        assert!(!item.is_generated_file(Path::new("/proj/dist/other.js")));
    }

    #[test]
    fn original_position_for_generated_cursor() {
        let item = item();

        // Editor cursor on generated line 2 (0-based line 1), column 0.
        let cursor = FilePosition::new("/proj/dist/app.js", 1, 0);
        let original = item.original_position_for(&cursor).unwrap();
        assert_eq!(original.file(), Path::new("/proj/src/a.ts"));
        assert_eq!(original.line(), 1);
        assert_eq!(original.column(), 0);
        assert!(original.contents().is_none());
    }

    #[test]
    fn generated_position_for_original_cursor() {
        let item = item();

        let cursor = FilePosition::new("/proj/src/a.ts", 0, 4);
        let generated = item.generated_position_for(&cursor).unwrap();
        assert_eq!(generated.file(), Path::new("/proj/dist/app.js"));
        assert_eq!(generated.line(), 0);
        assert_eq!(generated.column(), 4);
    }

    #[test]
    fn round_trips_every_segment() {
        let item = item();

        for (line, column) in [(0u32, 0u32), (0, 4), (1, 0)] {
            let generated = FilePosition::new("/proj/dist/app.js", line, column);
            let original = item.original_position_for(&generated).unwrap();
            let back = item.generated_position_for(&original).unwrap();
            assert_eq!(back.file(), generated.file());
            assert_eq!(back.line(), generated.line());
            assert_eq!(back.column(), generated.column());
        }
    }

    #[test]
    fn unknown_source_is_a_hard_error() {
        let item = item();

        let cursor = FilePosition::new("/proj/src/unknown.ts", 0, 0);
        let err = item.generated_position_for(&cursor).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to get generated position for original file: /proj/src/unknown.ts"
        );
    }

    #[test]
    fn unmapped_generated_line_is_a_hard_error() {
        let item = item();

        let cursor = FilePosition::new("/proj/dist/app.js", 40, 0);
        let err = item.original_position_for(&cursor).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to get original position for generated file: /proj/dist/app.js"
        );
    }

    #[test]
    fn attaches_embedded_contents() {
        let json = r#"{
            "version": 3,
            "file": "app.js",
            "sources": ["a.ts"],
            "sourcesContent": ["const answer = 42;\n"],
            "mappings": "AAAA"
        }"#;
        let item =
            SourceMapItem::from_slice(json.as_bytes(), Path::new("/proj/dist/app.js.map"))
                .unwrap();

        let cursor = FilePosition::new("/proj/dist/app.js", 0, 0);
        let original = item.original_position_for(&cursor).unwrap();
        assert_eq!(original.contents(), Some("const answer = 42;\n"));

        assert_eq!(
            item.embedded_content(Path::new("/proj/dist/a.ts")),
            Some("const answer = 42;\n")
        );
        assert!(item.embedded_content(Path::new("/proj/dist/b.ts")).is_none());
    }

    #[test]
    fn invalid_json_is_a_construction_error() {
        let err = SourceMapItem::from_slice(b"not a map", Path::new("/p/app.js.map"))
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to create source map object");
    }

    #[test]
    fn data_url_round_trip() {
        let encoded = BASE64_STANDARD.encode(MAP_JSON);
        let url = format!("data:application/json;base64,{encoded}");

        let item =
            SourceMapItem::from_data_url(&url, Path::new("/proj/dist/app.js")).unwrap();
        assert_eq!(item.generated_file(), Path::new("/proj/dist/app.js"));
        assert_eq!(item.source_files(), [PathBuf::from("/proj/src/a.ts")]);
    }

    #[test]
    fn data_url_without_payload_fails() {
        let err = SourceMapItem::from_data_url("data:application/json;base64,", Path::new("/p"))
            .unwrap_err();
        assert_eq!(err.to_string(), "can't read source map from data URI");

        let err =
            SourceMapItem::from_data_url("data:application/json", Path::new("/p")).unwrap_err();
        assert_eq!(err.to_string(), "can't read source map from data URI");
    }

    #[test]
    fn data_url_with_bad_base64_fails() {
        let err = SourceMapItem::from_data_url(
            "data:application/json;base64,@@not-base64@@",
            Path::new("/p"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ReadDataUri(_)));
    }

    #[tokio::test]
    async fn from_file_reads_and_resolves_relative_to_map() {
        let dir = tempfile::TempDir::new().unwrap();
        let map_path = dir.path().join("app.js.map");
        tokio::fs::write(&map_path, MAP_JSON).await.unwrap();

        let item = SourceMapItem::from_file(&map_path).await.unwrap();
        assert_eq!(item.generated_file(), dir.path().join("app.js"));
        // sourceRoot "../src" resolves lexically against the map directory.
        let parent = dir.path().parent().unwrap();
        assert_eq!(item.source_files(), [parent.join("src").join("a.ts")]);
    }

    #[tokio::test]
    async fn from_file_missing_is_a_read_error() {
        let err = SourceMapItem::from_file(Path::new("/nonexistent/app.js.map"))
            .await
            .unwrap_err();
        assert!(
            err.to_string()
                .starts_with("can't read source map from map file")
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
