//! Serde model of the standard source-map JSON payload.

use serde::{Deserialize, Serialize};

/// The raw source-map object, as parsed from JSON.
///
/// Only the fields needed for coordinate translation and inline content are
/// modeled; anything else in the payload is ignored rather than validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    pub version: u32,

    /// Name of the generated file, relative to the map's own location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Prefix prepended to every entry of `sources`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,

    /// Original files, in the order the `mappings` reference them.
    pub sources: Vec<String>,

    /// Embedded source text, parallel to `sources`; entries may be null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,

    #[serde(default)]
    pub names: Vec<String>,

    /// Base64-VLQ encoded position mappings.
    pub mappings: String,
}

impl RawSourceMap {
    /// Embedded content for the source at `index`, if the payload carries
    /// any.
    pub fn content_for(&self, index: usize) -> Option<&str> {
        self.sources_content.as_ref()?.get(index)?.as_deref()
    }
}
