//! Decoding of the `mappings` field into queryable position indexes.
//!
//! Queries use the map format's native coordinates: 1-based lines, 0-based
//! columns. Within a generated line a query resolves to the nearest segment
//! at or before the queried column; a line with no usable segment is a miss,
//! reported as `None` and turned into a hard error by the caller.

use crate::error::DecodeError;
use crate::vlq;

/// The original-side half of a mapping segment, in decoder coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    /// Index into the map's declared `sources`.
    pub source: u32,
    /// 1-based line in the original file.
    pub line: u32,
    /// 0-based column in the original file.
    pub column: u32,
    /// Index into the map's declared `names`, when present.
    pub name: Option<u32>,
}

/// One decoded mapping segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// 1-based line in the generated file.
    pub generated_line: u32,
    /// 0-based column in the generated file.
    pub generated_column: u32,
    /// Absent for segments that map generated text to no original location.
    pub origin: Option<Origin>,
}

/// The decoded `mappings` string: a forward index by generated line and a
/// reverse index ordered by original position.
#[derive(Debug, Clone, Default)]
pub struct DecodedMappings {
    /// Segments per generated line, ordered by generated column.
    /// `lines[0]` holds generated line 1.
    lines: Vec<Vec<Segment>>,
    /// Segments with an origin, ordered by (source, line, column).
    by_source: Vec<Segment>,
}

impl DecodedMappings {
    /// Decode a `mappings` string. `source_count` bounds the source indexes
    /// the segments may reference.
    pub fn decode(mappings: &str, source_count: usize) -> Result<Self, DecodeError> {
        let mut lines: Vec<Vec<Segment>> = Vec::new();

        // Generated columns reset per line; the other fields accumulate
        // across the entire mappings string.
        let mut source: i64 = 0;
        let mut original_line: i64 = 0;
        let mut original_column: i64 = 0;
        let mut name: i64 = 0;

        for (line_index, line) in mappings.split(';').enumerate() {
            let mut segments: Vec<Segment> = Vec::new();
            let mut generated_column: i64 = 0;

            for raw_segment in line.split(',') {
                if raw_segment.is_empty() {
                    continue;
                }
                let fields = vlq::decode_segment(raw_segment)?;
                if !matches!(fields.len(), 1 | 4 | 5) {
                    return Err(DecodeError::FieldCount(fields.len()));
                }

                generated_column += fields[0];
                if generated_column < 0 {
                    return Err(DecodeError::Underflow);
                }

                let origin = if fields.len() >= 4 {
                    source += fields[1];
                    original_line += fields[2];
                    original_column += fields[3];
                    if source < 0 || original_line < 0 || original_column < 0 {
                        return Err(DecodeError::Underflow);
                    }
                    if source as usize >= source_count {
                        return Err(DecodeError::SourceIndex {
                            index: source,
                            count: source_count,
                        });
                    }
                    let name_index = if fields.len() == 5 {
                        name += fields[4];
                        if name < 0 {
                            return Err(DecodeError::Underflow);
                        }
                        Some(name as u32)
                    } else {
                        None
                    };
                    Some(Origin {
                        source: source as u32,
                        line: original_line as u32 + 1,
                        column: original_column as u32,
                        name: name_index,
                    })
                } else {
                    None
                };

                segments.push(Segment {
                    generated_line: line_index as u32 + 1,
                    generated_column: generated_column as u32,
                    origin,
                });
            }

            segments.sort_by_key(|segment| segment.generated_column);
            lines.push(segments);
        }

        let mut by_source: Vec<Segment> = lines
            .iter()
            .flatten()
            .filter(|segment| segment.origin.is_some())
            .copied()
            .collect();
        by_source.sort_by_key(|segment| {
            segment
                .origin
                .map(|origin| (origin.source, origin.line, origin.column))
                .unwrap_or_default()
        });

        Ok(Self { lines, by_source })
    }

    /// The segment covering a generated position: the nearest segment at or
    /// before `column` on the 1-based generated `line`.
    pub fn original_for(&self, line: u32, column: u32) -> Option<&Segment> {
        let segments = self.lines.get(line.checked_sub(1)? as usize)?;
        let index = segments.partition_point(|segment| segment.generated_column <= column);
        segments.get(index.checked_sub(1)?)
    }

    /// The segment covering an original position: the nearest segment at or
    /// before `column` on the 1-based `line` of source `source`.
    pub fn generated_for(&self, source: u32, line: u32, column: u32) -> Option<&Segment> {
        let index = self.by_source.partition_point(|segment| match segment.origin {
            Some(origin) => (origin.source, origin.line, origin.column) <= (source, line, column),
            None => true,
        });
        let candidate = self.by_source.get(index.checked_sub(1)?)?;
        let origin = candidate.origin?;
        (origin.source == source && origin.line == line).then_some(candidate)
    }

    /// All decoded segments, in generated order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.lines.iter().flatten()
    }

    /// Number of decoded segments.
    pub fn len(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Vec::is_empty)
    }
}
