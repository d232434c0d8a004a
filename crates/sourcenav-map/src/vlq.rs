//! Base64 VLQ decoding, the primitive under the `mappings` field.
//!
//! Each character carries five payload bits and a continuation bit; the
//! lowest bit of a completed value is its sign.

use crate::error::DecodeError;

const CONTINUATION_BIT: u32 = 1 << 5;
const PAYLOAD_MASK: u32 = CONTINUATION_BIT - 1;

// Shifts past this would push payload bits off the end of an i64.
const MAX_SHIFT: u32 = 60;

fn base64_value(byte: u8) -> Option<u32> {
    match byte {
        b'A'..=b'Z' => Some(u32::from(byte - b'A')),
        b'a'..=b'z' => Some(u32::from(byte - b'a') + 26),
        b'0'..=b'9' => Some(u32::from(byte - b'0') + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Decode every VLQ value in one mapping segment (the text between `,` and
/// `;` separators).
pub(crate) fn decode_segment(segment: &str) -> Result<Vec<i64>, DecodeError> {
    let mut values = Vec::with_capacity(5);
    let mut accum: i64 = 0;
    let mut shift: u32 = 0;
    let mut in_value = false;

    for byte in segment.bytes() {
        let digit =
            base64_value(byte).ok_or(DecodeError::InvalidBase64(char::from(byte)))?;
        if shift > MAX_SHIFT {
            return Err(DecodeError::Overflow);
        }
        accum |= i64::from(digit & PAYLOAD_MASK) << shift;
        in_value = true;

        if digit & CONTINUATION_BIT != 0 {
            shift += 5;
        } else {
            let negative = accum & 1 != 0;
            let magnitude = accum >> 1;
            values.push(if negative { -magnitude } else { magnitude });
            accum = 0;
            shift = 0;
            in_value = false;
        }
    }

    if in_value {
        return Err(DecodeError::Truncated);
    }
    Ok(values)
}
