//! Entry points of the type bridge.

use crate::datasource::PreparedStatement;

use super::codec::pad_decimal;
use super::{codec_for, BindError, CanonicalType, RawType, SqlValue};

/// Canonical type of a raw category. Total: unknown categories are `String`.
pub fn classify(raw: RawType) -> CanonicalType {
    CanonicalType::of(raw)
}

/// Decodes a cell into canonical text.
///
/// Returns `Ok(None)` only for a SQL NULL cell. Nullness is taken from the
/// cell variant itself, never inferred from the decoded value.
pub fn decode(raw: RawType, cell: &SqlValue) -> Result<Option<String>, BindError> {
    if cell.is_null() {
        return Ok(None);
    }
    codec_for(classify(raw)).decode(cell).map(Some)
}

/// Decodes a cell of a column declared with `scale` fractional digits.
///
/// Decimal values shorter than the declared scale are padded with trailing
/// zeros, so stores that drop them still yield the declared form. Digits
/// are never removed.
pub fn decode_column(
    raw: RawType,
    scale: Option<u32>,
    cell: &SqlValue,
) -> Result<Option<String>, BindError> {
    match decode(raw, cell)? {
        Some(text) => align_scale(raw, scale, &text).map(Some),
        None => Ok(None),
    }
}

/// Canonical text of `text` as a column with `scale` stores it.
///
/// Only decimal columns change; other types pass through untouched.
pub fn align_scale(raw: RawType, scale: Option<u32>, text: &str) -> Result<String, BindError> {
    match (classify(raw), scale) {
        (CanonicalType::Decimal, Some(scale)) => pad_decimal(text, scale),
        _ => Ok(text.to_string()),
    }
}

/// Binds canonical text into the 1-based parameter `position`.
///
/// `None` binds a NULL typed with `raw`, never the literal text "null".
pub fn encode(
    raw: RawType,
    text: Option<&str>,
    position: usize,
    statement: &mut PreparedStatement,
) -> Result<(), BindError> {
    match text {
        None => statement.bind_null(position, raw),
        Some(text) => {
            let value = codec_for(classify(raw)).encode(text)?;
            statement.bind(position, raw, value)
        }
    }
}
