use super::CanonicalType;

/// Error type for value binding and cell decoding.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("Value '{text}' is not a valid {expected}: {reason}")]
    Malformed {
        expected: CanonicalType,
        text: String,
        reason: String,
    },

    #[error("Value is not valid base64: {reason}")]
    InvalidBase64 { reason: String },

    #[error("Cannot read {found} cell as {expected}")]
    UnreadableCell {
        expected: CanonicalType,
        found: &'static str,
    },

    #[error("Value {value} is out of range for {expected}")]
    OutOfRange {
        expected: CanonicalType,
        value: String,
    },

    #[error("Parameter position {position} out of range (statement has {slots} slots)")]
    PositionOutOfRange { position: usize, slots: usize },

    #[error("Parameter at position {position} was never bound")]
    Unbound { position: usize },
}
