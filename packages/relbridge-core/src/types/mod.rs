//! Raw column categories, canonical types and the text value bridge.

mod bridge;
mod canonical;
mod codec;
mod error;
mod raw_type;
mod value;

pub use bridge::{align_scale, classify, decode, decode_column, encode};
pub use canonical::CanonicalType;
pub use codec::{codec_for, ValueCodec};
pub use error::BindError;
pub use raw_type::{RawType, TypeDeclaration, OTHER_CODE};
pub use value::SqlValue;

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
