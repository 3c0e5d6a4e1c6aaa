use std::fmt;

use serde::{Deserialize, Serialize};

use super::RawType;

/// Canonical value type exposed to the protocol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalType {
    Int16,
    Int32,
    Int64,
    Double,
    Single,
    Decimal,
    Boolean,
    String,
    Binary,
    Date,
    TimeOfDay,
    DateTimeOffset,
}

impl CanonicalType {
    /// Canonical type for a raw category. Unmapped categories are `String`.
    pub fn of(raw: RawType) -> Self {
        match raw {
            RawType::Integer => CanonicalType::Int32,
            RawType::TinyInt | RawType::SmallInt => CanonicalType::Int16,
            RawType::BigInt => CanonicalType::Int64,
            RawType::Double => CanonicalType::Double,
            RawType::Float | RawType::Real => CanonicalType::Single,
            RawType::Decimal | RawType::Numeric => CanonicalType::Decimal,
            RawType::Varchar
            | RawType::Char
            | RawType::LongVarchar
            | RawType::NVarchar
            | RawType::NChar
            | RawType::LongNVarchar
            | RawType::Clob
            | RawType::NClob
            | RawType::SqlXml => CanonicalType::String,
            RawType::Boolean | RawType::Bit => CanonicalType::Boolean,
            RawType::Blob | RawType::Binary | RawType::VarBinary | RawType::LongVarBinary => {
                CanonicalType::Binary
            }
            RawType::Date => CanonicalType::Date,
            RawType::Time => CanonicalType::TimeOfDay,
            RawType::Timestamp => CanonicalType::DateTimeOffset,
            RawType::Other(_) => CanonicalType::String,
        }
    }

    /// Type name as used in error messages and schema output.
    pub fn name(self) -> &'static str {
        match self {
            CanonicalType::Int16 => "Int16",
            CanonicalType::Int32 => "Int32",
            CanonicalType::Int64 => "Int64",
            CanonicalType::Double => "Double",
            CanonicalType::Single => "Single",
            CanonicalType::Decimal => "Decimal",
            CanonicalType::Boolean => "Boolean",
            CanonicalType::String => "String",
            CanonicalType::Binary => "Binary",
            CanonicalType::Date => "Date",
            CanonicalType::TimeOfDay => "TimeOfDay",
            CanonicalType::DateTimeOffset => "DateTimeOffset",
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
