//! Raw source column categories.
//!
//! Numeric codes follow `java.sql.Types` so catalogs that report JDBC type
//! codes map without translation. Declared type names (as found in SQLite
//! or `INFORMATION_SCHEMA`) are parsed by [`TypeDeclaration::parse`].

use serde::{Deserialize, Serialize};

/// Raw column type category reported by a datasource catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawType {
    Integer,
    TinyInt,
    SmallInt,
    BigInt,
    Double,
    Float,
    Real,
    Decimal,
    Numeric,
    Varchar,
    Char,
    LongVarchar,
    NVarchar,
    NChar,
    LongNVarchar,
    Clob,
    NClob,
    SqlXml,
    Boolean,
    Bit,
    Blob,
    Binary,
    VarBinary,
    LongVarBinary,
    Date,
    Time,
    Timestamp,
    /// Any category without a dedicated variant, keyed by its type code.
    Other(i32),
}

/// JDBC code for `OTHER`.
pub const OTHER_CODE: i32 = 1111;

impl RawType {
    /// Maps a `java.sql.Types` code to its category.
    pub fn from_code(code: i32) -> Self {
        match code {
            4 => RawType::Integer,
            -6 => RawType::TinyInt,
            5 => RawType::SmallInt,
            -5 => RawType::BigInt,
            8 => RawType::Double,
            6 => RawType::Float,
            7 => RawType::Real,
            3 => RawType::Decimal,
            2 => RawType::Numeric,
            12 => RawType::Varchar,
            1 => RawType::Char,
            -1 => RawType::LongVarchar,
            -9 => RawType::NVarchar,
            -15 => RawType::NChar,
            -16 => RawType::LongNVarchar,
            2005 => RawType::Clob,
            2011 => RawType::NClob,
            2009 => RawType::SqlXml,
            16 => RawType::Boolean,
            -7 => RawType::Bit,
            2004 => RawType::Blob,
            -2 => RawType::Binary,
            -3 => RawType::VarBinary,
            -4 => RawType::LongVarBinary,
            91 => RawType::Date,
            92 => RawType::Time,
            93 => RawType::Timestamp,
            other => RawType::Other(other),
        }
    }

    /// Returns the `java.sql.Types` code of this category.
    pub fn code(self) -> i32 {
        match self {
            RawType::Integer => 4,
            RawType::TinyInt => -6,
            RawType::SmallInt => 5,
            RawType::BigInt => -5,
            RawType::Double => 8,
            RawType::Float => 6,
            RawType::Real => 7,
            RawType::Decimal => 3,
            RawType::Numeric => 2,
            RawType::Varchar => 12,
            RawType::Char => 1,
            RawType::LongVarchar => -1,
            RawType::NVarchar => -9,
            RawType::NChar => -15,
            RawType::LongNVarchar => -16,
            RawType::Clob => 2005,
            RawType::NClob => 2011,
            RawType::SqlXml => 2009,
            RawType::Boolean => 16,
            RawType::Bit => -7,
            RawType::Blob => 2004,
            RawType::Binary => -2,
            RawType::VarBinary => -3,
            RawType::LongVarBinary => -4,
            RawType::Date => 91,
            RawType::Time => 92,
            RawType::Timestamp => 93,
            RawType::Other(code) => code,
        }
    }

    /// Maps a declared column type name to its category.
    ///
    /// Matching is case-insensitive and ignores any parenthesised
    /// arguments, so `varchar(20)` and `VARCHAR` are the same category.
    pub fn from_type_name(name: &str) -> Self {
        TypeDeclaration::parse(name).raw_type
    }

    /// Whether precision and scale are meaningful for this category.
    pub fn has_precision(self) -> bool {
        matches!(
            self,
            RawType::Double | RawType::Float | RawType::Real | RawType::Decimal | RawType::Numeric
        )
    }
}

/// A parsed column type declaration such as `DECIMAL(10,2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    /// Category of the base type name
    pub raw_type: RawType,
    /// First argument (length for character/binary types, precision otherwise)
    pub size: Option<u32>,
    /// Second argument, when present
    pub scale: Option<u32>,
}

impl TypeDeclaration {
    /// Parses a declared type. Never fails: unknown names map to `Other`.
    pub fn parse(declared: &str) -> Self {
        let (base, args) = match declared.find('(') {
            Some(open) => {
                let close = declared[open..]
                    .find(')')
                    .map(|i| open + i)
                    .unwrap_or(declared.len());
                (&declared[..open], &declared[open + 1..close])
            }
            None => (declared, ""),
        };

        let base = base
            .split_whitespace()
            .map(|part| part.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(" ");

        let mut numbers = args
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u32>().ok());

        let size = numbers.next().flatten();
        let scale = numbers.next().flatten();

        Self {
            raw_type: raw_type_for_name(&base),
            size,
            scale,
        }
    }
}

fn raw_type_for_name(base: &str) -> RawType {
    match base {
        "INT" | "INTEGER" | "INT4" | "MEDIUMINT" => RawType::Integer,
        "TINYINT" | "INT1" => RawType::TinyInt,
        "SMALLINT" | "INT2" => RawType::SmallInt,
        "BIGINT" | "INT8" | "UNSIGNED BIG INT" => RawType::BigInt,
        "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => RawType::Double,
        "FLOAT" | "FLOAT4" => RawType::Float,
        "REAL" => RawType::Real,
        "DECIMAL" | "DEC" => RawType::Decimal,
        "NUMERIC" | "NUMBER" => RawType::Numeric,
        "VARCHAR" | "CHARACTER VARYING" | "VARYING CHARACTER" | "TEXT" | "VARCHAR2" => {
            RawType::Varchar
        }
        "CHAR" | "CHARACTER" => RawType::Char,
        "LONGVARCHAR" | "LONG VARCHAR" | "MEDIUMTEXT" | "LONGTEXT" => RawType::LongVarchar,
        "NVARCHAR" | "NATIONAL VARCHAR" | "NATIONAL CHARACTER VARYING" | "NVARCHAR2" => {
            RawType::NVarchar
        }
        "NCHAR" | "NATIONAL CHAR" | "NATIONAL CHARACTER" | "NATIVE CHARACTER" => RawType::NChar,
        "LONGNVARCHAR" | "NTEXT" => RawType::LongNVarchar,
        "CLOB" => RawType::Clob,
        "NCLOB" => RawType::NClob,
        "XML" | "SQLXML" => RawType::SqlXml,
        "BOOLEAN" | "BOOL" => RawType::Boolean,
        "BIT" => RawType::Bit,
        "BLOB" | "LONGBLOB" | "MEDIUMBLOB" => RawType::Blob,
        "BINARY" => RawType::Binary,
        "VARBINARY" | "BINARY VARYING" => RawType::VarBinary,
        "LONGVARBINARY" | "LONG VARBINARY" => RawType::LongVarBinary,
        "DATE" => RawType::Date,
        "TIME" => RawType::Time,
        "TIMESTAMP" | "DATETIME" => RawType::Timestamp,
        _ => RawType::Other(OTHER_CODE),
    }
}
