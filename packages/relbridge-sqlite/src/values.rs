//! Conversion between bridge values and SQLite storage classes.
//!
//! SQLite stores INTEGER, REAL, TEXT and BLOB only. Temporal values are
//! written as their canonical text, which the type bridge reads back by
//! declared column type.
//!
//! Decimals are written as a BLOB holding their canonical text. Columns
//! declared `DECIMAL` or `NUMERIC` have numeric affinity, which would turn
//! decimal text into a REAL and lose digits beyond the fifteenth along with
//! the scale; affinity never converts a BLOB. Keys compared against decimal
//! columns only match rows written this way.
//!
//! A NaN REAL is stored by SQLite as NULL, so non-finite floats are written
//! as text and parsed back by the float codecs.

use chrono::SecondsFormat;
use relbridge_core::datasource::DataSourceError;
use relbridge_core::SqlValue;
use rusqlite::types::{Value, ValueRef};

pub fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::SmallInt(v) => Value::Integer(i64::from(*v)),
        SqlValue::Int(v) => Value::Integer(i64::from(*v)),
        SqlValue::BigInt(v) => Value::Integer(*v),
        SqlValue::Float(v) if !v.is_finite() => Value::Text(v.to_string()),
        SqlValue::Float(v) => Value::Real(f64::from(*v)),
        SqlValue::Double(v) if !v.is_finite() => Value::Text(v.to_string()),
        SqlValue::Double(v) => Value::Real(*v),
        SqlValue::Decimal(d) => Value::Blob(d.to_string().into_bytes()),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Bytes(b) => Value::Blob(b.clone()),
        SqlValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        SqlValue::Time(t) => Value::Text(t.format("%H:%M:%S%.f").to_string()),
        SqlValue::Timestamp(ts) => Value::Text(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    }
}

pub fn from_sqlite(value: ValueRef<'_>) -> Result<SqlValue, DataSourceError> {
    Ok(match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::BigInt(i),
        ValueRef::Real(f) => SqlValue::Double(f),
        ValueRef::Text(bytes) => SqlValue::Text(
            std::str::from_utf8(bytes)
                .map_err(|e| DataSourceError::with_source("text cell is not valid UTF-8", e))?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => SqlValue::Bytes(bytes.to_vec()),
    })
}
