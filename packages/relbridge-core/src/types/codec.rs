//! One codec per canonical type.
//!
//! `decode` turns a non-null native cell into canonical text and `encode`
//! parses canonical text into the native value to bind. Decoding accepts
//! every cell variant that can represent the type without loss, because
//! dynamically typed stores report storage classes rather than declared
//! column types.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{BindError, CanonicalType, SqlValue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const SHORT_TIME_FORMAT: &str = "%H:%M";
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Conversion between native cells and canonical text for one canonical type.
pub trait ValueCodec: Send + Sync {
    /// Canonical type handled by this codec.
    fn canonical(&self) -> CanonicalType;

    /// Renders a non-null cell as canonical text.
    fn decode(&self, cell: &SqlValue) -> Result<String, BindError>;

    /// Parses canonical text into the native value to bind.
    fn encode(&self, text: &str) -> Result<SqlValue, BindError>;
}

/// Returns the codec for a canonical type.
pub fn codec_for(canonical: CanonicalType) -> &'static dyn ValueCodec {
    match canonical {
        CanonicalType::Int16 => &Int16Codec,
        CanonicalType::Int32 => &Int32Codec,
        CanonicalType::Int64 => &Int64Codec,
        CanonicalType::Double => &DoubleCodec,
        CanonicalType::Single => &SingleCodec,
        CanonicalType::Decimal => &DecimalCodec,
        CanonicalType::Boolean => &BooleanCodec,
        CanonicalType::String => &StringCodec,
        CanonicalType::Binary => &BinaryCodec,
        CanonicalType::Date => &DateCodec,
        CanonicalType::TimeOfDay => &TimeOfDayCodec,
        CanonicalType::DateTimeOffset => &DateTimeOffsetCodec,
    }
}

struct Int16Codec;
struct Int32Codec;
struct Int64Codec;
struct DoubleCodec;
struct SingleCodec;
struct DecimalCodec;
struct BooleanCodec;
struct StringCodec;
struct BinaryCodec;
struct DateCodec;
struct TimeOfDayCodec;
struct DateTimeOffsetCodec;

impl ValueCodec for Int16Codec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::Int16
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        let value = integral_cell(CanonicalType::Int16, cell)?;
        i16::try_from(value)
            .map(|v| v.to_string())
            .map_err(|_| out_of_range(CanonicalType::Int16, value))
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        text.trim()
            .parse::<i16>()
            .map(SqlValue::SmallInt)
            .map_err(|e| malformed(CanonicalType::Int16, text, e))
    }
}

impl ValueCodec for Int32Codec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::Int32
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        let value = integral_cell(CanonicalType::Int32, cell)?;
        i32::try_from(value)
            .map(|v| v.to_string())
            .map_err(|_| out_of_range(CanonicalType::Int32, value))
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        text.trim()
            .parse::<i32>()
            .map(SqlValue::Int)
            .map_err(|e| malformed(CanonicalType::Int32, text, e))
    }
}

impl ValueCodec for Int64Codec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::Int64
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        integral_cell(CanonicalType::Int64, cell).map(|v| v.to_string())
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        text.trim()
            .parse::<i64>()
            .map(SqlValue::BigInt)
            .map_err(|e| malformed(CanonicalType::Int64, text, e))
    }
}

impl ValueCodec for DoubleCodec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::Double
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        float_cell(CanonicalType::Double, cell).map(|v| v.to_string())
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        text.trim()
            .parse::<f64>()
            .map(SqlValue::Double)
            .map_err(|e| malformed(CanonicalType::Double, text, e))
    }
}

impl ValueCodec for SingleCodec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::Single
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        match cell {
            SqlValue::Float(v) => Ok(v.to_string()),
            other => float_cell(CanonicalType::Single, other).map(|v| (v as f32).to_string()),
        }
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        text.trim()
            .parse::<f32>()
            .map(SqlValue::Float)
            .map_err(|e| malformed(CanonicalType::Single, text, e))
    }
}

impl ValueCodec for DecimalCodec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::Decimal
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        let value = match cell {
            SqlValue::Decimal(d) => *d,
            SqlValue::SmallInt(v) => Decimal::from(*v),
            SqlValue::Int(v) => Decimal::from(*v),
            SqlValue::BigInt(v) => Decimal::from(*v),
            SqlValue::Double(v) => parse_decimal(&v.to_string())?,
            SqlValue::Float(v) => parse_decimal(&v.to_string())?,
            SqlValue::Text(s) => parse_decimal(s.trim())?,
            SqlValue::Bytes(b) => match std::str::from_utf8(b) {
                Ok(text) => parse_decimal(text.trim())?,
                Err(_) => return Err(unreadable(CanonicalType::Decimal, cell)),
            },
            other => return Err(unreadable(CanonicalType::Decimal, other)),
        };
        Ok(value.to_string())
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        parse_decimal(text.trim()).map(SqlValue::Decimal)
    }
}

impl ValueCodec for BooleanCodec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::Boolean
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        let value = match cell {
            SqlValue::Bool(b) => *b,
            SqlValue::SmallInt(v) => *v != 0,
            SqlValue::Int(v) => *v != 0,
            SqlValue::BigInt(v) => *v != 0,
            SqlValue::Text(s) => {
                parse_bool(s).ok_or_else(|| malformed(CanonicalType::Boolean, s, "not a boolean"))?
            }
            other => return Err(unreadable(CanonicalType::Boolean, other)),
        };
        Ok(value.to_string())
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        parse_bool(text)
            .map(SqlValue::Bool)
            .ok_or_else(|| malformed(CanonicalType::Boolean, text, "expected true or false"))
    }
}

impl ValueCodec for StringCodec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::String
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        match cell {
            SqlValue::Text(s) => Ok(s.clone()),
            SqlValue::Bytes(b) => String::from_utf8(b.clone())
                .map_err(|_| unreadable(CanonicalType::String, cell)),
            SqlValue::Bool(b) => Ok(b.to_string()),
            SqlValue::SmallInt(v) => Ok(v.to_string()),
            SqlValue::Int(v) => Ok(v.to_string()),
            SqlValue::BigInt(v) => Ok(v.to_string()),
            SqlValue::Float(v) => Ok(v.to_string()),
            SqlValue::Double(v) => Ok(v.to_string()),
            SqlValue::Decimal(d) => Ok(d.to_string()),
            SqlValue::Date(d) => Ok(d.format(DATE_FORMAT).to_string()),
            SqlValue::Time(t) => Ok(t.format(TIME_FORMAT).to_string()),
            SqlValue::Timestamp(ts) => Ok(format_timestamp(ts)),
            SqlValue::Null => Err(unreadable(CanonicalType::String, cell)),
        }
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        Ok(SqlValue::Text(text.to_string()))
    }
}

impl ValueCodec for BinaryCodec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::Binary
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        match cell {
            SqlValue::Bytes(b) => Ok(STANDARD.encode(b)),
            SqlValue::Text(s) => Ok(STANDARD.encode(s.as_bytes())),
            other => Err(unreadable(CanonicalType::Binary, other)),
        }
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        STANDARD
            .decode(text)
            .map(SqlValue::Bytes)
            .map_err(|e| BindError::InvalidBase64 {
                reason: e.to_string(),
            })
    }
}

impl ValueCodec for DateCodec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::Date
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        let date = match cell {
            SqlValue::Date(d) => *d,
            SqlValue::Timestamp(ts) => ts.date_naive(),
            SqlValue::Text(s) => match parse_date(s) {
                Ok(d) => d,
                Err(_) => parse_timestamp(s)?.date_naive(),
            },
            other => return Err(unreadable(CanonicalType::Date, other)),
        };
        Ok(date.format(DATE_FORMAT).to_string())
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        parse_date(text).map(SqlValue::Date)
    }
}

impl ValueCodec for TimeOfDayCodec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::TimeOfDay
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        let time = match cell {
            SqlValue::Time(t) => *t,
            SqlValue::Timestamp(ts) => ts.time(),
            SqlValue::Text(s) => parse_time(s)?,
            other => return Err(unreadable(CanonicalType::TimeOfDay, other)),
        };
        Ok(time.format(TIME_FORMAT).to_string())
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        parse_time(text).map(SqlValue::Time)
    }
}

impl ValueCodec for DateTimeOffsetCodec {
    fn canonical(&self) -> CanonicalType {
        CanonicalType::DateTimeOffset
    }

    fn decode(&self, cell: &SqlValue) -> Result<String, BindError> {
        let timestamp = match cell {
            SqlValue::Timestamp(ts) => *ts,
            SqlValue::Date(d) => d.and_time(NaiveTime::MIN).and_utc().fixed_offset(),
            SqlValue::Text(s) => parse_timestamp(s)?,
            other => return Err(unreadable(CanonicalType::DateTimeOffset, other)),
        };
        Ok(format_timestamp(&timestamp))
    }

    fn encode(&self, text: &str) -> Result<SqlValue, BindError> {
        parse_timestamp(text).map(SqlValue::Timestamp)
    }
}

fn malformed(expected: CanonicalType, text: &str, reason: impl ToString) -> BindError {
    BindError::Malformed {
        expected,
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

fn unreadable(expected: CanonicalType, cell: &SqlValue) -> BindError {
    BindError::UnreadableCell {
        expected,
        found: cell.kind(),
    }
}

fn out_of_range(expected: CanonicalType, value: impl ToString) -> BindError {
    BindError::OutOfRange {
        expected,
        value: value.to_string(),
    }
}

/// Reads any exactly-integral cell as `i64`.
fn integral_cell(expected: CanonicalType, cell: &SqlValue) -> Result<i64, BindError> {
    match cell {
        SqlValue::SmallInt(v) => Ok(i64::from(*v)),
        SqlValue::Int(v) => Ok(i64::from(*v)),
        SqlValue::BigInt(v) => Ok(*v),
        SqlValue::Bool(b) => Ok(i64::from(*b)),
        SqlValue::Decimal(d) if d.fract().is_zero() => {
            d.to_i64().ok_or_else(|| out_of_range(expected, d))
        }
        SqlValue::Double(v)
            if v.is_finite()
                && v.fract() == 0.0
                && *v >= i64::MIN as f64
                && *v < i64::MAX as f64 =>
        {
            Ok(*v as i64)
        }
        SqlValue::Text(s) => s.trim().parse::<i64>().map_err(|e| malformed(expected, s, e)),
        other => Err(unreadable(expected, other)),
    }
}

fn float_cell(expected: CanonicalType, cell: &SqlValue) -> Result<f64, BindError> {
    match cell {
        SqlValue::Double(v) => Ok(*v),
        SqlValue::Float(v) => Ok(f64::from(*v)),
        SqlValue::SmallInt(v) => Ok(f64::from(*v)),
        SqlValue::Int(v) => Ok(f64::from(*v)),
        SqlValue::BigInt(v) => Ok(*v as f64),
        SqlValue::Decimal(d) => d.to_f64().ok_or_else(|| out_of_range(expected, d)),
        SqlValue::Text(s) => s.trim().parse::<f64>().map_err(|e| malformed(expected, s, e)),
        other => Err(unreadable(expected, other)),
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, BindError> {
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| malformed(CanonicalType::Decimal, text, e))
}

/// Pads decimal text with trailing zeros up to `scale` fractional digits.
pub(super) fn pad_decimal(text: &str, scale: u32) -> Result<String, BindError> {
    let mut value = parse_decimal(text.trim())?;
    if value.scale() < scale {
        value.rescale(scale);
    }
    Ok(value.to_string())
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, BindError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|e| malformed(CanonicalType::Date, text, e))
}

fn parse_time(text: &str) -> Result<NaiveTime, BindError> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, SHORT_TIME_FORMAT))
        .map_err(|e| malformed(CanonicalType::TimeOfDay, text, e))
}

/// Parses RFC 3339, falling back to offset-less forms read as UTC.
fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>, BindError> {
    let trimmed = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts);
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    Err(malformed(
        CanonicalType::DateTimeOffset,
        text,
        "expected an RFC 3339 timestamp",
    ))
}

fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
