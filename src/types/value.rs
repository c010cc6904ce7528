use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{
    MAX_TEXT_LENGTH, TEXT_TYPE_CODE_BASE,
    error::{DatabaseError, Result},
};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Declared column type, as named in a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Real,
    Double,
    DateTime,
    Date,
    Text,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::TinyInt => "tinyint",
            DataType::SmallInt => "smallint",
            DataType::Int => "int",
            DataType::BigInt => "bigint",
            DataType::Real => "real",
            DataType::Double => "double",
            DataType::DateTime => "datetime",
            DataType::Date => "date",
            DataType::Text => "text",
        }
    }
}

impl FromStr for DataType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tinyint" => Ok(DataType::TinyInt),
            "smallint" => Ok(DataType::SmallInt),
            "int" => Ok(DataType::Int),
            "bigint" => Ok(DataType::BigInt),
            "real" => Ok(DataType::Real),
            "double" => Ok(DataType::Double),
            "datetime" => Ok(DataType::DateTime),
            "date" => Ok(DataType::Date),
            "text" => Ok(DataType::Text),
            _ => Err(DatabaseError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-byte on-disk description of a column value: width, null-ness and,
/// for text, the byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeCode(u8);

impl TypeCode {
    pub const TINYINT_NULL: TypeCode = TypeCode(0x00);
    pub const SMALLINT_NULL: TypeCode = TypeCode(0x01);
    pub const INT_NULL: TypeCode = TypeCode(0x02);
    pub const BIGINT_NULL: TypeCode = TypeCode(0x03);
    pub const TINYINT: TypeCode = TypeCode(0x04);
    pub const SMALLINT: TypeCode = TypeCode(0x05);
    pub const INT: TypeCode = TypeCode(0x06);
    pub const BIGINT: TypeCode = TypeCode(0x07);
    pub const REAL: TypeCode = TypeCode(0x08);
    pub const DOUBLE: TypeCode = TypeCode(0x09);
    pub const DATETIME: TypeCode = TypeCode(0x0A);
    pub const DATE: TypeCode = TypeCode(0x0B);

    pub fn from_u8(value: u8) -> Self {
        TypeCode(value)
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn text(length: usize) -> Result<Self> {
        if length > MAX_TEXT_LENGTH {
            return Err(DatabaseError::TextTooLong {
                length,
                max: MAX_TEXT_LENGTH,
            });
        }
        Ok(TypeCode(TEXT_TYPE_CODE_BASE + length as u8))
    }

    /// Code for a value of `data_type`. NULL collapses onto the by-width
    /// null codes; text carries its byte length.
    pub fn for_column(data_type: DataType, is_null: bool, value_length: usize) -> Result<Self> {
        let code = match (data_type, is_null) {
            (DataType::TinyInt, true) => Self::TINYINT_NULL,
            (DataType::TinyInt, false) => Self::TINYINT,
            (DataType::SmallInt, true) => Self::SMALLINT_NULL,
            (DataType::SmallInt, false) => Self::SMALLINT,
            (DataType::Int | DataType::Real, true) => Self::INT_NULL,
            (DataType::Int, false) => Self::INT,
            (DataType::Real, false) => Self::REAL,
            (DataType::BigInt | DataType::Double | DataType::DateTime | DataType::Date, true) => {
                Self::BIGINT_NULL
            }
            (DataType::BigInt, false) => Self::BIGINT,
            (DataType::Double, false) => Self::DOUBLE,
            (DataType::DateTime, false) => Self::DATETIME,
            (DataType::Date, false) => Self::DATE,
            (DataType::Text, true) => return Self::text(0),
            (DataType::Text, false) => return Self::text(value_length),
        };
        Ok(code)
    }

    /// Number of value bytes that follow for this code.
    pub fn size(&self) -> usize {
        match self.0 {
            0x00 | 0x04 => 1,
            0x01 | 0x05 => 2,
            0x02 | 0x06 | 0x08 => 4,
            0x03 | 0x07 | 0x09 | 0x0A | 0x0B => 8,
            code => (code - TEXT_TYPE_CODE_BASE) as usize,
        }
    }

    pub fn is_null(&self) -> bool {
        self.0 <= 0x03
    }

    pub fn is_text(&self) -> bool {
        self.0 >= TEXT_TYPE_CODE_BASE
    }

    /// Whether a cell written for a column of `data_type` may carry this code.
    pub fn is_valid_for(&self, data_type: DataType) -> bool {
        if data_type == DataType::Text {
            return self.is_text();
        }
        matches!(
            (Self::for_column(data_type, true, 0), Self::for_column(data_type, false, 0)),
            (Ok(null), Ok(non_null)) if *self == null || *self == non_null
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    /// Seconds since the Unix epoch.
    DateTime(i64),
    /// Seconds since the Unix epoch, rendered without a time of day.
    Date(i64),
    Text(String),
}

impl Value {
    /// Parse a textual literal into a value of `data_type`. The literal
    /// `null` (any case) yields [`Value::Null`].
    pub fn parse(literal: &str, data_type: DataType) -> Result<Self> {
        let trimmed = literal.trim();
        if trimmed.eq_ignore_ascii_case("null") {
            return Ok(Value::Null);
        }

        let invalid = || DatabaseError::InvalidValue {
            value: literal.to_string(),
            data_type: data_type.to_string(),
        };
        let scalar = unquote(trimmed);

        let value = match data_type {
            DataType::TinyInt => Value::TinyInt(scalar.parse().map_err(|_| invalid())?),
            DataType::SmallInt => Value::SmallInt(scalar.parse().map_err(|_| invalid())?),
            DataType::Int => Value::Int(scalar.parse().map_err(|_| invalid())?),
            DataType::BigInt => Value::BigInt(scalar.parse().map_err(|_| invalid())?),
            // Only finite values are storable; overflowing literals parse to infinity.
            DataType::Real => Value::Real(
                scalar
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(invalid)?,
            ),
            DataType::Double => Value::Double(
                scalar
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(invalid)?,
            ),
            DataType::DateTime => Value::DateTime(parse_datetime(scalar).ok_or_else(invalid)?),
            DataType::Date => Value::Date(parse_date(scalar).ok_or_else(invalid)?),
            DataType::Text => {
                let text = unquote(literal);
                if text.len() > MAX_TEXT_LENGTH {
                    return Err(DatabaseError::TextTooLong {
                        length: text.len(),
                        max: MAX_TEXT_LENGTH,
                    });
                }
                Value::Text(text.to_string())
            }
        };
        Ok(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type code this value is written with in a column of `data_type`.
    pub fn type_code(&self, data_type: DataType) -> Result<TypeCode> {
        let matches_type = matches!(
            (self, data_type),
            (Value::Null, _)
                | (Value::TinyInt(_), DataType::TinyInt)
                | (Value::SmallInt(_), DataType::SmallInt)
                | (Value::Int(_), DataType::Int)
                | (Value::BigInt(_), DataType::BigInt)
                | (Value::Real(_), DataType::Real)
                | (Value::Double(_), DataType::Double)
                | (Value::DateTime(_), DataType::DateTime)
                | (Value::Date(_), DataType::Date)
                | (Value::Text(_), DataType::Text)
        );
        if !matches_type {
            return Err(DatabaseError::InvalidValue {
                value: self.to_string(),
                data_type: data_type.to_string(),
            });
        }

        let length = match self {
            Value::Text(text) => text.len(),
            _ => 0,
        };
        TypeCode::for_column(data_type, self.is_null(), length)
    }

    /// Append exactly `code.size()` bytes for this value.
    pub fn encode(&self, code: TypeCode, buffer: &mut Vec<u8>) {
        match self {
            Value::Null => buffer.resize(buffer.len() + code.size(), 0),
            Value::TinyInt(v) => buffer.extend_from_slice(&v.to_be_bytes()),
            Value::SmallInt(v) => buffer.extend_from_slice(&v.to_be_bytes()),
            Value::Int(v) => buffer.extend_from_slice(&v.to_be_bytes()),
            Value::BigInt(v) | Value::DateTime(v) | Value::Date(v) => {
                buffer.extend_from_slice(&v.to_be_bytes())
            }
            Value::Real(v) => buffer.extend_from_slice(&v.to_be_bytes()),
            Value::Double(v) => buffer.extend_from_slice(&v.to_be_bytes()),
            Value::Text(text) => buffer.extend_from_slice(text.as_bytes()),
        }
    }

    /// Decode the value for `code` from the front of `bytes`.
    pub fn decode(code: TypeCode, bytes: &[u8]) -> Result<Self> {
        let size = code.size();
        if bytes.len() < size {
            return Err(DatabaseError::SerializationError {
                details: format!(
                    "type code 0x{:02X} needs {} bytes, got {}",
                    code.as_u8(),
                    size,
                    bytes.len()
                ),
            });
        }
        let bytes = &bytes[..size];

        let value = match code {
            c if c.is_null() => Value::Null,
            TypeCode::TINYINT => Value::TinyInt(i8::from_be_bytes([bytes[0]])),
            TypeCode::SMALLINT => Value::SmallInt(i16::from_be_bytes([bytes[0], bytes[1]])),
            TypeCode::INT => Value::Int(i32::from_be_bytes(fixed(bytes))),
            TypeCode::BIGINT => Value::BigInt(i64::from_be_bytes(fixed(bytes))),
            TypeCode::REAL => Value::Real(f32::from_be_bytes(fixed(bytes))),
            TypeCode::DOUBLE => Value::Double(f64::from_be_bytes(fixed(bytes))),
            TypeCode::DATETIME => Value::DateTime(i64::from_be_bytes(fixed(bytes))),
            TypeCode::DATE => Value::Date(i64::from_be_bytes(fixed(bytes))),
            _ => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::TinyInt(v) => write!(f, "{}", v),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::DateTime(secs) => match DateTime::from_timestamp(*secs, 0) {
                Some(at) => write!(f, "{}", at.format(DATETIME_FORMAT)),
                None => write!(f, "{}", secs),
            },
            Value::Date(secs) => match DateTime::from_timestamp(*secs, 0) {
                Some(at) => write!(f, "{}", at.format(DATE_FORMAT)),
                None => write!(f, "{}", secs),
            },
            Value::Text(text) => f.write_str(text),
        }
    }
}

/// Strip one pair of matching surrounding quotes, if present.
pub fn unquote(literal: &str) -> &str {
    let bytes = literal.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &literal[1..literal.len() - 1];
        }
    }
    literal
}

/// `yyyy-MM-dd HH:mm:ss` or raw epoch seconds.
pub fn parse_datetime(literal: &str) -> Option<i64> {
    if let Ok(secs) = literal.parse::<i64>() {
        return Some(secs);
    }
    NaiveDateTime::parse_from_str(literal, DATETIME_FORMAT)
        .ok()
        .map(|at| at.and_utc().timestamp())
}

/// `yyyy-MM-dd` or raw epoch seconds.
pub fn parse_date(literal: &str) -> Option<i64> {
    if let Ok(secs) = literal.parse::<i64>() {
        return Some(secs);
    }
    NaiveDate::parse_from_str(literal, DATE_FORMAT)
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc().timestamp())
}

fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
