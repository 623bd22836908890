// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Value types
//!
//! Logical column types, the values they carry, and the raw shape values take
//! when they cross into (or come back from) a database driver.
//!
//! The types here are dialect-agnostic data. How a [`ColumnType`] is spelled,
//! inlined as a literal, or encoded as a parameter for a given dialect is
//! decided at render time by the conversion strategy in the render crate.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical SQL column types (unified across dialects)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    // Boolean
    Boolean,

    // Numeric types
    Short,
    Integer,
    Long,
    Float,
    Double,
    Decimal { precision: u8, scale: u8 },

    // String types
    Varchar(usize),
    Text,

    // Binary types
    Binary,

    // Date/Time types
    Date,
    Time,
    DateTime,

    // JSON
    Json,

    // Arrays of another logical type
    Array(Box<ColumnType>),
}

impl ColumnType {
    /// Whether values of this type are integral numbers
    pub fn is_integral(&self) -> bool {
        matches!(self, ColumnType::Short | ColumnType::Integer | ColumnType::Long)
    }

    /// Whether values of this type are character data
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Varchar(_) | ColumnType::Text)
    }

    /// Whether `value` can be rendered as this type without a cast
    ///
    /// NULL is accepted by every type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnType::Boolean, Value::Bool(_)) => true,
            (ColumnType::Short | ColumnType::Integer | ColumnType::Long, v) => {
                matches!(v, Value::Short(_) | Value::Int(_) | Value::Long(_))
            }
            (ColumnType::Float | ColumnType::Double, v) => matches!(
                v,
                Value::Float(_) | Value::Double(_) | Value::Short(_) | Value::Int(_) | Value::Long(_)
            ),
            (ColumnType::Decimal { .. }, v) => matches!(
                v,
                Value::Decimal(_) | Value::Short(_) | Value::Int(_) | Value::Long(_)
            ),
            (ColumnType::Varchar(_) | ColumnType::Text, Value::Text(_)) => true,
            (ColumnType::Binary, Value::Bytes(_)) => true,
            (ColumnType::Date, Value::Date(_)) => true,
            (ColumnType::Time, Value::Time(_)) => true,
            (ColumnType::DateTime, Value::DateTime(_)) => true,
            (ColumnType::Json, Value::Json(_)) => true,
            (ColumnType::Array(inner), Value::Array(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            _ => false,
        }
    }

    /// Convert `value` to the variant this type stores
    ///
    /// - integers are narrowed or widened (`Integer` holds `Int`)
    /// - integers bound to a decimal become text at the column scale
    /// - floats change width only when no precision is lost
    ///
    /// Returns `None` when the value is not accepted or does not fit.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),
            (ColumnType::Short | ColumnType::Integer | ColumnType::Long, v) => {
                let n = integral(v)?;
                match self {
                    ColumnType::Short => i16::try_from(n).ok().map(Value::Short),
                    ColumnType::Integer => i32::try_from(n).ok().map(Value::Int),
                    _ => Some(Value::Long(n)),
                }
            }
            (ColumnType::Double, v) => exact_f64(v).map(Value::Double),
            (ColumnType::Float, v) => {
                let f = exact_f64(v)?;
                let narrowed = f as f32;
                (f64::from(narrowed) == f).then_some(Value::Float(narrowed))
            }
            (ColumnType::Decimal { .. }, Value::Decimal(text)) => Some(Value::Decimal(text.clone())),
            (ColumnType::Decimal { precision, scale }, v) => {
                let n = integral(v)?;
                let int_digits = n.unsigned_abs().to_string().len();
                if int_digits > usize::from(precision.saturating_sub(*scale)) {
                    return None;
                }
                Some(Value::Decimal(if *scale == 0 {
                    n.to_string()
                } else {
                    format!("{n}.{}", "0".repeat(usize::from(*scale)))
                }))
            }
            (ColumnType::Array(inner), Value::Array(items)) => items
                .iter()
                .map(|item| inner.coerce(item))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            (column_type, v) if column_type.accepts(v) => Some(v.clone()),
            _ => None,
        }
    }
}

fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Short(n) => Some(i64::from(*n)),
        Value::Int(n) => Some(i64::from(*n)),
        Value::Long(n) => Some(*n),
        _ => None,
    }
}

/// Largest integer magnitude an `f64` holds exactly
const MAX_EXACT_F64_INT: u64 = 1 << 53;

fn exact_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(f64::from(*f)),
        Value::Double(f) => Some(*f),
        Value::Long(n) if n.unsigned_abs() > MAX_EXACT_F64_INT => None,
        Value::Long(n) => Some(*n as f64),
        v => integral(v).map(|n| n as f64),
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Boolean => f.write_str("boolean"),
            ColumnType::Short => f.write_str("short"),
            ColumnType::Integer => f.write_str("integer"),
            ColumnType::Long => f.write_str("long"),
            ColumnType::Float => f.write_str("float"),
            ColumnType::Double => f.write_str("double"),
            ColumnType::Decimal { precision, scale } => write!(f, "decimal({precision}, {scale})"),
            ColumnType::Varchar(len) => write!(f, "varchar({len})"),
            ColumnType::Text => f.write_str("text"),
            ColumnType::Binary => f.write_str("binary"),
            ColumnType::Date => f.write_str("date"),
            ColumnType::Time => f.write_str("time"),
            ColumnType::DateTime => f.write_str("datetime"),
            ColumnType::Json => f.write_str("json"),
            ColumnType::Array(inner) => write!(f, "array<{inner}>"),
        }
    }
}

/// A value carried by a literal or parameter node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Value {
    Null,
    Bool(bool),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Decimal number kept as its canonical text (`-12.50`)
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Json(serde_json::Value),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short description of the value's shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Json(_) => "json",
            Value::Array(_) => "array",
        }
    }
}

/// A value paired with the logical type it should be rendered as
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    pub column_type: ColumnType,
    pub value: Value,
}

impl TypedValue {
    pub fn new(column_type: ColumnType, value: Value) -> Self {
        Self { column_type, value }
    }

    /// A typed SQL NULL
    pub fn null(column_type: ColumnType) -> Self {
        Self {
            column_type,
            value: Value::Null,
        }
    }

    /// A decimal value for a `DECIMAL(precision, scale)` column
    pub fn decimal(text: impl Into<String>, precision: u8, scale: u8) -> Self {
        Self {
            column_type: ColumnType::Decimal { precision, scale },
            value: Value::Decimal(text.into()),
        }
    }

    /// Copy of this value with another logical type
    pub fn with_type(&self, column_type: ColumnType) -> Self {
        Self {
            column_type,
            value: self.value.clone(),
        }
    }

    /// This value converted into the variant `column_type` stores, if it fits
    pub fn coerce_to(&self, column_type: &ColumnType) -> Option<Self> {
        column_type
            .coerce(&self.value)
            .map(|value| Self::new(column_type.clone(), value))
    }

    /// Copy of this value's type carrying another value
    pub fn with_value(&self, value: Value) -> Self {
        Self {
            column_type: self.column_type.clone(),
            value,
        }
    }
}

macro_rules! typed_value_from {
    ($($rust:ty => $column_type:expr, $variant:ident);* $(;)?) => {
        $(
            impl From<$rust> for TypedValue {
                fn from(v: $rust) -> Self {
                    TypedValue::new($column_type, Value::$variant(v.into()))
                }
            }
        )*
    };
}

typed_value_from! {
    bool => ColumnType::Boolean, Bool;
    i16 => ColumnType::Short, Short;
    i32 => ColumnType::Integer, Int;
    i64 => ColumnType::Long, Long;
    f32 => ColumnType::Float, Float;
    f64 => ColumnType::Double, Double;
    String => ColumnType::Text, Text;
    &str => ColumnType::Text, Text;
    Vec<u8> => ColumnType::Binary, Bytes;
    NaiveDate => ColumnType::Date, Date;
    NaiveTime => ColumnType::Time, Time;
    NaiveDateTime => ColumnType::DateTime, DateTime;
    serde_json::Value => ColumnType::Json, Json;
}

/// The raw representation exchanged with a database driver
///
/// Parameters are encoded into this shape before execution and result
/// columns arrive in it. Which variant a logical type maps to depends on the
/// dialect (SQLite, for instance, stores timestamps as text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DriverValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Array(Vec<DriverValue>),
}

impl DriverValue {
    /// Short description of the raw shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            DriverValue::Null => "null",
            DriverValue::Bool(_) => "bool",
            DriverValue::Int(_) => "int",
            DriverValue::Double(_) => "double",
            DriverValue::Text(_) => "text",
            DriverValue::Bytes(_) => "bytes",
            DriverValue::Date(_) => "date",
            DriverValue::Time(_) => "time",
            DriverValue::Timestamp(_) => "timestamp",
            DriverValue::Array(_) => "array",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_value_from_primitives() {
        let v: TypedValue = 5i32.into();
        assert_eq!(v.column_type, ColumnType::Integer);
        assert_eq!(v.value, Value::Int(5));

        let v: TypedValue = "Bob".into();
        assert_eq!(v.column_type, ColumnType::Text);
        assert_eq!(v.value, Value::Text("Bob".to_string()));
    }

    #[test]
    fn test_with_type_keeps_value() {
        let v = TypedValue::from(7i64).with_type(ColumnType::Integer);
        assert_eq!(v.column_type, ColumnType::Integer);
        assert_eq!(v.value, Value::Long(7));
    }

    #[test]
    fn test_coerce_to_stored_variant() {
        assert_eq!(ColumnType::Integer.coerce(&Value::Long(5)), Some(Value::Int(5)));
        assert_eq!(ColumnType::Long.coerce(&Value::Short(5)), Some(Value::Long(5)));
        assert_eq!(ColumnType::Short.coerce(&Value::Int(70_000)), None);
        assert_eq!(ColumnType::Double.coerce(&Value::Int(3)), Some(Value::Double(3.0)));
        assert_eq!(ColumnType::Float.coerce(&Value::Double(0.1)), None);
        assert_eq!(ColumnType::Float.coerce(&Value::Double(0.5)), Some(Value::Float(0.5)));

        let price = ColumnType::Decimal {
            precision: 4,
            scale: 2,
        };
        assert_eq!(price.coerce(&Value::Int(5)), Some(Value::Decimal("5.00".into())));
        assert_eq!(price.coerce(&Value::Int(-12)), Some(Value::Decimal("-12.00".into())));
        assert_eq!(price.coerce(&Value::Int(123)), None);
        assert_eq!(price.coerce(&Value::Null), Some(Value::Null));
        assert_eq!(ColumnType::Integer.coerce(&Value::Text("1".into())), None);
    }

    #[test]
    fn test_accepts() {
        assert!(ColumnType::Long.accepts(&Value::Int(1)));
        assert!(ColumnType::Varchar(10).accepts(&Value::Text("a".into())));
        assert!(ColumnType::Date.accepts(&Value::Null));
        assert!(!ColumnType::Integer.accepts(&Value::Text("1".into())));
        assert!(
            ColumnType::Array(Box::new(ColumnType::Integer))
                .accepts(&Value::Array(vec![Value::Int(1), Value::Long(2)]))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnType::Varchar(50).to_string(), "varchar(50)");
        assert_eq!(
            ColumnType::Array(Box::new(ColumnType::Integer)).to_string(),
            "array<integer>"
        );
    }
}
