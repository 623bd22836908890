// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Value-Type Conversion
//!
//! Per logical [`ColumnType`], how values are named, inlined, bound and read
//! back for a given dialect.
//!
//! ## Precision
//!
//! Round-tripping a value through [`ValueTypeStrategy::to_parameter_value`]
//! and [`ValueTypeStrategy::from_driver_value`] is lossless except for the
//! documented fractional-second truncation:
//!
//! | family | fractional seconds | boolean parameter | temporal parameter |
//! |---|---|---|---|
//! | PostgreSQL, H2, MySQL | microseconds | `Bool` | native |
//! | Oracle, SQL Server | microseconds | `Int(1/0)` | native |
//! | SQLite | milliseconds | `Int(1/0)` | ISO-8601 text |
//!
//! ## Decoding
//!
//! Decoding accepts the raw shapes drivers commonly return for a type (a
//! boolean may come back as `Bool`, `Int(0/1)` or text) and fails with
//! [`RenderError::Conversion`] on anything else.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, SubsecRound};
use unified_sql_ir::{ColumnType, Dialect, DialectExtensions, DialectFamily, DriverValue, Value};

use crate::error::{RenderError, RenderResult};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Conversion rules for one logical type
pub trait ValueTypeStrategy {
    /// Column type name as written in DDL and `CAST`
    fn sql_type_name(&self, dialect: Dialect) -> RenderResult<String>;

    /// Value inlined as a SQL literal
    fn to_literal_text(&self, value: &Value, dialect: Dialect) -> RenderResult<String>;

    /// Value encoded for binding to a placeholder
    fn to_parameter_value(&self, value: &Value, dialect: Dialect) -> RenderResult<DriverValue>;

    /// Value decoded from what a driver returned
    fn from_driver_value(&self, raw: &DriverValue, dialect: Dialect) -> RenderResult<Value>;
}

impl ValueTypeStrategy for ColumnType {
    fn sql_type_name(&self, dialect: Dialect) -> RenderResult<String> {
        use DialectFamily as F;

        let family = dialect.family();
        let name = match self {
            ColumnType::Boolean => match family {
                F::Oracle => "NUMBER(1)".to_string(),
                F::SQLServer => "BIT".to_string(),
                _ => "BOOLEAN".to_string(),
            },
            ColumnType::Short => match family {
                F::Oracle => "NUMBER(5)".to_string(),
                _ => "SMALLINT".to_string(),
            },
            ColumnType::Integer => match family {
                F::Oracle => "NUMBER(10)".to_string(),
                F::SQLite => "INTEGER".to_string(),
                _ => "INT".to_string(),
            },
            ColumnType::Long => match family {
                F::Oracle => "NUMBER(19)".to_string(),
                _ => "BIGINT".to_string(),
            },
            ColumnType::Float => match family {
                F::Oracle => "BINARY_FLOAT".to_string(),
                F::MySQL => "FLOAT".to_string(),
                _ => "REAL".to_string(),
            },
            ColumnType::Double => match family {
                F::Oracle => "BINARY_DOUBLE".to_string(),
                F::SQLServer => "FLOAT".to_string(),
                _ => "DOUBLE PRECISION".to_string(),
            },
            ColumnType::Decimal { precision, scale } => match family {
                F::Oracle => format!("NUMBER({precision}, {scale})"),
                _ => format!("DECIMAL({precision}, {scale})"),
            },
            ColumnType::Varchar(len) => match family {
                F::Oracle => format!("VARCHAR2({len} CHAR)"),
                F::SQLServer => format!("NVARCHAR({len})"),
                _ => format!("VARCHAR({len})"),
            },
            ColumnType::Text => match family {
                F::Oracle | F::H2 => "CLOB".to_string(),
                F::SQLServer => "NVARCHAR(MAX)".to_string(),
                _ => "TEXT".to_string(),
            },
            ColumnType::Binary => match family {
                F::PostgreSQL => "BYTEA".to_string(),
                F::SQLServer => "VARBINARY(MAX)".to_string(),
                _ => "BLOB".to_string(),
            },
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => match family {
                F::Oracle => "TIMESTAMP".to_string(),
                F::SQLite => "TEXT".to_string(),
                _ => "TIME".to_string(),
            },
            ColumnType::DateTime => match family {
                F::MySQL => "DATETIME(6)".to_string(),
                F::SQLServer => "DATETIME2(6)".to_string(),
                F::SQLite => "TEXT".to_string(),
                _ => "TIMESTAMP".to_string(),
            },
            ColumnType::Json => match family {
                F::PostgreSQL | F::MySQL | F::H2 => "JSON".to_string(),
                F::Oracle => "CLOB".to_string(),
                F::SQLServer => "NVARCHAR(MAX)".to_string(),
                F::SQLite => "TEXT".to_string(),
            },
            ColumnType::Array(inner) => {
                let inner = inner.sql_type_name(dialect)?;
                match family {
                    F::PostgreSQL => format!("{inner}[]"),
                    F::H2 => format!("{inner} ARRAY"),
                    _ => return Err(RenderError::unsupported("ARRAY column type", dialect)),
                }
            }
        };
        Ok(name)
    }

    fn to_literal_text(&self, value: &Value, dialect: Dialect) -> RenderResult<String> {
        use DialectFamily as F;

        check_accepts(self, value)?;
        let family = dialect.family();

        let text = match (self, value) {
            (_, Value::Null) => "NULL".to_string(),
            (ColumnType::Boolean, Value::Bool(b)) => {
                match (dialect.supports(DialectExtensions::BooleanLiterals), *b) {
                    (true, true) => "TRUE".to_string(),
                    (true, false) => "FALSE".to_string(),
                    (false, true) => "1".to_string(),
                    (false, false) => "0".to_string(),
                }
            }
            (ColumnType::Float | ColumnType::Double, v) => format_float(self, v)?,
            (ColumnType::Decimal { precision, scale }, v) => {
                normalize_decimal(self, &decimal_text(v), *precision, *scale)?
            }
            (t, v) if t.is_integral() => integral_value(t, v)?.to_string(),
            (ColumnType::Varchar(_) | ColumnType::Text, Value::Text(s)) => {
                check_length(self, s)?;
                quote_string(s, dialect)
            }
            (ColumnType::Binary, Value::Bytes(bytes)) => {
                let hex = to_hex(bytes);
                match family {
                    F::PostgreSQL => format!("'\\x{hex}'::bytea"),
                    F::SQLServer => format!("0x{hex}"),
                    F::Oracle => format!("HEXTORAW('{hex}')"),
                    _ => format!("X'{hex}'"),
                }
            }
            (ColumnType::Date, Value::Date(d)) => {
                let text = d.format(DATE_FORMAT).to_string();
                match family {
                    F::PostgreSQL | F::H2 => format!("DATE '{text}'"),
                    F::Oracle => format!("TO_DATE('{text}', 'YYYY-MM-DD')"),
                    F::SQLServer => format!("CAST('{text}' AS DATE)"),
                    F::MySQL | F::SQLite => format!("'{text}'"),
                }
            }
            (ColumnType::Time, Value::Time(t)) => {
                let text = format_time(t, dialect);
                match family {
                    F::PostgreSQL | F::H2 => format!("TIME '{text}'"),
                    F::Oracle => format!(
                        "TO_TIMESTAMP('1970-01-01 {text}', 'YYYY-MM-DD HH24:MI:SS.FF6')"
                    ),
                    F::SQLServer => format!("CAST('{text}' AS TIME)"),
                    F::MySQL | F::SQLite => format!("'{text}'"),
                }
            }
            (ColumnType::DateTime, Value::DateTime(dt)) => {
                let text = format_datetime(dt, dialect);
                match family {
                    F::PostgreSQL | F::H2 => format!("TIMESTAMP '{text}'"),
                    F::Oracle => format!("TO_TIMESTAMP('{text}', 'YYYY-MM-DD HH24:MI:SS.FF6')"),
                    F::SQLServer => format!("CAST('{text}' AS DATETIME2)"),
                    F::MySQL | F::SQLite => format!("'{text}'"),
                }
            }
            (ColumnType::Json, Value::Json(json)) => {
                let quoted = quote_string(&json.to_string(), dialect);
                match family {
                    F::PostgreSQL => format!("{quoted}::json"),
                    _ => quoted,
                }
            }
            (ColumnType::Array(inner), Value::Array(items)) => {
                if !dialect.supports(DialectExtensions::Arrays) {
                    return Err(RenderError::unsupported("ARRAY literal", dialect));
                }
                let items = items
                    .iter()
                    .map(|item| inner.to_literal_text(item, dialect))
                    .collect::<RenderResult<Vec<_>>>()?;
                format!("ARRAY[{}]", items.join(", "))
            }
            (t, v) => return Err(mismatch(t, v)),
        };
        Ok(text)
    }

    fn to_parameter_value(&self, value: &Value, dialect: Dialect) -> RenderResult<DriverValue> {
        check_accepts(self, value)?;
        let family = dialect.family();
        let sqlite = family == DialectFamily::SQLite;

        let raw = match (self, value) {
            (_, Value::Null) => DriverValue::Null,
            (ColumnType::Boolean, Value::Bool(b)) => match family {
                DialectFamily::SQLite | DialectFamily::Oracle | DialectFamily::SQLServer => {
                    DriverValue::Int(i64::from(*b))
                }
                _ => DriverValue::Bool(*b),
            },
            (ColumnType::Float | ColumnType::Double, v) => DriverValue::Double(float_value(self, v)?),
            (ColumnType::Decimal { precision, scale }, v) => {
                DriverValue::Text(normalize_decimal(self, &decimal_text(v), *precision, *scale)?)
            }
            (t, v) if t.is_integral() => DriverValue::Int(integral_value(t, v)?),
            (ColumnType::Varchar(_) | ColumnType::Text, Value::Text(s)) => {
                check_length(self, s)?;
                DriverValue::Text(s.clone())
            }
            (ColumnType::Binary, Value::Bytes(bytes)) => DriverValue::Bytes(bytes.clone()),
            (ColumnType::Date, Value::Date(d)) if sqlite => {
                DriverValue::Text(d.format(DATE_FORMAT).to_string())
            }
            (ColumnType::Date, Value::Date(d)) => DriverValue::Date(*d),
            (ColumnType::Time, Value::Time(t)) if sqlite => {
                DriverValue::Text(format_time(t, dialect))
            }
            (ColumnType::Time, Value::Time(t)) => DriverValue::Time(truncate_time(t, dialect)),
            (ColumnType::DateTime, Value::DateTime(dt)) if sqlite => {
                DriverValue::Text(format_datetime(dt, dialect))
            }
            (ColumnType::DateTime, Value::DateTime(dt)) => {
                DriverValue::Timestamp(truncate_datetime(dt, dialect))
            }
            (ColumnType::Json, Value::Json(json)) => DriverValue::Text(json.to_string()),
            (ColumnType::Array(inner), Value::Array(items)) => {
                if !dialect.supports(DialectExtensions::Arrays) {
                    return Err(RenderError::unsupported("ARRAY parameter", dialect));
                }
                DriverValue::Array(
                    items
                        .iter()
                        .map(|item| inner.to_parameter_value(item, dialect))
                        .collect::<RenderResult<Vec<_>>>()?,
                )
            }
            (t, v) => return Err(mismatch(t, v)),
        };
        Ok(raw)
    }

    fn from_driver_value(&self, raw: &DriverValue, dialect: Dialect) -> RenderResult<Value> {
        if let DriverValue::Null = raw {
            return Ok(Value::Null);
        }

        let value = match self {
            ColumnType::Boolean => match raw {
                DriverValue::Bool(b) => Value::Bool(*b),
                DriverValue::Int(0) => Value::Bool(false),
                DriverValue::Int(1) => Value::Bool(true),
                DriverValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "t" | "true" | "1" => Value::Bool(true),
                    "f" | "false" | "0" => Value::Bool(false),
                    _ => return Err(unparsable(self, s)),
                },
                other => return Err(unexpected_raw(self, other)),
            },
            ColumnType::Short | ColumnType::Integer | ColumnType::Long => {
                let n = match raw {
                    DriverValue::Int(n) => *n,
                    DriverValue::Bool(b) => i64::from(*b),
                    DriverValue::Text(s) => s.trim().parse::<i64>().map_err(|_| unparsable(self, s))?,
                    other => return Err(unexpected_raw(self, other)),
                };
                narrow_integral(self, n)?
            }
            ColumnType::Float | ColumnType::Double => {
                let f = match raw {
                    DriverValue::Double(f) => *f,
                    DriverValue::Int(n) => *n as f64,
                    DriverValue::Text(s) => s.trim().parse::<f64>().map_err(|_| unparsable(self, s))?,
                    other => return Err(unexpected_raw(self, other)),
                };
                if *self == ColumnType::Float {
                    Value::Float(f as f32)
                } else {
                    Value::Double(f)
                }
            }
            ColumnType::Decimal { precision, scale } => {
                let text = match raw {
                    DriverValue::Text(s) => s.trim().to_string(),
                    DriverValue::Int(n) => n.to_string(),
                    DriverValue::Double(f) if f.is_finite() => f.to_string(),
                    other => return Err(unexpected_raw(self, other)),
                };
                Value::Decimal(normalize_decimal(self, &text, *precision, *scale)?)
            }
            ColumnType::Varchar(_) | ColumnType::Text => match raw {
                DriverValue::Text(s) => Value::Text(s.clone()),
                DriverValue::Bytes(bytes) => Value::Text(
                    String::from_utf8(bytes.clone())
                        .map_err(|e| RenderError::conversion(self, e.to_string()))?,
                ),
                other => return Err(unexpected_raw(self, other)),
            },
            ColumnType::Binary => match raw {
                DriverValue::Bytes(bytes) => Value::Bytes(bytes.clone()),
                DriverValue::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
                other => return Err(unexpected_raw(self, other)),
            },
            ColumnType::Date => match raw {
                DriverValue::Date(d) => Value::Date(*d),
                DriverValue::Timestamp(dt) => Value::Date(dt.date()),
                DriverValue::Text(s) => Value::Date(parse_date(self, s)?),
                other => return Err(unexpected_raw(self, other)),
            },
            ColumnType::Time => match raw {
                DriverValue::Time(t) => Value::Time(*t),
                DriverValue::Timestamp(dt) => Value::Time(dt.time()),
                DriverValue::Text(s) => Value::Time(parse_time(self, s)?),
                other => return Err(unexpected_raw(self, other)),
            },
            ColumnType::DateTime => match raw {
                DriverValue::Timestamp(dt) => Value::DateTime(*dt),
                DriverValue::Date(d) => Value::DateTime(d.and_time(NaiveTime::MIN)),
                DriverValue::Text(s) => Value::DateTime(parse_datetime(self, s)?),
                other => return Err(unexpected_raw(self, other)),
            },
            ColumnType::Json => match raw {
                DriverValue::Text(s) => Value::Json(
                    serde_json::from_str(s).map_err(|e| RenderError::conversion(self, e.to_string()))?,
                ),
                DriverValue::Bytes(bytes) => Value::Json(
                    serde_json::from_slice(bytes)
                        .map_err(|e| RenderError::conversion(self, e.to_string()))?,
                ),
                other => return Err(unexpected_raw(self, other)),
            },
            ColumnType::Array(inner) => match raw {
                DriverValue::Array(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| inner.from_driver_value(item, dialect))
                        .collect::<RenderResult<Vec<_>>>()?,
                ),
                other => return Err(unexpected_raw(self, other)),
            },
        };
        Ok(value)
    }
}

/// Quote a string literal, doubling `'` (and escaping `\` on MySQL)
pub fn quote_string(s: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' if dialect.family() == DialectFamily::MySQL => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn check_accepts(column_type: &ColumnType, value: &Value) -> RenderResult<()> {
    if column_type.accepts(value) {
        Ok(())
    } else {
        Err(mismatch(column_type, value))
    }
}

fn mismatch(column_type: &ColumnType, value: &Value) -> RenderError {
    RenderError::conversion(column_type, format!("unexpected {} value", value.kind()))
}

fn unexpected_raw(column_type: &ColumnType, raw: &DriverValue) -> RenderError {
    RenderError::conversion(column_type, format!("unexpected driver value of kind {}", raw.kind()))
}

fn unparsable(column_type: &ColumnType, text: &str) -> RenderError {
    RenderError::conversion(column_type, format!("cannot parse '{text}'"))
}

fn check_length(column_type: &ColumnType, s: &str) -> RenderResult<()> {
    if let ColumnType::Varchar(max) = column_type {
        let len = s.chars().count();
        if len > *max {
            return Err(RenderError::conversion(
                column_type,
                format!("length {len} exceeds maximum {max}"),
            ));
        }
    }
    Ok(())
}

fn integral_value(column_type: &ColumnType, value: &Value) -> RenderResult<i64> {
    let n = match value {
        Value::Short(n) => i64::from(*n),
        Value::Int(n) => i64::from(*n),
        Value::Long(n) => *n,
        other => return Err(mismatch(column_type, other)),
    };
    narrow_integral(column_type, n)?;
    Ok(n)
}

/// Range-check `n` against the column type and wrap it in the matching value
fn narrow_integral(column_type: &ColumnType, n: i64) -> RenderResult<Value> {
    let out_of_range = || RenderError::conversion(column_type, format!("{n} is out of range"));
    match column_type {
        ColumnType::Short => i16::try_from(n).map(Value::Short).map_err(|_| out_of_range()),
        ColumnType::Integer => i32::try_from(n).map(Value::Int).map_err(|_| out_of_range()),
        _ => Ok(Value::Long(n)),
    }
}

fn float_value(column_type: &ColumnType, value: &Value) -> RenderResult<f64> {
    let f = match value {
        Value::Float(f) => f64::from(*f),
        Value::Double(f) => *f,
        Value::Short(n) => f64::from(*n),
        Value::Int(n) => f64::from(*n),
        Value::Long(n) => *n as f64,
        other => return Err(mismatch(column_type, other)),
    };
    if !f.is_finite() {
        return Err(RenderError::conversion(column_type, format!("{f} is not finite")));
    }
    Ok(f)
}

fn format_float(column_type: &ColumnType, value: &Value) -> RenderResult<String> {
    match value {
        Value::Float(f) if f.is_finite() => Ok(f.to_string()),
        other => float_value(column_type, other).map(|f| f.to_string()),
    }
}

fn decimal_text(value: &Value) -> String {
    match value {
        Value::Decimal(s) => s.trim().to_string(),
        Value::Short(n) => n.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Long(n) => n.to_string(),
        other => other.kind().to_string(),
    }
}

/// Normalize decimal text to exactly `scale` fractional digits
///
/// Extra fractional digits are accepted only when they are zeros. More
/// integer digits than `precision - scale` is an error.
fn normalize_decimal(
    column_type: &ColumnType,
    text: &str,
    precision: u8,
    scale: u8,
) -> RenderResult<String> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(unparsable(column_type, text));
    }

    let scale = usize::from(scale);
    let int_digits = int_part.trim_start_matches('0');
    let max_int_digits = usize::from(precision).saturating_sub(scale);
    if int_digits.len() > max_int_digits {
        return Err(RenderError::conversion(
            column_type,
            format!("{text} exceeds precision {precision}"),
        ));
    }

    let mut frac = frac_part.to_string();
    if frac.len() > scale {
        if frac[scale..].chars().any(|c| c != '0') {
            return Err(RenderError::conversion(
                column_type,
                format!("{text} exceeds scale {scale}"),
            ));
        }
        frac.truncate(scale);
    }
    while frac.len() < scale {
        frac.push('0');
    }

    let int_digits = if int_digits.is_empty() { "0" } else { int_digits };
    let is_zero = int_digits == "0" && frac.chars().all(|c| c == '0');
    let sign = if negative && !is_zero { "-" } else { "" };

    Ok(if scale == 0 {
        format!("{sign}{int_digits}")
    } else {
        format!("{sign}{int_digits}.{frac}")
    })
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// Fractional-second digits kept by the dialect
fn fraction_digits(dialect: Dialect) -> u16 {
    match dialect.family() {
        DialectFamily::SQLite => 3,
        _ => 6,
    }
}

fn truncate_time(t: &NaiveTime, dialect: Dialect) -> NaiveTime {
    t.trunc_subsecs(fraction_digits(dialect))
}

fn truncate_datetime(dt: &NaiveDateTime, dialect: Dialect) -> NaiveDateTime {
    dt.trunc_subsecs(fraction_digits(dialect))
}

fn format_time(t: &NaiveTime, dialect: Dialect) -> String {
    let fraction = match fraction_digits(dialect) {
        3 => "%.3f",
        _ => "%.6f",
    };
    truncate_time(t, dialect)
        .format(&format!("{TIME_FORMAT}{fraction}"))
        .to_string()
}

fn format_datetime(dt: &NaiveDateTime, dialect: Dialect) -> String {
    let fraction = match fraction_digits(dialect) {
        3 => "%.3f",
        _ => "%.6f",
    };
    truncate_datetime(dt, dialect)
        .format(&format!("{DATETIME_FORMAT}{fraction}"))
        .to_string()
}

fn parse_date(column_type: &ColumnType, s: &str) -> RenderResult<NaiveDate> {
    let s = s.trim();
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| unparsable(column_type, s))
}

fn parse_time(column_type: &ColumnType, s: &str) -> RenderResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| unparsable(column_type, s))
}

fn parse_datetime(column_type: &ColumnType, s: &str) -> RenderResult<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(s, DATE_FORMAT).map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|_| unparsable(column_type, s))
}
