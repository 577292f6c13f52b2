//! Conversion between rdao values and the MySQL wire types

use crate::error::{Error, Result};
use crate::params::{Bound, ParameterSet};
use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::consts::{ColumnFlags, ColumnType};
use mysql_async::{Column, Params, Value as MySqlValue};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Convert one parameter slot to driver parameters.
///
/// MySQL sends every NULL with the NULL wire type, so the declared type of
/// a typed null only matters for validation.
pub fn to_mysql_params(params: &ParameterSet) -> Result<Params> {
    params.validate()?;
    if params.is_empty() {
        return Ok(Params::Empty);
    }
    if params.is_named() {
        let named: HashMap<Vec<u8>, MySqlValue> = params
            .named()
            .map(|(name, bound)| (name.as_bytes().to_vec(), bound_to_mysql(bound)))
            .collect();
        return Ok(Params::Named(named));
    }
    Ok(Params::Positional(
        params.positional().map(bound_to_mysql).collect(),
    ))
}

fn bound_to_mysql(bound: &Bound) -> MySqlValue {
    match bound {
        Bound::Value(value) => to_mysql_value(value),
        Bound::Null(_) => MySqlValue::NULL,
    }
}

/// Convert rdao Value to mysql_async Value
pub fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(v) => MySqlValue::from(*v),
        Value::I8(v) => MySqlValue::from(*v),
        Value::I16(v) => MySqlValue::from(*v),
        Value::I32(v) => MySqlValue::from(*v),
        Value::I64(v) => MySqlValue::from(*v),
        Value::U8(v) => MySqlValue::from(*v),
        Value::U16(v) => MySqlValue::from(*v),
        Value::U32(v) => MySqlValue::from(*v),
        Value::U64(v) => MySqlValue::from(*v),
        Value::F32(v) => MySqlValue::from(*v),
        Value::F64(v) => MySqlValue::from(*v),
        Value::String(v) => MySqlValue::from(v.as_str()),
        Value::Bytes(v) => MySqlValue::from(v.as_slice()),
        Value::Date(v) => {
            MySqlValue::Date(v.year() as u16, v.month() as u8, v.day() as u8, 0, 0, 0, 0)
        }
        Value::DateTime(v) => MySqlValue::Date(
            v.year() as u16,
            v.month() as u8,
            v.day() as u8,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.and_utc().timestamp_subsec_micros(),
        ),
        Value::Time(v) => MySqlValue::Time(
            false,
            0,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.nanosecond() / 1000,
        ),
        Value::Decimal(v) => MySqlValue::from(v.to_string()),
        Value::Json(v) => MySqlValue::from(v.to_string()),
    }
}

/// Convert a column value, decoding text-encoded numbers and dates.
///
/// The text protocol sends every non-null value as bytes; the column type
/// says how to read them back.
pub fn from_column_value(value: MySqlValue, column: &Column) -> Result<Value> {
    let bytes = match value {
        MySqlValue::Bytes(bytes) if is_text_encoded(column.column_type()) => bytes,
        other => return from_mysql_value(other),
    };
    let text = String::from_utf8(bytes).map_err(|e| Error::TypeConversion {
        expected: "utf-8 text",
        actual: format!("{} bytes", e.as_bytes().len()),
    })?;
    let unsigned = column.flags().contains(ColumnFlags::UNSIGNED_FLAG);
    parse_text(&text, column.column_type(), unsigned)
}

fn is_text_encoded(column_type: ColumnType) -> bool {
    use ColumnType::*;
    matches!(
        column_type,
        MYSQL_TYPE_TINY
            | MYSQL_TYPE_SHORT
            | MYSQL_TYPE_INT24
            | MYSQL_TYPE_LONG
            | MYSQL_TYPE_LONGLONG
            | MYSQL_TYPE_YEAR
            | MYSQL_TYPE_FLOAT
            | MYSQL_TYPE_DOUBLE
            | MYSQL_TYPE_DECIMAL
            | MYSQL_TYPE_NEWDECIMAL
            | MYSQL_TYPE_DATE
            | MYSQL_TYPE_NEWDATE
            | MYSQL_TYPE_DATETIME
            | MYSQL_TYPE_TIMESTAMP
            | MYSQL_TYPE_TIME
    )
}

fn parse_text(text: &str, column_type: ColumnType, unsigned: bool) -> Result<Value> {
    use ColumnType::*;
    let invalid = |expected: &'static str| Error::TypeConversion {
        expected,
        actual: text.to_string(),
    };
    match column_type {
        MYSQL_TYPE_FLOAT => text.parse().map(Value::F32).map_err(|_| invalid("f32")),
        MYSQL_TYPE_DOUBLE => text.parse().map(Value::F64).map_err(|_| invalid("f64")),
        MYSQL_TYPE_DECIMAL | MYSQL_TYPE_NEWDECIMAL => text
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|_| invalid("decimal")),
        MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| invalid("date")),
        MYSQL_TYPE_DATETIME | MYSQL_TYPE_TIMESTAMP => {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                .map(Value::DateTime)
                .map_err(|_| invalid("datetime"))
        }
        MYSQL_TYPE_TIME => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .map(Value::Time)
            .map_err(|_| invalid("time (00:00:00 to 23:59:59)")),
        _ if unsigned => text.parse().map(Value::U64).map_err(|_| invalid("u64")),
        _ => text.parse().map(Value::I64).map_err(|_| invalid("i64")),
    }
}

/// Convert mysql_async Value to rdao Value
pub fn from_mysql_value(value: MySqlValue) -> Result<Value> {
    match value {
        MySqlValue::NULL => Ok(Value::Null),
        // Text columns arrive as bytes; keep them as bytes only when not UTF-8.
        MySqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(s) => Ok(Value::String(s)),
            Err(e) => Ok(Value::Bytes(e.into_bytes())),
        },
        MySqlValue::Int(v) => Ok(Value::I64(v)),
        MySqlValue::UInt(v) => Ok(Value::U64(v)),
        MySqlValue::Float(v) => Ok(Value::F32(v)),
        MySqlValue::Double(v) => Ok(Value::F64(v)),
        MySqlValue::Date(year, month, day, hour, min, sec, micro) => {
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                // Pure date
                let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                    .ok_or_else(|| Error::TypeConversion {
                        expected: "date",
                        actual: format!("{}-{}-{}", year, month, day),
                    })?;
                Ok(Value::Date(date))
            } else {
                // DateTime
                let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                    .ok_or_else(|| Error::TypeConversion {
                        expected: "date",
                        actual: format!("{}-{}-{}", year, month, day),
                    })?;
                let time =
                    NaiveTime::from_hms_micro_opt(hour as u32, min as u32, sec as u32, micro)
                        .ok_or_else(|| Error::TypeConversion {
                            expected: "time",
                            actual: format!("{}:{}:{}.{}", hour, min, sec, micro),
                        })?;
                Ok(Value::DateTime(NaiveDateTime::new(date, time)))
            }
        }
        MySqlValue::Time(is_neg, days, hours, mins, secs, micro) => {
            // NaiveTime only supports 00:00:00 to 23:59:59
            // Reject values outside this range (negative, >24h, or with days component)
            if is_neg || days > 0 || hours >= 24 {
                return Err(Error::TypeConversion {
                    expected: "time (00:00:00 to 23:59:59)",
                    actual: format!(
                        "{}{}:{:02}:{:02}",
                        if is_neg { "-" } else { "" },
                        days * 24 + hours as u32,
                        mins,
                        secs
                    ),
                });
            }
            let time = NaiveTime::from_hms_micro_opt(hours as u32, mins as u32, secs as u32, micro)
                .ok_or_else(|| Error::TypeConversion {
                    expected: "time",
                    actual: format!("{}:{}:{}.{}", hours, mins, secs, micro),
                })?;
            Ok(Value::Time(time))
        }
    }
}
