//! Value coercion shared by row binding and predicate evaluation.
//!
//! Conversions are checked: narrowing that does not fit the target fails with
//! [`ValueError::Overflow`], text that does not parse fails with
//! [`ValueError::Parse`]. Floating-point to integer conversion rounds half to
//! even before the range check.

use crate::access::{DataType, Value, ValueError, ValueResult};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use uuid::Uuid;

/// Text layouts accepted when turning text into a date-time
pub const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d",
];

/// Render float, double and decimal values as their shortest round-trip text
/// with trailing zeros removed. Other values are not numeric text candidates.
pub fn normalize_numeric_text(value: &Value) -> Option<String> {
    match value {
        Value::Float32(v) => Some(v.to_string()),
        Value::Float64(v) => Some(v.to_string()),
        Value::Decimal(d) => Some(d.normalize().to_string()),
        _ => None,
    }
}

/// Convert `value` into a value of type `target`.
///
/// `Object` accepts anything unchanged. A null value only converts to `Object`.
pub fn convert<S: AsRef<str>>(value: Value, target: DataType, formats: &[S]) -> ValueResult<Value> {
    if value.is_null() {
        return match target {
            DataType::Object => Ok(Value::Null),
            _ => Err(ValueError::UnexpectedNull {
                target: target.name(),
            }),
        };
    }
    if target == DataType::Object || value.data_type() == Some(target) {
        return Ok(value);
    }

    match target {
        DataType::String => Ok(Value::String(value.to_string())),
        DataType::Boolean => to_bool(&value).map(Value::Boolean),
        DataType::Float32 => to_f64(&value).map(|v| Value::Float32(v as f32)),
        DataType::Float64 => to_f64(&value).map(Value::Float64),
        DataType::Decimal => to_decimal(&value).map(Value::Decimal),
        DataType::Char => to_char(&value).map(Value::Char),
        DataType::DateTime => to_datetime(&value, formats).map(Value::DateTime),
        DataType::Guid => match &value {
            Value::String(s) => Uuid::parse_str(s.trim())
                .map(Value::Guid)
                .map_err(|_| ValueError::Parse {
                    text: s.clone(),
                    target: target.name(),
                }),
            other => Err(mismatch(target, other)),
        },
        t if t.is_integer() => {
            let n = to_integer(&value, t)?;
            narrow(n, t)
        }
        _ => Err(mismatch(target, &value)),
    }
}

pub fn to_bool(value: &Value) -> ValueResult<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Float32(v) => Ok(*v != 0.0),
        Value::Float64(v) => Ok(*v != 0.0),
        Value::Decimal(d) => Ok(!d.is_zero()),
        Value::String(s) => {
            let t = s.trim();
            if t.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if t.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(ValueError::Parse {
                    text: s.clone(),
                    target: DataType::Boolean.name(),
                })
            }
        }
        other => match integer_of(other) {
            Some(n) => Ok(n != 0),
            None => Err(mismatch(DataType::Boolean, other)),
        },
    }
}

pub fn to_i64(value: &Value) -> ValueResult<i64> {
    let n = to_integer(value, DataType::Int64)?;
    i64::try_from(n).map_err(|_| overflow(n, DataType::Int64))
}

pub fn to_decimal(value: &Value) -> ValueResult<Decimal> {
    let target = DataType::Decimal;
    match value {
        Value::Decimal(d) => Ok(*d),
        Value::Boolean(b) => Ok(if *b { Decimal::ONE } else { Decimal::ZERO }),
        Value::Float32(v) => decimal_from_text(&v.to_string(), target),
        Value::Float64(v) => decimal_from_text(&v.to_string(), target),
        Value::String(s) => decimal_from_text(s, target),
        other => match integer_of(other) {
            Some(n) => Decimal::try_from_i128_with_scale(n, 0).map_err(|_| overflow(n, target)),
            None => Err(mismatch(target, other)),
        },
    }
}

pub fn to_datetime<S: AsRef<str>>(value: &Value, formats: &[S]) -> ValueResult<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::String(s) => parse_datetime(s.trim(), formats).ok_or_else(|| ValueError::Parse {
            text: s.clone(),
            target: DataType::DateTime.name(),
        }),
        other => Err(mismatch(DataType::DateTime, other)),
    }
}

fn parse_datetime<S: AsRef<str>>(text: &str, formats: &[S]) -> Option<NaiveDateTime> {
    for format in formats {
        let format = format.as_ref();
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Some(dt);
            }
        }
    }
    None
}

fn to_f64(value: &Value) -> ValueResult<f64> {
    let target = DataType::Float64;
    match value {
        Value::Float32(v) => Ok(f64::from(*v)),
        Value::Float64(v) => Ok(*v),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Decimal(d) => d.to_f64().ok_or_else(|| ValueError::Overflow {
            value: d.to_string(),
            target: target.name(),
        }),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| ValueError::Parse {
            text: s.clone(),
            target: target.name(),
        }),
        Value::Char(_) => Err(mismatch(target, value)),
        other => match integer_of(other) {
            Some(n) => Ok(n as f64),
            None => Err(mismatch(target, other)),
        },
    }
}

fn to_char(value: &Value) -> ValueResult<char> {
    let target = DataType::Char;
    match value {
        Value::Char(c) => Ok(*c),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(ValueError::Parse {
                    text: s.clone(),
                    target: target.name(),
                }),
            }
        }
        Value::Boolean(_) => Err(mismatch(target, value)),
        other => match integer_of(other) {
            Some(n) => u32::try_from(n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| overflow(n, target)),
            None => Err(mismatch(target, other)),
        },
    }
}

fn to_integer(value: &Value, target: DataType) -> ValueResult<i128> {
    match value {
        Value::Boolean(b) => Ok(i128::from(*b)),
        Value::Char(c) => Ok(i128::from(u32::from(*c))),
        Value::Float32(v) => float_to_integer(f64::from(*v), target),
        Value::Float64(v) => float_to_integer(*v, target),
        Value::Decimal(d) => d
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i128()
            .ok_or_else(|| ValueError::Overflow {
                value: d.to_string(),
                target: target.name(),
            }),
        Value::String(s) => s.trim().parse::<i128>().map_err(|_| ValueError::Parse {
            text: s.clone(),
            target: target.name(),
        }),
        other => integer_of(other).ok_or_else(|| mismatch(target, other)),
    }
}

fn float_to_integer(v: f64, target: DataType) -> ValueResult<i128> {
    let rounded = v.round_ties_even();
    if !rounded.is_finite() || rounded.abs() >= 1e38 {
        return Err(ValueError::Overflow {
            value: v.to_string(),
            target: target.name(),
        });
    }
    Ok(rounded as i128)
}

fn integer_of(value: &Value) -> Option<i128> {
    match value {
        Value::Byte(v) => Some(i128::from(*v)),
        Value::SByte(v) => Some(i128::from(*v)),
        Value::Int16(v) => Some(i128::from(*v)),
        Value::UInt16(v) => Some(i128::from(*v)),
        Value::Int32(v) => Some(i128::from(*v)),
        Value::UInt32(v) => Some(i128::from(*v)),
        Value::Int64(v) => Some(i128::from(*v)),
        Value::UInt64(v) => Some(i128::from(*v)),
        _ => None,
    }
}

fn narrow(n: i128, target: DataType) -> ValueResult<Value> {
    let value = match target {
        DataType::Byte => u8::try_from(n).ok().map(Value::Byte),
        DataType::SByte => i8::try_from(n).ok().map(Value::SByte),
        DataType::Int16 => i16::try_from(n).ok().map(Value::Int16),
        DataType::UInt16 => u16::try_from(n).ok().map(Value::UInt16),
        DataType::Int32 => i32::try_from(n).ok().map(Value::Int32),
        DataType::UInt32 => u32::try_from(n).ok().map(Value::UInt32),
        DataType::Int64 => i64::try_from(n).ok().map(Value::Int64),
        DataType::UInt64 => u64::try_from(n).ok().map(Value::UInt64),
        _ => None,
    };
    value.ok_or_else(|| overflow(n, target))
}

fn decimal_from_text(text: &str, target: DataType) -> ValueResult<Decimal> {
    let t = text.trim();
    Decimal::from_str(t)
        .or_else(|_| Decimal::from_scientific(t))
        .map_err(|_| ValueError::Parse {
            text: text.to_string(),
            target: target.name(),
        })
}

fn overflow(n: i128, target: DataType) -> ValueError {
    ValueError::Overflow {
        value: n.to_string(),
        target: target.name(),
    }
}

fn mismatch(target: DataType, found: &Value) -> ValueError {
    ValueError::TypeMismatch {
        expected: target.name(),
        found: found.type_name(),
    }
}
