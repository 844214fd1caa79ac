//! Conversion from bound values into Rust member types.

use crate::access::{convert, DataType, Value, ValueError, ValueResult, DEFAULT_DATETIME_FORMATS};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// A Rust type a member setter or scalar target can receive.
///
/// `Value::Null` becomes the type's default; `Option<T>` maps it to `None`.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> ValueResult<Self>;
}

macro_rules! from_value_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> ValueResult<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        Value::Null => Ok(<$ty>::default()),
                        other => match convert(other, DataType::$variant, DEFAULT_DATETIME_FORMATS)? {
                            Value::$variant(v) => Ok(v),
                            other => Err(ValueError::TypeMismatch {
                                expected: DataType::$variant.name(),
                                found: other.type_name(),
                            }),
                        },
                    }
                }
            }
        )*
    };
}

from_value_primitive! {
    bool => Boolean,
    u8 => Byte,
    i8 => SByte,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    Decimal => Decimal,
    char => Char,
    String => String,
    NaiveDateTime => DateTime,
    Uuid => Guid,
    Vec<u8> => Bytes,
}

impl FromValue for Value {
    fn from_value(value: Value) -> ValueResult<Self> {
        Ok(value)
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> ValueResult<Self> {
        Ok(match value {
            Value::Json(json) => json,
            other => other.to_json(),
        })
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> ValueResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A member stored as a JSON document in a text column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned + Default> FromValue for Json<T> {
    fn from_value(value: Value) -> ValueResult<Self> {
        match value {
            Value::Null => Ok(Json(T::default())),
            Value::Json(json) => Ok(Json(serde_json::from_value(json)?)),
            Value::String(text) => Ok(Json(serde_json::from_str(&text)?)),
            other => Err(ValueError::TypeMismatch {
                expected: "Json",
                found: other.type_name(),
            }),
        }
    }
}
