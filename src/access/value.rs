use crate::expression::Expr;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Primitive types a row source can report for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Object,
    Boolean,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Char,
    String,
    DateTime,
    Guid,
    Bytes,
    Time,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Object => "Object",
            DataType::Boolean => "Boolean",
            DataType::Byte => "Byte",
            DataType::SByte => "SByte",
            DataType::Int16 => "Int16",
            DataType::UInt16 => "UInt16",
            DataType::Int32 => "Int32",
            DataType::UInt32 => "UInt32",
            DataType::Int64 => "Int64",
            DataType::UInt64 => "UInt64",
            DataType::Float32 => "Float32",
            DataType::Float64 => "Float64",
            DataType::Decimal => "Decimal",
            DataType::Char => "Char",
            DataType::String => "String",
            DataType::DateTime => "DateTime",
            DataType::Guid => "Guid",
            DataType::Bytes => "Bytes",
            DataType::Time => "Time",
        }
    }

    /// Integral types, signed or unsigned
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Byte
                | DataType::SByte
                | DataType::Int16
                | DataType::UInt16
                | DataType::Int32
                | DataType::UInt32
                | DataType::Int64
                | DataType::UInt64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self,
                DataType::Float32 | DataType::Float64 | DataType::Decimal
            )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sub-expression handed to a call as syntax rather than as a value.
#[derive(Clone)]
pub struct QuotedExpr(pub Arc<Expr>);

impl QuotedExpr {
    pub fn expr(&self) -> &Expr {
        &self.0
    }
}

impl PartialEq for QuotedExpr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for QuotedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quoted({:?})", self.0)
    }
}

/// Named, ordered fields of an object in a captured object graph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Overwrites an existing field in place, appends otherwise.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }
}

/// Values flowing out of rows and through predicate evaluation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Char(char),
    String(String),
    DateTime(NaiveDateTime),
    Guid(Uuid),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    List(Vec<Value>),
    Record(Record),
    Expr(QuotedExpr),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the primitive type of this value; composite values report Object
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Byte(_) => Some(DataType::Byte),
            Value::SByte(_) => Some(DataType::SByte),
            Value::Int16(_) => Some(DataType::Int16),
            Value::UInt16(_) => Some(DataType::UInt16),
            Value::Int32(_) => Some(DataType::Int32),
            Value::UInt32(_) => Some(DataType::UInt32),
            Value::Int64(_) => Some(DataType::Int64),
            Value::UInt64(_) => Some(DataType::UInt64),
            Value::Float32(_) => Some(DataType::Float32),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Decimal(_) => Some(DataType::Decimal),
            Value::Char(_) => Some(DataType::Char),
            Value::String(_) => Some(DataType::String),
            Value::DateTime(_) => Some(DataType::DateTime),
            Value::Guid(_) => Some(DataType::Guid),
            Value::Bytes(_) => Some(DataType::Bytes),
            Value::Json(_) | Value::List(_) | Value::Record(_) | Value::Expr(_) => {
                Some(DataType::Object)
            }
        }
    }

    /// Short type label used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Json(_) => "Json",
            Value::List(_) => "List",
            Value::Record(_) => "Record",
            Value::Expr(_) => "Expression",
            other => other.data_type().map_or("Null", |t| t.name()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Render as a JSON document, used for ad-hoc row output
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Byte(v) => Json::from(*v),
            Value::SByte(v) => Json::from(*v),
            Value::Int16(v) => Json::from(*v),
            Value::UInt16(v) => Json::from(*v),
            Value::Int32(v) => Json::from(*v),
            Value::UInt32(v) => Json::from(*v),
            Value::Int64(v) => Json::from(*v),
            Value::UInt64(v) => Json::from(*v),
            Value::Float32(v) => Json::from(*v),
            Value::Float64(v) => Json::from(*v),
            Value::Json(v) => v.clone(),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Record(record) => Json::Object(
                record
                    .fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            other => Json::String(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Byte(v) => write!(f, "{}", v),
            Value::SByte(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d.normalize()),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => f.write_str(s),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Guid(g) => write!(f, "{}", g.hyphenated()),
            Value::Bytes(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Value::Json(v) => write!(f, "{}", v),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Record(record) => {
                write!(f, "{} {{", record.type_name)?;
                for (i, (name, value)) in record.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {} = {}", name, value)?;
                }
                f.write_str(" }")
            }
            Value::Expr(quoted) => write!(f, "{:?}", quoted),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
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
    serde_json::Value => Json,
    Vec<Value> => List,
    Record => Record,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_of_values() {
        assert_eq!(Value::Null.data_type(), None);
        assert_eq!(Value::Int64(1).data_type(), Some(DataType::Int64));
        assert_eq!(Value::from("x").data_type(), Some(DataType::String));
        assert_eq!(Value::List(vec![]).data_type(), Some(DataType::Object));
        assert_eq!(Value::List(vec![]).type_name(), "List");
    }

    #[test]
    fn test_record_set_overwrites_in_place() {
        let mut record = Record::new("Point").with("x", 1).with("y", 2);
        record.set("x", Value::Int32(5));
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields[0], ("x".to_string(), Value::Int32(5)));
        assert_eq!(record.get("y"), Some(&Value::Int32(2)));
        assert_eq!(record.get("z"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float64(10.0).to_string(), "10");
        assert_eq!(
            Value::Decimal(Decimal::new(1050, 2)).to_string(),
            "10.5"
        );
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(
            Value::List(vec![Value::Int32(1), Value::from("a")]).to_string(),
            "[1, a]"
        );
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_string(), "dead");
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Int64(3));
    }

    #[test]
    fn test_to_json() {
        let record = Record::new("User")
            .with("id", 7i64)
            .with("tags", Value::List(vec![Value::from("a")]))
            .with("score", Decimal::new(25, 1));
        assert_eq!(
            Value::Record(record).to_json(),
            serde_json::json!({"id": 7, "tags": ["a"], "score": "2.5"})
        );
    }
}
