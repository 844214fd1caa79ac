//! Member metadata for binding targets.

use crate::access::{DataType, Value};
use crate::catalog::FromValue;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Declared type of a target member, with any nullable wrapper removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberType {
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
    /// A type outside the primitive set, only bindable through JSON
    Custom(&'static str),
}

impl MemberType {
    pub fn as_data_type(&self) -> Option<DataType> {
        let data_type = match self {
            MemberType::Object => DataType::Object,
            MemberType::Boolean => DataType::Boolean,
            MemberType::Byte => DataType::Byte,
            MemberType::SByte => DataType::SByte,
            MemberType::Int16 => DataType::Int16,
            MemberType::UInt16 => DataType::UInt16,
            MemberType::Int32 => DataType::Int32,
            MemberType::UInt32 => DataType::UInt32,
            MemberType::Int64 => DataType::Int64,
            MemberType::UInt64 => DataType::UInt64,
            MemberType::Float32 => DataType::Float32,
            MemberType::Float64 => DataType::Float64,
            MemberType::Decimal => DataType::Decimal,
            MemberType::Char => DataType::Char,
            MemberType::String => DataType::String,
            MemberType::DateTime => DataType::DateTime,
            MemberType::Guid => DataType::Guid,
            MemberType::Bytes => DataType::Bytes,
            MemberType::Custom(_) => return None,
        };
        Some(data_type)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MemberType::Custom(name) => *name,
            other => other.as_data_type().map_or("Object", |t| t.name()),
        }
    }

    /// Zero value of the bare type; reference-like types have none
    pub fn zero_value(&self) -> Value {
        match self {
            MemberType::Boolean => Value::Boolean(false),
            MemberType::Byte => Value::Byte(0),
            MemberType::SByte => Value::SByte(0),
            MemberType::Int16 => Value::Int16(0),
            MemberType::UInt16 => Value::UInt16(0),
            MemberType::Int32 => Value::Int32(0),
            MemberType::UInt32 => Value::UInt32(0),
            MemberType::Int64 => Value::Int64(0),
            MemberType::UInt64 => Value::UInt64(0),
            MemberType::Float32 => Value::Float32(0.0),
            MemberType::Float64 => Value::Float64(0.0),
            MemberType::Decimal => Value::Decimal(Decimal::ZERO),
            MemberType::Char => Value::Char('\0'),
            MemberType::DateTime => Value::DateTime(NaiveDateTime::default()),
            MemberType::Guid => Value::Guid(Uuid::nil()),
            MemberType::Object | MemberType::String | MemberType::Bytes | MemberType::Custom(_) => {
                Value::Null
            }
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Assigns a bound value to a member of `T`
pub type Setter<T> = Arc<dyn Fn(&mut T, Value) -> anyhow::Result<()> + Send + Sync>;

/// One assignable member or one positional constructor slot of a target
pub struct MemberDescriptor<T> {
    pub name: String,
    pub declared_type: MemberType,
    pub is_nullable_wrapper: bool,
    pub is_json_encoded: bool,
    pub is_positional_slot: bool,
    setter: Option<Setter<T>>,
}

impl<T> MemberDescriptor<T> {
    pub fn new(name: impl Into<String>, declared_type: MemberType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            is_nullable_wrapper: false,
            is_json_encoded: false,
            is_positional_slot: false,
            setter: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable_wrapper = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.is_json_encoded = true;
        self
    }

    pub fn slot(mut self) -> Self {
        self.is_positional_slot = true;
        self
    }

    pub fn with_setter(
        mut self,
        setter: impl Fn(&mut T, Value) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Member with a typed setter; the bound value is converted with [`FromValue`].
    pub fn assign<V, F>(name: impl Into<String>, declared_type: MemberType, set: F) -> Self
    where
        T: 'static,
        V: FromValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::new(name, declared_type).with_setter(move |target, value| {
            set(target, V::from_value(value)?);
            Ok(())
        })
    }

    pub fn setter(&self) -> Option<&Setter<T>> {
        self.setter.as_ref()
    }

    /// Value substituted for a null column
    pub fn zero_value(&self) -> Value {
        if self.is_nullable_wrapper {
            Value::Null
        } else {
            self.declared_type.zero_value()
        }
    }
}

impl<T> Clone for MemberDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            declared_type: self.declared_type,
            is_nullable_wrapper: self.is_nullable_wrapper,
            is_json_encoded: self.is_json_encoded,
            is_positional_slot: self.is_positional_slot,
            setter: self.setter.clone(),
        }
    }
}

impl<T> fmt::Debug for MemberDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("is_nullable_wrapper", &self.is_nullable_wrapper)
            .field("is_json_encoded", &self.is_json_encoded)
            .field("is_positional_slot", &self.is_positional_slot)
            .field("has_setter", &self.setter.is_some())
            .finish()
    }
}
