//! Static read and conversion policy for column-to-member binding.

use crate::access::{DataType, Value};
use crate::catalog::MemberType;
use std::fmt;

/// Row read operation chosen for a column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadOp {
    /// Untyped read, hands back whatever the source holds
    GetValue,
    GetBoolean,
    GetByte,
    GetInt16,
    GetInt32,
    GetInt64,
    GetFloat,
    GetDouble,
    GetDecimal,
    GetChar,
    GetString,
    GetDateTime,
}

impl ReadOp {
    /// Natural result type of the read
    pub fn result_type(&self) -> DataType {
        match self {
            ReadOp::GetValue => DataType::Object,
            ReadOp::GetBoolean => DataType::Boolean,
            ReadOp::GetByte => DataType::Byte,
            ReadOp::GetInt16 => DataType::Int16,
            ReadOp::GetInt32 => DataType::Int32,
            ReadOp::GetInt64 => DataType::Int64,
            ReadOp::GetFloat => DataType::Float32,
            ReadOp::GetDouble => DataType::Float64,
            ReadOp::GetDecimal => DataType::Decimal,
            ReadOp::GetChar => DataType::Char,
            ReadOp::GetString => DataType::String,
            ReadOp::GetDateTime => DataType::DateTime,
        }
    }

    /// Float, double and decimal reads go through numeric text normalization.
    pub fn normalizes_numeric(&self) -> bool {
        matches!(self, ReadOp::GetFloat | ReadOp::GetDouble | ReadOp::GetDecimal)
    }

    /// Whether a value handed back by the source is what this read produces
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ReadOp::GetValue => true,
            typed => value.data_type() == Some(typed.result_type()),
        }
    }
}

impl fmt::Display for ReadOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How a read result becomes a member value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionPath {
    /// Use the read result as is
    Identity,
    /// Convert into the given type at row time
    Convert(DataType),
}

pub struct ConversionRules;

impl ConversionRules {
    /// Read operation for a database type; `None` when the type cannot be read.
    pub fn read_op(data_type: DataType) -> Option<ReadOp> {
        let op = match data_type {
            DataType::Object
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::SByte => ReadOp::GetValue,
            DataType::Boolean => ReadOp::GetBoolean,
            DataType::Byte => ReadOp::GetByte,
            DataType::Int16 => ReadOp::GetInt16,
            DataType::Int32 => ReadOp::GetInt32,
            DataType::Int64 => ReadOp::GetInt64,
            DataType::Float32 => ReadOp::GetFloat,
            DataType::Float64 => ReadOp::GetDouble,
            DataType::Decimal => ReadOp::GetDecimal,
            DataType::Char => ReadOp::GetChar,
            DataType::String => ReadOp::GetString,
            DataType::DateTime => ReadOp::GetDateTime,
            DataType::Guid | DataType::Bytes | DataType::Time => return None,
        };
        Some(op)
    }

    /// Conversion from a read result of type `source` to a member of type
    /// `member`; `None` when the pair is not supported.
    pub fn conversion(source: DataType, member: MemberType) -> Option<ConversionPath> {
        let target = member.as_data_type()?;
        if target == DataType::Object || target == source {
            return Some(ConversionPath::Identity);
        }

        let allowed = match source {
            DataType::Object => true,
            DataType::String => !matches!(target, DataType::Bytes | DataType::Time),
            DataType::Boolean => target.is_numeric() || target == DataType::String,
            DataType::Char => target.is_integer() || target == DataType::String,
            DataType::DateTime => target == DataType::String,
            s if s.is_numeric() => {
                target.is_numeric()
                    || matches!(target, DataType::Boolean | DataType::String)
                    || (s.is_integer() && target == DataType::Char)
            }
            _ => false,
        };
        allowed.then_some(ConversionPath::Convert(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ops() {
        assert_eq!(ConversionRules::read_op(DataType::Int64), Some(ReadOp::GetInt64));
        assert_eq!(ConversionRules::read_op(DataType::UInt32), Some(ReadOp::GetValue));
        assert_eq!(ConversionRules::read_op(DataType::Guid), None);
        assert!(ReadOp::GetDouble.normalizes_numeric());
        assert!(!ReadOp::GetInt32.normalizes_numeric());
    }

    #[test]
    fn test_typed_read_accepts_matching_variant_only() {
        assert!(ReadOp::GetInt64.accepts(&Value::Int64(1)));
        assert!(!ReadOp::GetInt64.accepts(&Value::Int32(1)));
        assert!(!ReadOp::GetString.accepts(&Value::Null));
        assert!(ReadOp::GetValue.accepts(&Value::Null));
    }

    #[test]
    fn test_conversion_table() {
        use ConversionPath::*;
        assert_eq!(
            ConversionRules::conversion(DataType::Int64, MemberType::Int64),
            Some(Identity)
        );
        assert_eq!(
            ConversionRules::conversion(DataType::Int16, MemberType::Int64),
            Some(Convert(DataType::Int64))
        );
        assert_eq!(
            ConversionRules::conversion(DataType::String, MemberType::Guid),
            Some(Convert(DataType::Guid))
        );
        assert_eq!(
            ConversionRules::conversion(DataType::DateTime, MemberType::String),
            Some(Convert(DataType::String))
        );
        assert_eq!(
            ConversionRules::conversion(DataType::Float64, MemberType::Object),
            Some(Identity)
        );
        assert_eq!(ConversionRules::conversion(DataType::Int64, MemberType::Guid), None);
        assert_eq!(ConversionRules::conversion(DataType::DateTime, MemberType::Int32), None);
        assert_eq!(
            ConversionRules::conversion(DataType::String, MemberType::Custom("Tags")),
            None
        );
    }
}
