//! Binding error types.

use crate::access::{DataType, ValueError};
use crate::catalog::MemberType;
use thiserror::Error;

/// Errors raised while compiling a binder or applying it to a row.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("Column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: DataType },

    #[error("Column '{column}': no conversion from {from} to member type {to}")]
    UnsupportedConversion {
        column: String,
        from: DataType,
        to: MemberType,
    },

    #[error("Column '{column}' of type {data_type} cannot feed a JSON member")]
    NonJsonColumnForJsonMember { column: String, data_type: DataType },

    #[error("Placeholder column '{column}' names slot {slot} but the target has {arity} slots")]
    PlaceholderSlotOutOfRange {
        column: String,
        slot: usize,
        arity: usize,
    },

    #[error("Member '{member}' matched by column '{column}' has no setter")]
    MissingSetter { column: String, member: String },

    #[error("Result set has no column to bind {target}")]
    NoColumns { target: String },

    #[error("Column '{column}': expected a {expected} value but the row holds {found}")]
    ColumnRead {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Column '{column}': {source}")]
    Conversion {
        column: String,
        #[source]
        source: ValueError,
    },

    #[error("Column '{column}': invalid JSON document: {reason}")]
    JsonDecode { column: String, reason: String },

    #[error("Column '{column}': member assignment failed: {reason}")]
    Member { column: String, reason: String },

    #[error("Cannot construct {target}: {reason}")]
    Construct { target: String, reason: String },

    #[error("Cached binder for {fingerprint} was built for another target type")]
    CacheTypeMismatch { fingerprint: String },

    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

/// Result type for binding operations.
pub type BindResult<T> = Result<T, BindError>;
