//! Value conversion error types.

use thiserror::Error;

/// Errors raised while coercing a value into another type.
#[derive(Error, Debug)]
pub enum ValueError {
    #[error("cannot convert {found} value to {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} is out of range for {target}")]
    Overflow { value: String, target: &'static str },

    #[error("text '{text}' is not a valid {target}")]
    Parse { text: String, target: &'static str },

    #[error("null value cannot be converted to {target}")]
    UnexpectedNull { target: &'static str },

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for value conversions.
pub type ValueResult<T> = Result<T, ValueError>;
