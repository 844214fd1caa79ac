//! Error types for expression evaluation.

use crate::access::ValueError;
use thiserror::Error;

/// Errors that can occur during expression evaluation
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// A member is read off the predicate's own input parameter
    #[error("Cannot evaluate member '{member}' of parameter '{parameter}' outside of query translation")]
    InvalidParameterDereference { member: String, parameter: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow in '{operator}'")]
    ArithmeticOverflow { operator: &'static str },

    #[error("Invalid cast: {0}")]
    InvalidCast(#[from] ValueError),

    #[error("Index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("{found} value cannot be indexed")]
    NotIndexable { found: &'static str },

    #[error("Invocation of '{target}' failed: {reason}")]
    Invocation { target: String, reason: String },

    #[error("Member '{member}' cannot be assigned")]
    MissingSetter { member: String },

    #[error("List initializer needs a list, constructor produced {found}")]
    NotAList { found: &'static str },
}

/// Result type for expression evaluation
pub type EvalResult<T> = Result<T, EvaluationError>;

impl EvaluationError {
    pub fn invocation(target: impl Into<String>, reason: impl ToString) -> Self {
        EvaluationError::Invocation {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}
