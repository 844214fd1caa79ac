//! Predicate and selector evaluation.
//!
//! This module provides:
//! - The expression AST and its static types
//! - Descriptor tables standing in for member, method and constructor lookup
//! - An evaluator resolving member chains against captured object graphs
//! - Call interception and the catalogue of well-known SQL marker functions

pub mod error;
pub mod eval;
pub mod expr;
pub mod interceptor;
pub mod operator;
pub mod reflect;
pub mod sql_func;

pub use error::{EvalResult, EvaluationError};
pub use eval::{evaluate, EvaluationContext, EvaluationFrame, ExpressionEvaluator};
pub use expr::{Expr, MethodCall, NewExpr, StaticType};
pub use interceptor::{CallHooks, CallInterceptor};
pub use operator::{BinaryOperator, UnaryOperator};
pub use reflect::{ConstructorRef, MemberRef, MethodRef};
pub use sql_func::{SqlFunction, SQL_FUNCTION_TYPE};
