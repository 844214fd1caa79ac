//! Row-to-object binding and predicate value extraction.
//!
//! Two engines live here:
//!
//! - **Binding**: a [`RowSchema`](access::RowSchema) plus a
//!   [`TargetDescriptor`](catalog::TargetDescriptor) is compiled once into a
//!   reusable [`Binder`](binding::Binder), cached per fingerprint, and driven
//!   over a row source by the [`RowMaterializer`](executor::RowMaterializer).
//! - **Evaluation**: the [`ExpressionEvaluator`](expression::ExpressionEvaluator)
//!   walks a predicate tree and resolves captured values into concrete
//!   parameters.

pub mod access;
pub mod binding;
pub mod catalog;
pub mod config;
pub mod executor;
pub mod expression;

pub use access::{ColumnDescriptor, DataType, RowMap, RowSchema, RowSource, Value};
pub use binding::{BindError, Binder, BindingCache, EntityBindingCompiler};
pub use catalog::{MemberDescriptor, MemberType, TargetDescriptor};
pub use config::BindingConfig;
pub use executor::RowMaterializer;
pub use expression::{Expr, ExpressionEvaluator};
