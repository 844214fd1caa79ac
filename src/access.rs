//! Access layer for result rows.
//!
//! This module provides the runtime side of a query result:
//!
//! - **Value**: dynamically typed cell and object-graph values
//! - **DataType**: primitive types a row source reports for its columns
//! - **RowSchema**: ordered column descriptors of one result set
//! - **RowSource / AsyncRowSource**: sequential cursors over result sets
//! - **RowMap**: ordered column-name to value mapping for ad-hoc reads
//!
//! Conversions between values follow one policy shared by the binder and the
//! expression evaluator, see [`convert`].

pub mod convert;
pub mod error;
pub mod memory;
pub mod row;
pub mod value;

pub use convert::{convert, normalize_numeric_text, DEFAULT_DATETIME_FORMATS};
pub use error::{ValueError, ValueResult};
pub use memory::MemoryRowSource;
pub use row::{AsyncRowSource, ColumnDescriptor, RowMap, RowRecord, RowSchema, RowSource};
pub use value::{DataType, QuotedExpr, Record, Value};
