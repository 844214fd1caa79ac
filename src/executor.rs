//! Executor layer: drives row sources through compiled binders.
//!
//! The [`RowMaterializer`] produces one object, a list of objects, or ad-hoc
//! [`RowMap`]s from the current result set of a row source. Every shape
//! finalizes the source when done: the next result set becomes current, or the
//! source is closed when there is none.
//!
//! Blocking shapes live in [`materializer`], their async twins in
//! [`async_materializer`].

use crate::access::{RowMap, RowRecord, RowSchema};
use crate::binding::{BindResult, EntityBindingCompiler};

pub mod async_materializer;
pub mod materializer;

/// Materializes rows using binders from a compiler
#[derive(Clone, Copy)]
pub struct RowMaterializer<'c> {
    compiler: &'c EntityBindingCompiler,
}

impl<'c> RowMaterializer<'c> {
    pub fn new(compiler: &'c EntityBindingCompiler) -> Self {
        Self { compiler }
    }

    /// Materializer over the process-wide compiler
    pub fn global() -> RowMaterializer<'static> {
        RowMaterializer::new(EntityBindingCompiler::global())
    }

    pub fn compiler(&self) -> &'c EntityBindingCompiler {
        self.compiler
    }
}

/// Copy the current row into a name-to-value map, nulls as `Value::Null`
pub(crate) fn read_row_map<R: RowRecord + ?Sized>(
    schema: &RowSchema,
    record: &R,
) -> BindResult<RowMap> {
    let mut row = RowMap::new();
    for (ordinal, column) in schema.iter().enumerate() {
        let value = if record.is_null(ordinal)? {
            crate::access::Value::Null
        } else {
            record.value(ordinal)?
        };
        row.insert(column.name.clone(), value);
    }
    Ok(row)
}
