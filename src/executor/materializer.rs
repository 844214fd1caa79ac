use crate::access::{RowMap, RowSource};
use crate::binding::BindResult;
use crate::catalog::TargetDescriptor;
use crate::executor::{read_row_map, RowMaterializer};
use log::trace;

impl RowMaterializer<'_> {
    /// Bind the first row of the current result set, if any.
    pub fn first<T: 'static, S: RowSource + ?Sized>(
        &self,
        target: &TargetDescriptor<T>,
        source: &mut S,
    ) -> BindResult<Option<T>> {
        let schema = source.schema()?;
        let item = if source.read()? {
            let binder = self.compiler.compile(target, &schema)?;
            Some(binder.bind(&*source)?)
        } else {
            None
        };
        finalize(source)?;
        Ok(item)
    }

    /// Bind every row of the current result set, in read order.
    pub fn list<T: 'static, S: RowSource + ?Sized>(
        &self,
        target: &TargetDescriptor<T>,
        source: &mut S,
    ) -> BindResult<Vec<T>> {
        let schema = source.schema()?;
        let binder = self.compiler.compile(target, &schema)?;
        let mut items = Vec::new();
        while source.read()? {
            items.push(binder.bind(&*source)?);
        }
        finalize(source)?;
        Ok(items)
    }

    /// First row as a column-name map, without type coercion.
    pub fn dictionary_one<S: RowSource + ?Sized>(&self, source: &mut S) -> BindResult<Option<RowMap>> {
        let schema = source.schema()?;
        let mut row = None;
        if !schema.is_empty() && source.read()? {
            row = Some(read_row_map(&schema, &*source)?);
        }
        finalize(source)?;
        Ok(row)
    }

    /// Every row as a column-name map, without type coercion.
    pub fn dictionary_all<S: RowSource + ?Sized>(&self, source: &mut S) -> BindResult<Vec<RowMap>> {
        let schema = source.schema()?;
        let mut rows = Vec::new();
        if !schema.is_empty() {
            while source.read()? {
                rows.push(read_row_map(&schema, &*source)?);
            }
        }
        finalize(source)?;
        Ok(rows)
    }
}

fn finalize<S: RowSource + ?Sized>(source: &mut S) -> BindResult<()> {
    source.advance_result_or_close()?;
    trace!("result set finalized");
    Ok(())
}
