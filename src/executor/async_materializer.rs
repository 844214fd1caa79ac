//! Async materialization shapes.
//!
//! Suspension happens only while fetching the schema, advancing the cursor or
//! finalizing the source. Row construction itself never awaits.

use crate::access::{AsyncRowSource, RowMap};
use crate::binding::BindResult;
use crate::catalog::TargetDescriptor;
use crate::executor::{read_row_map, RowMaterializer};
use log::trace;

impl RowMaterializer<'_> {
    pub async fn first_async<T: 'static, S: AsyncRowSource>(
        &self,
        target: &TargetDescriptor<T>,
        source: &mut S,
    ) -> BindResult<Option<T>> {
        let schema = source.schema().await?;
        let item = if source.read().await? {
            let binder = self.compiler.compile(target, &schema)?;
            Some(binder.bind(&*source)?)
        } else {
            None
        };
        finalize(source).await?;
        Ok(item)
    }

    pub async fn list_async<T: 'static, S: AsyncRowSource>(
        &self,
        target: &TargetDescriptor<T>,
        source: &mut S,
    ) -> BindResult<Vec<T>> {
        let schema = source.schema().await?;
        let binder = self.compiler.compile(target, &schema)?;
        let mut items = Vec::new();
        while source.read().await? {
            items.push(binder.bind(&*source)?);
        }
        finalize(source).await?;
        Ok(items)
    }

    pub async fn dictionary_one_async<S: AsyncRowSource>(
        &self,
        source: &mut S,
    ) -> BindResult<Option<RowMap>> {
        let schema = source.schema().await?;
        let mut row = None;
        if !schema.is_empty() && source.read().await? {
            row = Some(read_row_map(&schema, &*source)?);
        }
        finalize(source).await?;
        Ok(row)
    }

    pub async fn dictionary_all_async<S: AsyncRowSource>(
        &self,
        source: &mut S,
    ) -> BindResult<Vec<RowMap>> {
        let schema = source.schema().await?;
        let mut rows = Vec::new();
        if !schema.is_empty() {
            while source.read().await? {
                rows.push(read_row_map(&schema, &*source)?);
            }
        }
        finalize(source).await?;
        Ok(rows)
    }
}

async fn finalize<S: AsyncRowSource>(source: &mut S) -> BindResult<()> {
    source.advance_result_or_close().await?;
    trace!("result set finalized");
    Ok(())
}
