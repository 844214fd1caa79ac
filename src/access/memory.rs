//! In-memory row source.

use crate::access::{AsyncRowSource, RowRecord, RowSchema, RowSource, Value};
use anyhow::{bail, Result};
use std::future::{ready, Future};

/// A row source over materialized result sets, usable from blocking and async
/// code alike
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    result_sets: Vec<(RowSchema, Vec<Vec<Value>>)>,
    current_set: usize,
    current_row: Option<usize>,
    closed: bool,
    next_result_calls: usize,
}

impl MemoryRowSource {
    pub fn new(schema: RowSchema, rows: Vec<Vec<Value>>) -> Self {
        Self::default().with_result(schema, rows)
    }

    /// Append another result set after the existing ones
    pub fn with_result(mut self, schema: RowSchema, rows: Vec<Vec<Value>>) -> Self {
        self.result_sets.push((schema, rows));
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn next_result_calls(&self) -> usize {
        self.next_result_calls
    }

    fn current(&self, ordinal: usize) -> Result<&Value> {
        if self.closed {
            bail!("row source is closed");
        }
        let Some(row) = self.current_row else {
            bail!("row source is not positioned on a row");
        };
        let Some((_, rows)) = self.result_sets.get(self.current_set) else {
            bail!("no current result set");
        };
        match rows.get(row).and_then(|cells| cells.get(ordinal)) {
            Some(value) => Ok(value),
            None => bail!("column ordinal {} is out of range", ordinal),
        }
    }
}

impl RowRecord for MemoryRowSource {
    fn is_null(&self, ordinal: usize) -> Result<bool> {
        Ok(self.current(ordinal)?.is_null())
    }

    fn value(&self, ordinal: usize) -> Result<Value> {
        self.current(ordinal).cloned()
    }
}

impl RowSource for MemoryRowSource {
    fn schema(&mut self) -> Result<RowSchema> {
        if self.closed {
            bail!("row source is closed");
        }
        Ok(self
            .result_sets
            .get(self.current_set)
            .map(|(schema, _)| schema.clone())
            .unwrap_or_default())
    }

    fn read(&mut self) -> Result<bool> {
        if self.closed {
            bail!("row source is closed");
        }
        let Some((_, rows)) = self.result_sets.get(self.current_set) else {
            return Ok(false);
        };
        let next = self.current_row.map_or(0, |row| row + 1);
        if next < rows.len() {
            self.current_row = Some(next);
            Ok(true)
        } else {
            self.current_row = None;
            Ok(false)
        }
    }

    fn next_result(&mut self) -> Result<bool> {
        if self.closed {
            bail!("row source is closed");
        }
        self.next_result_calls += 1;
        self.current_row = None;
        if self.current_set + 1 < self.result_sets.len() {
            self.current_set += 1;
            Ok(true)
        } else {
            self.current_set = self.result_sets.len();
            Ok(false)
        }
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.current_row = None;
        Ok(())
    }
}

impl AsyncRowSource for MemoryRowSource {
    fn schema(&mut self) -> impl Future<Output = Result<RowSchema>> + Send {
        ready(RowSource::schema(self))
    }

    fn read(&mut self) -> impl Future<Output = Result<bool>> + Send {
        ready(RowSource::read(self))
    }

    fn next_result(&mut self) -> impl Future<Output = Result<bool>> + Send {
        ready(RowSource::next_result(self))
    }

    fn close(&mut self) -> impl Future<Output = Result<()>> + Send {
        ready(RowSource::close(self))
    }
}
