use crate::access::{DataType, Value};
use std::future::Future;

/// Describes one column of a result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: DataType,
    /// `None` when the source cannot tell
    pub allows_null: Option<bool>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            allows_null: None,
        }
    }

    pub fn nullable(mut self, allows_null: bool) -> Self {
        self.allows_null = Some(allows_null);
        self
    }

    /// Unknown nullability is treated as nullable.
    pub fn is_nullable(&self) -> bool {
        self.allows_null.unwrap_or(true)
    }
}

/// Ordered column descriptors of the current result set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSchema {
    columns: Vec<ColumnDescriptor>,
}

impl RowSchema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, ordinal: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(ordinal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    /// Case-insensitive lookup of a column ordinal by name
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Cell access on the row a source is currently positioned on
pub trait RowRecord {
    fn is_null(&self, ordinal: usize) -> anyhow::Result<bool>;

    /// Read the cell as the column's natural value
    fn value(&self, ordinal: usize) -> anyhow::Result<Value>;
}

/// A blocking, forward-only cursor over one or more result sets
pub trait RowSource: RowRecord {
    fn schema(&mut self) -> anyhow::Result<RowSchema>;

    /// Advance to the next row; `false` once the current result set is exhausted.
    fn read(&mut self) -> anyhow::Result<bool>;

    /// Advance to the next result set; `false` when there is none.
    fn next_result(&mut self) -> anyhow::Result<bool>;

    fn close(&mut self) -> anyhow::Result<()>;

    /// Move past the consumed result set, closing the source after the last one.
    fn advance_result_or_close(&mut self) -> anyhow::Result<()> {
        if !self.next_result()? {
            self.close()?;
        }
        Ok(())
    }
}

/// Asynchronous counterpart of [`RowSource`]
pub trait AsyncRowSource: RowRecord + Send {
    fn schema(&mut self) -> impl Future<Output = anyhow::Result<RowSchema>> + Send;

    fn read(&mut self) -> impl Future<Output = anyhow::Result<bool>> + Send;

    fn next_result(&mut self) -> impl Future<Output = anyhow::Result<bool>> + Send;

    fn close(&mut self) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn advance_result_or_close(&mut self) -> impl Future<Output = anyhow::Result<()>> + Send {
        async move {
            if !self.next_result().await? {
                self.close().await?;
            }
            Ok(())
        }
    }
}

/// Column-name to value mapping of a single row, in column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowMap {
    entries: Vec<(String, Value)>,
}

impl RowMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any earlier entry with the same name in place
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl IntoIterator for RowMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_nullability_is_nullable() {
        let column = ColumnDescriptor::new("id", DataType::Int64);
        assert!(column.is_nullable());
        assert!(!column.nullable(false).is_nullable());
    }

    #[test]
    fn test_ordinal_lookup_ignores_case() {
        let schema = RowSchema::new(vec![
            ColumnDescriptor::new("Id", DataType::Int64),
            ColumnDescriptor::new("Name", DataType::String),
        ]);
        assert_eq!(schema.ordinal_of("name"), Some(1));
        assert_eq!(schema.ordinal_of("missing"), None);
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn test_row_map_keeps_order_and_replaces_duplicates() {
        let mut row = RowMap::new();
        row.insert("b", Value::Int32(1));
        row.insert("a", Value::Int32(2));
        row.insert("b", Value::Int32(3));
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(row.get("b"), Some(&Value::Int32(3)));
        assert_eq!(row.to_json(), serde_json::json!({"b": 3, "a": 2}));
    }
}
