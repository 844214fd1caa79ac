use crate::access::RowSchema;
use crate::catalog::TargetDescriptor;
use std::fmt::{self, Write};

/// Cache key of one (target shape, column shape) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new<T>(target: &TargetDescriptor<T>, schema: &RowSchema) -> Self {
        let mut key = format!(
            "{}|{}|{}_DataBindingExpBuild_{}",
            std::any::type_name::<T>(),
            target.identity(),
            target.kind(),
            schema.len()
        );
        for column in schema.iter() {
            // Length prefix keeps names containing separators from colliding.
            let _ = write!(
                key,
                "|{}:{}_{}_{}",
                column.name.len(),
                column.name,
                column.data_type,
                if column.is_nullable() { "True" } else { "False" }
            );
        }
        Fingerprint(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{ColumnDescriptor, DataType};

    struct Row;

    fn schema(nullable: Option<bool>) -> RowSchema {
        let mut id = ColumnDescriptor::new("id", DataType::Int64);
        id.allows_null = nullable;
        RowSchema::new(vec![id, ColumnDescriptor::new("label", DataType::String)])
    }

    #[test]
    fn test_identical_shapes_share_fingerprint() {
        let target = TargetDescriptor::new(|| Row);
        assert_eq!(
            Fingerprint::new(&target, &schema(Some(false))),
            Fingerprint::new(&target, &schema(Some(false)))
        );
    }

    #[test]
    fn test_shape_differences_change_fingerprint() {
        let target = TargetDescriptor::new(|| Row);
        let base = Fingerprint::new(&target, &schema(Some(false)));
        assert_ne!(base, Fingerprint::new(&target, &schema(Some(true))));
        assert_ne!(
            base,
            Fingerprint::new(&target.clone().with_identity("Other"), &schema(Some(false)))
        );
        assert_ne!(
            base,
            Fingerprint::new(
                &target,
                &RowSchema::new(vec![ColumnDescriptor::new("id", DataType::Int32)])
            )
        );
    }

    #[test]
    fn test_unknown_nullability_matches_nullable() {
        let target = TargetDescriptor::new(|| Row);
        assert_eq!(
            Fingerprint::new(&target, &schema(None)),
            Fingerprint::new(&target, &schema(Some(true)))
        );
    }
}
