//! Binder compilation.

use crate::access::{ColumnDescriptor, DataType, RowSchema};
use crate::binding::binder::{ColumnPlan, Construction, Sink};
use crate::binding::{
    BindError, BindResult, Binder, BindingCache, CacheStore, CachedBinder, ConversionPath,
    ConversionRules, Fingerprint, JsonCodec, SerdeJsonCodec,
};
use crate::catalog::{MemberDescriptor, MemberType, TargetDescriptor, TargetFactory, TargetKind};
use crate::config::BindingConfig;
use log::{debug, trace, warn};
use std::sync::{Arc, OnceLock};

/// Builds binders for (target, schema) pairs and caches them by fingerprint
pub struct EntityBindingCompiler {
    cache: Arc<dyn CacheStore>,
    codec: Arc<dyn JsonCodec>,
    config: BindingConfig,
}

static GLOBAL: OnceLock<EntityBindingCompiler> = OnceLock::new();

impl EntityBindingCompiler {
    /// Compiler with its own private cache
    pub fn new(config: BindingConfig) -> Self {
        Self {
            cache: Arc::new(BindingCache::new()),
            codec: Arc::new(SerdeJsonCodec),
            config,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn JsonCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Process-wide compiler over [`BindingCache::global`] with default settings
    pub fn global() -> &'static EntityBindingCompiler {
        GLOBAL.get_or_init(|| {
            EntityBindingCompiler::new(BindingConfig::default()).with_cache(BindingCache::global())
        })
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    pub fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }

    /// Get the binder for `target` over `schema`, compiling it on first use.
    ///
    /// Structurally identical pairs return the same `Arc`. Compilation errors
    /// are returned to the caller and nothing is cached for the pair.
    pub fn compile<T: 'static>(
        &self,
        target: &TargetDescriptor<T>,
        schema: &RowSchema,
    ) -> BindResult<Arc<Binder<T>>> {
        let fingerprint = Fingerprint::new(target, schema);
        let entry = self.cache.get_or_compute(&fingerprint, &mut || {
            match self.build(target, schema, &fingerprint) {
                Ok(binder) => {
                    debug!(
                        "compiled binder for {} ({} columns): {}",
                        target.identity(),
                        schema.len(),
                        fingerprint
                    );
                    Ok(Arc::new(binder) as CachedBinder)
                }
                Err(e) => {
                    warn!("failed to compile binder for {}: {}", target.identity(), e);
                    Err(e)
                }
            }
        })?;

        entry
            .downcast::<Binder<T>>()
            .map_err(|_| BindError::CacheTypeMismatch {
                fingerprint: fingerprint.to_string(),
            })
    }

    fn build<T>(
        &self,
        target: &TargetDescriptor<T>,
        schema: &RowSchema,
        fingerprint: &Fingerprint,
    ) -> BindResult<Binder<T>> {
        let kind = target.kind();
        let mut plans = Vec::new();
        let mut setters = Vec::new();

        if kind == TargetKind::Scalar {
            let (Some(column), Some(member)) = (schema.column(0), target.members().first()) else {
                return Err(BindError::NoColumns {
                    target: target.identity().to_string(),
                });
            };
            plans.push(self.plan_column(0, column, member, Sink::Scalar)?);
        } else {
            for (ordinal, column) in schema.iter().enumerate() {
                match target.find_member(&column.name) {
                    Some((index, member)) => {
                        let sink = if kind == TargetKind::Positional {
                            Sink::Slot(index)
                        } else {
                            let setter = member.setter().ok_or_else(|| BindError::MissingSetter {
                                column: column.name.clone(),
                                member: member.name.clone(),
                            })?;
                            setters.push(setter.clone());
                            Sink::Member(setters.len() - 1)
                        };
                        plans.push(self.plan_column(ordinal, column, member, sink)?);
                    }
                    None if kind == TargetKind::Positional => {
                        if let Some(slot) = self.config.placeholder_slot(&column.name) {
                            if slot >= target.arity() {
                                return Err(BindError::PlaceholderSlotOutOfRange {
                                    column: column.name.clone(),
                                    slot,
                                    arity: target.arity(),
                                });
                            }
                            trace!("column '{}' keeps slot {} at its default", column.name, slot);
                        }
                    }
                    None => trace!("column '{}' has no matching member", column.name),
                }
            }
        }

        let construction = match target.factory() {
            TargetFactory::Members(factory) => Construction::Members {
                factory: factory.clone(),
                setters,
            },
            TargetFactory::Positional(construct) => Construction::Positional {
                construct: construct.clone(),
                defaults: target.members().iter().map(MemberDescriptor::zero_value).collect(),
            },
            TargetFactory::Scalar(factory) => Construction::Scalar(factory.clone()),
        };

        Ok(Binder::new(
            target.identity().to_string(),
            fingerprint.clone(),
            plans,
            construction,
            self.codec.clone(),
            self.config.datetime_formats.clone(),
        ))
    }

    fn plan_column<T>(
        &self,
        ordinal: usize,
        column: &ColumnDescriptor,
        member: &MemberDescriptor<T>,
        sink: Sink,
    ) -> BindResult<ColumnPlan> {
        let read = ConversionRules::read_op(column.data_type).ok_or_else(|| {
            BindError::UnsupportedColumnType {
                column: column.name.clone(),
                data_type: column.data_type,
            }
        })?;
        let source = read.result_type();

        let (json, normalize, conversion) = if member.is_json_encoded {
            if source != DataType::String {
                return Err(BindError::NonJsonColumnForJsonMember {
                    column: column.name.clone(),
                    data_type: column.data_type,
                });
            }
            (true, false, ConversionPath::Identity)
        } else {
            let normalize = read.normalizes_numeric() && member.declared_type != MemberType::Object;
            let from = if normalize { DataType::String } else { source };
            let conversion = ConversionRules::conversion(from, member.declared_type).ok_or_else(
                || BindError::UnsupportedConversion {
                    column: column.name.clone(),
                    from: column.data_type,
                    to: member.declared_type,
                },
            )?;
            (false, normalize, conversion)
        };

        Ok(ColumnPlan {
            ordinal,
            column: column.name.clone(),
            member_type: member.declared_type,
            read,
            json,
            normalize,
            conversion,
            null_guard: column.is_nullable(),
            zero: member.zero_value(),
            sink,
        })
    }
}

impl Default for EntityBindingCompiler {
    fn default() -> Self {
        Self::new(BindingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{MemoryRowSource, RowSource, Value};
    use crate::catalog::Json;
    use rust_decimal::Decimal;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq)]
    struct Order {
        id: i64,
        total: Decimal,
        note: Option<String>,
    }

    fn order_target() -> TargetDescriptor<Order> {
        TargetDescriptor::new(Order::default)
            .member("Id", MemberType::Int64, |o: &mut Order, v: i64| o.id = v)
            .member("Total", MemberType::Decimal, |o: &mut Order, v: Decimal| {
                o.total = v
            })
            .with_member(
                MemberDescriptor::assign("Note", MemberType::String, |o: &mut Order, v: Option<String>| {
                    o.note = v
                })
                .nullable(),
            )
    }

    fn bind_first<T: 'static>(
        compiler: &EntityBindingCompiler,
        target: &TargetDescriptor<T>,
        schema: RowSchema,
        row: Vec<Value>,
    ) -> BindResult<T> {
        let mut source = MemoryRowSource::new(schema.clone(), vec![row]);
        assert!(source.read().unwrap());
        compiler.compile(target, &schema)?.bind(&source)
    }

    #[test]
    fn test_binds_members_with_conversion() {
        let compiler = EntityBindingCompiler::default();
        let schema = RowSchema::new(vec![
            ColumnDescriptor::new("id", DataType::Int32).nullable(false),
            ColumnDescriptor::new("total", DataType::Float64),
            ColumnDescriptor::new("note", DataType::String),
            ColumnDescriptor::new("ignored", DataType::String),
        ]);
        let order = bind_first(
            &compiler,
            &order_target(),
            schema,
            vec![
                Value::Int32(7),
                Value::Float64(10.0),
                Value::Null,
                Value::from("x"),
            ],
        )
        .unwrap();
        assert_eq!(
            order,
            Order {
                id: 7,
                total: Decimal::new(10, 0),
                note: None
            }
        );
        assert_eq!(order.total.to_string(), "10");
    }

    #[test]
    fn test_null_guard_substitutes_zero() {
        let compiler = EntityBindingCompiler::default();
        let schema = RowSchema::new(vec![ColumnDescriptor::new("id", DataType::Int64)]);
        let order = bind_first(&compiler, &order_target(), schema, vec![Value::Null]).unwrap();
        assert_eq!(order.id, 0);
    }

    #[test]
    fn test_non_nullable_column_has_no_null_guard() {
        let compiler = EntityBindingCompiler::default();
        let schema =
            RowSchema::new(vec![ColumnDescriptor::new("id", DataType::Int64).nullable(false)]);
        let err = bind_first(&compiler, &order_target(), schema, vec![Value::Null]).unwrap_err();
        assert!(matches!(err, BindError::ColumnRead { found: "Null", .. }));
    }

    #[test]
    fn test_unsupported_column_type() {
        let compiler = EntityBindingCompiler::default();
        let schema = RowSchema::new(vec![ColumnDescriptor::new("id", DataType::Guid)]);
        let err = compiler.compile(&order_target(), &schema).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedColumnType { .. }));
        assert_eq!(compiler.cache().stats().size, 0);
    }

    #[test]
    fn test_unsupported_conversion() {
        let compiler = EntityBindingCompiler::default();
        let schema = RowSchema::new(vec![ColumnDescriptor::new("id", DataType::DateTime)]);
        let err = compiler.compile(&order_target(), &schema).unwrap_err();
        assert!(matches!(
            err,
            BindError::UnsupportedConversion {
                from: DataType::DateTime,
                to: MemberType::Int64,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_setter() {
        let compiler = EntityBindingCompiler::default();
        let target = TargetDescriptor::new(Order::default)
            .with_member(MemberDescriptor::new("Id", MemberType::Int64));
        let schema = RowSchema::new(vec![ColumnDescriptor::new("Id", DataType::Int64)]);
        let err = compiler.compile(&target, &schema).unwrap_err();
        assert!(matches!(err, BindError::MissingSetter { .. }));
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Settings {
        theme: String,
    }

    #[derive(Debug, Default)]
    struct Profile {
        settings: Settings,
    }

    fn profile_target() -> TargetDescriptor<Profile> {
        TargetDescriptor::new(Profile::default).with_member(
            MemberDescriptor::assign(
                "Settings",
                MemberType::Custom("Settings"),
                |p: &mut Profile, v: Json<Settings>| p.settings = v.0,
            )
            .json(),
        )
    }

    #[test]
    fn test_json_member() {
        let compiler = EntityBindingCompiler::default();
        let schema = RowSchema::new(vec![ColumnDescriptor::new("settings", DataType::String)]);
        let profile = bind_first(
            &compiler,
            &profile_target(),
            schema.clone(),
            vec![Value::from(r#"{"theme": "dark"}"#)],
        )
        .unwrap();
        assert_eq!(profile.settings.theme, "dark");

        let blank = bind_first(&compiler, &profile_target(), schema.clone(), vec![Value::from("  ")])
            .unwrap();
        assert_eq!(blank.settings, Settings::default());

        let err = bind_first(&compiler, &profile_target(), schema, vec![Value::from("{")])
            .unwrap_err();
        assert!(matches!(err, BindError::JsonDecode { .. }));
    }

    #[test]
    fn test_json_member_requires_text_column() {
        let compiler = EntityBindingCompiler::default();
        let schema = RowSchema::new(vec![ColumnDescriptor::new("settings", DataType::Int32)]);
        let err = compiler.compile(&profile_target(), &schema).unwrap_err();
        assert!(matches!(err, BindError::NonJsonColumnForJsonMember { .. }));
    }

    #[test]
    fn test_scalar_target() {
        let compiler = EntityBindingCompiler::default();
        let schema = RowSchema::new(vec![ColumnDescriptor::new("count", DataType::Decimal)]);
        let target = TargetDescriptor::<i64>::scalar(MemberType::Int64);
        let count = bind_first(
            &compiler,
            &target,
            schema,
            vec![Value::Decimal(Decimal::new(4200, 2))],
        )
        .unwrap();
        assert_eq!(count, 42);

        let empty = compiler.compile(&target, &RowSchema::default()).unwrap_err();
        assert!(matches!(empty, BindError::NoColumns { .. }));
    }

    #[test]
    fn test_placeholder_slot_out_of_range() {
        let compiler = EntityBindingCompiler::default();
        let target = TargetDescriptor::positional(|args: Vec<Value>| Ok(args))
            .with_slot("name", MemberType::String);
        let schema = RowSchema::new(vec![ColumnDescriptor::new(
            "fast_args_index_3",
            DataType::Int32,
        )]);
        let err = compiler.compile(&target, &schema).unwrap_err();
        assert!(matches!(
            err,
            BindError::PlaceholderSlotOutOfRange { slot: 3, arity: 1, .. }
        ));
    }

    #[test]
    fn test_object_member_keeps_raw_value() {
        #[derive(Default)]
        struct Bag {
            raw: Value,
        }
        let compiler = EntityBindingCompiler::default();
        let target = TargetDescriptor::new(Bag::default)
            .member("raw", MemberType::Object, |b: &mut Bag, v: Value| b.raw = v);
        let schema = RowSchema::new(vec![ColumnDescriptor::new("raw", DataType::Float64)]);
        let bag = bind_first(&compiler, &target, schema, vec![Value::Float64(2.50)]).unwrap();
        assert_eq!(bag.raw, Value::Float64(2.5));
    }
}
