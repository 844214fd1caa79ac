//! Compiled per-shape binders.
//!
//! A binder is an ordered list of column plans, one per bound column, driven
//! by a single loop per row. Plans are fixed at compile time; applying a
//! binder never consults the conversion rules again.

use crate::access::{convert, normalize_numeric_text, RowRecord, Value};
use crate::binding::{BindError, BindResult, ConversionPath, Fingerprint, JsonCodec, ReadOp};
use crate::catalog::{Constructor, Factory, MemberType, ScalarFactory, Setter};
use std::fmt;
use std::sync::Arc;

/// Where an extracted column value goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sink {
    /// Index into the binder's setter list
    Member(usize),
    /// Constructor slot index
    Slot(usize),
    Scalar,
}

/// Extraction steps for one column
#[derive(Debug, Clone)]
pub(crate) struct ColumnPlan {
    pub ordinal: usize,
    pub column: String,
    pub member_type: MemberType,
    pub read: ReadOp,
    pub json: bool,
    pub normalize: bool,
    pub conversion: ConversionPath,
    pub null_guard: bool,
    pub zero: Value,
    pub sink: Sink,
}

pub(crate) enum Construction<T> {
    Members {
        factory: Factory<T>,
        setters: Vec<Setter<T>>,
    },
    Positional {
        construct: Constructor<T>,
        defaults: Vec<Value>,
    },
    Scalar(ScalarFactory<T>),
}

/// Reusable row-to-object function for one fingerprint
pub struct Binder<T> {
    target: String,
    fingerprint: Fingerprint,
    plans: Vec<ColumnPlan>,
    construction: Construction<T>,
    codec: Arc<dyn JsonCodec>,
    datetime_formats: Vec<String>,
}

impl<T> Binder<T> {
    pub(crate) fn new(
        target: String,
        fingerprint: Fingerprint,
        plans: Vec<ColumnPlan>,
        construction: Construction<T>,
        codec: Arc<dyn JsonCodec>,
        datetime_formats: Vec<String>,
    ) -> Self {
        Self {
            target,
            fingerprint,
            plans,
            construction,
            codec,
            datetime_formats,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Number of columns this binder reads
    pub fn column_count(&self) -> usize {
        self.plans.len()
    }

    /// Materialize the row the record is positioned on
    pub fn bind<R: RowRecord + ?Sized>(&self, record: &R) -> BindResult<T> {
        match &self.construction {
            Construction::Members { factory, setters } => {
                let mut target = factory();
                for plan in &self.plans {
                    let value = self.extract(plan, record)?;
                    if let Sink::Member(index) = plan.sink {
                        if let Some(setter) = setters.get(index) {
                            setter(&mut target, value).map_err(|e| BindError::Member {
                                column: plan.column.clone(),
                                reason: e.to_string(),
                            })?;
                        }
                    }
                }
                Ok(target)
            }
            Construction::Positional {
                construct,
                defaults,
            } => {
                let mut args = defaults.clone();
                for plan in &self.plans {
                    let value = self.extract(plan, record)?;
                    if let Sink::Slot(index) = plan.sink {
                        if let Some(arg) = args.get_mut(index) {
                            *arg = value;
                        }
                    }
                }
                construct(args).map_err(|e| self.construct_error(e))
            }
            Construction::Scalar(factory) => {
                let value = match self.plans.first() {
                    Some(plan) => self.extract(plan, record)?,
                    None => Value::Null,
                };
                factory(value).map_err(|e| self.construct_error(e))
            }
        }
    }

    fn extract<R: RowRecord + ?Sized>(&self, plan: &ColumnPlan, record: &R) -> BindResult<Value> {
        if plan.null_guard && record.is_null(plan.ordinal)? {
            return Ok(plan.zero.clone());
        }

        let raw = record.value(plan.ordinal)?;
        if !plan.read.accepts(&raw) {
            return Err(BindError::ColumnRead {
                column: plan.column.clone(),
                expected: plan.read.result_type().name(),
                found: raw.type_name(),
            });
        }

        if plan.json {
            return self.decode_json(plan, raw);
        }

        let value = if plan.normalize {
            match normalize_numeric_text(&raw) {
                Some(text) => Value::String(text),
                None => raw,
            }
        } else {
            raw
        };

        match plan.conversion {
            ConversionPath::Identity => Ok(value),
            ConversionPath::Convert(target) => convert(value, target, &self.datetime_formats)
                .map_err(|source| BindError::Conversion {
                    column: plan.column.clone(),
                    source,
                }),
        }
    }

    fn decode_json(&self, plan: &ColumnPlan, raw: Value) -> BindResult<Value> {
        let Value::String(text) = raw else {
            return Err(BindError::ColumnRead {
                column: plan.column.clone(),
                expected: plan.read.result_type().name(),
                found: raw.type_name(),
            });
        };
        if self.codec.is_blank(&text) {
            return Ok(plan.zero.clone());
        }
        self.codec
            .decode(&text, plan.member_type)
            .map_err(|e| BindError::JsonDecode {
                column: plan.column.clone(),
                reason: e.to_string(),
            })
    }

    fn construct_error(&self, e: anyhow::Error) -> BindError {
        BindError::Construct {
            target: self.target.clone(),
            reason: e.to_string(),
        }
    }
}

impl<T> fmt::Debug for Binder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("target", &self.target)
            .field("fingerprint", &self.fingerprint)
            .field("plans", &self.plans)
            .finish()
    }
}
