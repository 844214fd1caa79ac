//! Member, method and constructor descriptors.
//!
//! Predicate trees never inspect host types. Every member read or write, call
//! and construction goes through one of these function tables, supplied by
//! whoever builds the tree.

use crate::access::{Record, Value};
use crate::expression::{EvalResult, EvaluationError, StaticType};
use std::fmt;
use std::sync::Arc;

pub type MemberGetter = Arc<dyn Fn(Option<&Value>) -> EvalResult<Value> + Send + Sync>;
pub type MemberSetter = Arc<dyn Fn(&mut Value, Value) -> EvalResult<()> + Send + Sync>;
pub type MethodInvoke = Arc<dyn Fn(Option<&Value>, Vec<Value>) -> EvalResult<Value> + Send + Sync>;
pub type ConstructorInvoke = Arc<dyn Fn(Vec<Value>) -> EvalResult<Value> + Send + Sync>;

/// A readable, optionally writable member
#[derive(Clone)]
pub struct MemberRef {
    name: String,
    ty: StaticType,
    is_static: bool,
    getter: MemberGetter,
    setter: Option<MemberSetter>,
}

impl MemberRef {
    /// Instance member; the getter receives the owner value
    pub fn new(
        name: impl Into<String>,
        ty: StaticType,
        getter: impl Fn(&Value) -> EvalResult<Value> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let member = name.clone();
        Self {
            name,
            ty,
            is_static: false,
            getter: Arc::new(move |owner| match owner {
                Some(owner) => getter(owner),
                None => Err(EvaluationError::invocation(&member, "instance member read without an owner")),
            }),
            setter: None,
        }
    }

    /// Member that needs no owner, such as a clock or a global setting
    pub fn static_member(
        name: impl Into<String>,
        ty: StaticType,
        getter: impl Fn() -> EvalResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: true,
            getter: Arc::new(move |_| getter()),
            setter: None,
        }
    }

    /// Named field of a [`Record`], or key of a JSON object
    pub fn field(name: impl Into<String>, ty: StaticType) -> Self {
        let name = name.into();
        let key = name.clone();
        let set_key = name.clone();
        Self::new(name, ty, move |owner| match owner {
            Value::Record(record) => record
                .get(&key)
                .cloned()
                .ok_or_else(|| EvaluationError::invocation(&key, format!("{} has no such field", record.type_name))),
            Value::Json(serde_json::Value::Object(map)) => {
                Ok(map.get(&key).cloned().map_or(Value::Null, Value::Json))
            }
            other => Err(EvaluationError::invocation(
                &key,
                format!("cannot read a field of a {} value", other.type_name()),
            )),
        })
        .with_setter(move |owner, value| match owner.as_record_mut() {
            Some(record) => {
                record.set(set_key.clone(), value);
                Ok(())
            }
            None => Err(EvaluationError::invocation(
                &set_key,
                format!("cannot assign a field of a {} value", owner.type_name()),
            )),
        })
    }

    pub fn with_setter(
        mut self,
        setter: impl Fn(&mut Value, Value) -> EvalResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> StaticType {
        self.ty
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn get(&self, owner: Option<&Value>) -> EvalResult<Value> {
        (self.getter)(owner)
    }

    pub fn set(&self, owner: &mut Value, value: Value) -> EvalResult<()> {
        match &self.setter {
            Some(setter) => setter(owner, value),
            None => Err(EvaluationError::MissingSetter {
                member: self.name.clone(),
            }),
        }
    }
}

impl fmt::Debug for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberRef")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("is_static", &self.is_static)
            .finish()
    }
}

/// A callable method, static when invoked without a receiver
#[derive(Clone)]
pub struct MethodRef {
    name: String,
    declaring_type: String,
    return_type: StaticType,
    invoke: MethodInvoke,
}

impl MethodRef {
    pub fn new(
        name: impl Into<String>,
        declaring_type: impl Into<String>,
        return_type: StaticType,
        invoke: impl Fn(Option<&Value>, Vec<Value>) -> EvalResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            return_type,
            invoke: Arc::new(invoke),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn return_type(&self) -> StaticType {
        self.return_type
    }

    pub fn invoke(&self, receiver: Option<&Value>, arguments: Vec<Value>) -> EvalResult<Value> {
        (self.invoke)(receiver, arguments)
    }
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{} -> {:?}", self.declaring_type, self.name, self.return_type)
    }
}

/// Builds a new object from evaluated arguments
#[derive(Clone)]
pub struct ConstructorRef {
    type_name: String,
    ty: StaticType,
    invoke: ConstructorInvoke,
}

impl ConstructorRef {
    pub fn new(
        type_name: impl Into<String>,
        ty: StaticType,
        invoke: impl Fn(Vec<Value>) -> EvalResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            ty,
            invoke: Arc::new(invoke),
        }
    }

    /// Record whose fields are filled positionally from the arguments
    pub fn record(type_name: impl Into<String>, fields: &[&str]) -> Self {
        let type_name = type_name.into();
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        let name = type_name.clone();
        Self::new(type_name, StaticType::Record, move |args| {
            if args.len() != fields.len() {
                return Err(EvaluationError::invocation(
                    &name,
                    format!("expected {} arguments, got {}", fields.len(), args.len()),
                ));
            }
            let mut record = Record::new(name.clone());
            for (field, value) in fields.iter().zip(args) {
                record.set(field.clone(), value);
            }
            Ok(Value::Record(record))
        })
    }

    /// Empty list; arguments such as a capacity are ignored
    pub fn list() -> Self {
        Self::new("List", StaticType::Array, |_| Ok(Value::List(Vec::new())))
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn ty(&self) -> StaticType {
        self.ty
    }

    pub fn invoke(&self, arguments: Vec<Value>) -> EvalResult<Value> {
        (self.invoke)(arguments)
    }
}

impl fmt::Debug for ConstructorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new {}", self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_reads_and_writes_records() {
        let member = MemberRef::field("x", StaticType::Int32);
        let mut point = Value::Record(Record::new("Point").with("x", 1));
        assert_eq!(member.get(Some(&point)).unwrap(), Value::Int32(1));

        member.set(&mut point, Value::Int32(9)).unwrap();
        assert_eq!(member.get(Some(&point)).unwrap(), Value::Int32(9));

        assert!(member.get(Some(&Value::Int32(3))).is_err());
        assert!(member.get(None).is_err());
    }

    #[test]
    fn test_field_reads_json_objects() {
        let member = MemberRef::field("a", StaticType::Object);
        let doc = Value::Json(serde_json::json!({"a": 1}));
        assert_eq!(member.get(Some(&doc)).unwrap(), Value::Json(serde_json::json!(1)));
    }

    #[test]
    fn test_member_without_setter() {
        let member = MemberRef::static_member("Now", StaticType::Int32, || Ok(Value::Int32(1)));
        assert!(member.is_static());
        assert_eq!(member.get(None).unwrap(), Value::Int32(1));
        let err = member.set(&mut Value::Null, Value::Null).unwrap_err();
        assert!(matches!(err, EvaluationError::MissingSetter { .. }));
    }

    #[test]
    fn test_record_constructor() {
        let ctor = ConstructorRef::record("Pair", &["a", "b"]);
        let pair = ctor.invoke(vec![Value::Int32(1), Value::from("x")]).unwrap();
        assert_eq!(
            pair,
            Value::Record(Record::new("Pair").with("a", 1).with("b", "x"))
        );
        assert!(ctor.invoke(vec![]).is_err());
    }
}
