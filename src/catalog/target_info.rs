//! Target type metadata: identity, members and construction.

use crate::access::Value;
use crate::catalog::{FromValue, MemberDescriptor, MemberType};
use std::fmt;
use std::sync::Arc;

/// How a target is built from a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Allocated with a factory, then each matched member is assigned
    Members,
    /// Built by one constructor call over the ordered slot values
    Positional,
    /// The first column converted straight into the target type
    Scalar,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Members => write!(f, "members"),
            TargetKind::Positional => write!(f, "positional"),
            TargetKind::Scalar => write!(f, "scalar"),
        }
    }
}

pub type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;
pub type Constructor<T> = Arc<dyn Fn(Vec<Value>) -> anyhow::Result<T> + Send + Sync>;
pub type ScalarFactory<T> = Arc<dyn Fn(Value) -> anyhow::Result<T> + Send + Sync>;

/// Construction routine of a target
pub enum TargetFactory<T> {
    Members(Factory<T>),
    Positional(Constructor<T>),
    Scalar(ScalarFactory<T>),
}

impl<T> Clone for TargetFactory<T> {
    fn clone(&self) -> Self {
        match self {
            TargetFactory::Members(f) => TargetFactory::Members(f.clone()),
            TargetFactory::Positional(f) => TargetFactory::Positional(f.clone()),
            TargetFactory::Scalar(f) => TargetFactory::Scalar(f.clone()),
        }
    }
}

/// Resolved metadata of a binding target
pub struct TargetDescriptor<T> {
    identity: String,
    members: Vec<MemberDescriptor<T>>,
    factory: TargetFactory<T>,
}

impl<T> TargetDescriptor<T> {
    /// Member-assignment target allocated with `factory`
    pub fn new(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            identity: std::any::type_name::<T>().to_string(),
            members: Vec::new(),
            factory: TargetFactory::Members(Arc::new(factory)),
        }
    }

    /// Positional target; `construct` receives one value per slot, in slot order
    pub fn positional(
        construct: impl Fn(Vec<Value>) -> anyhow::Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            identity: std::any::type_name::<T>().to_string(),
            members: Vec::new(),
            factory: TargetFactory::Positional(Arc::new(construct)),
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn with_member(mut self, member: MemberDescriptor<T>) -> Self {
        self.members.push(member);
        self
    }

    /// Add a member with a typed setter
    pub fn member<V, F>(self, name: impl Into<String>, declared_type: MemberType, set: F) -> Self
    where
        T: 'static,
        V: FromValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.with_member(MemberDescriptor::assign(name, declared_type, set))
    }

    /// Add the next positional slot
    pub fn with_slot(self, name: impl Into<String>, declared_type: MemberType) -> Self {
        self.with_member(MemberDescriptor::new(name, declared_type).slot())
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn kind(&self) -> TargetKind {
        match self.factory {
            TargetFactory::Members(_) => TargetKind::Members,
            TargetFactory::Positional(_) => TargetKind::Positional,
            TargetFactory::Scalar(_) => TargetKind::Scalar,
        }
    }

    pub fn is_positional(&self) -> bool {
        self.kind() == TargetKind::Positional
    }

    pub fn members(&self) -> &[MemberDescriptor<T>] {
        &self.members
    }

    /// Number of constructor slots of a positional target
    pub fn arity(&self) -> usize {
        self.members.len()
    }

    /// Case-insensitive member lookup, returning the member's position
    /// Member bound to column `name`: an exact name match wins, otherwise
    /// the first member whose name matches ignoring ASCII case
    pub fn find_member(&self, name: &str) -> Option<(usize, &MemberDescriptor<T>)> {
        let members = &self.members;
        members
            .iter()
            .position(|member| member.name == name)
            .or_else(|| {
                members
                    .iter()
                    .position(|member| member.name.eq_ignore_ascii_case(name))
            })
            .map(|index| (index, &members[index]))
    }

    pub fn factory(&self) -> &TargetFactory<T> {
        &self.factory
    }
}

impl<T: FromValue + 'static> TargetDescriptor<T> {
    /// Scalar target fed from the first column
    pub fn scalar(declared_type: MemberType) -> Self {
        Self::scalar_member(MemberDescriptor::new("", declared_type))
    }

    /// Scalar target whose type wraps a nullable value, e.g. `Option<i64>`
    pub fn nullable_scalar(declared_type: MemberType) -> Self {
        Self::scalar_member(MemberDescriptor::new("", declared_type).nullable())
    }

    fn scalar_member(member: MemberDescriptor<T>) -> Self {
        Self {
            identity: std::any::type_name::<T>().to_string(),
            members: vec![member],
            factory: TargetFactory::Scalar(Arc::new(|value: Value| -> anyhow::Result<T> {
                Ok(T::from_value(value)?)
            })),
        }
    }
}

impl<T> Clone for TargetDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            members: self.members.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<T> fmt::Debug for TargetDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetDescriptor")
            .field("identity", &self.identity)
            .field("kind", &self.kind())
            .field("members", &self.members)
            .finish()
    }
}
