//! Binding target metadata.
//!
//! Targets are described by their resolver, never inspected: a
//! [`TargetDescriptor`] names the target, lists its [`MemberDescriptor`]s and
//! carries the routine that constructs it.

pub mod from_value;
pub mod member_info;
pub mod target_info;

pub use from_value::{FromValue, Json};
pub use member_info::{MemberDescriptor, MemberType, Setter};
pub use target_info::{
    Constructor, Factory, ScalarFactory, TargetDescriptor, TargetFactory, TargetKind,
};
