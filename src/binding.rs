//! Row-to-object binding.
//!
//! [`EntityBindingCompiler::compile`] turns a target descriptor and a result
//! schema into a [`Binder`]:
//!
//! 1. The pair is reduced to a [`Fingerprint`]
//! 2. The [`CacheStore`] returns the binder already built for it, or
//! 3. each column is planned against [`ConversionRules`] and the plans are
//!    assembled into one binder, which is cached under the fingerprint
//!
//! Every shape error surfaces at compile time; a binder that compiled only
//! fails on rows whose values cannot be converted.

pub mod binder;
pub mod cache;
pub mod compiler;
pub mod conversion;
pub mod error;
pub mod fingerprint;
pub mod json;

pub use binder::Binder;
pub use cache::{BindingCache, CacheStats, CacheStore, CachedBinder};
pub use compiler::EntityBindingCompiler;
pub use conversion::{ConversionPath, ConversionRules, ReadOp};
pub use error::{BindError, BindResult};
pub use fingerprint::Fingerprint;
pub use json::{JsonCodec, SerdeJsonCodec};
