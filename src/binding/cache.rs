//! Process-wide store of compiled binders keyed by fingerprint.

use crate::binding::{BindResult, Fingerprint};
use dashmap::DashMap;
use log::trace;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// A compiled binder with its target type erased
pub type CachedBinder = Arc<dyn Any + Send + Sync>;

/// Get-or-compute store for compiled binders.
///
/// Implementations must retain at most one compiled entry per fingerprint and
/// hand every caller that same entry.
pub trait CacheStore: Send + Sync {
    fn get_or_compute(
        &self,
        key: &Fingerprint,
        compute: &mut dyn FnMut() -> BindResult<CachedBinder>,
    ) -> BindResult<CachedBinder>;

    fn stats(&self) -> CacheStats;

    fn clear(&self);
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub compilations: usize,
    pub size: usize,
}

type Slot = Arc<Mutex<Option<CachedBinder>>>;

/// Default [`CacheStore`].
///
/// Each fingerprint owns a slot; the first caller compiles while holding the
/// slot lock, later callers for the same fingerprint wait and reuse the result.
/// A failed compilation drops the slot from the map again.
#[derive(Default)]
pub struct BindingCache {
    slots: DashMap<Fingerprint, Slot>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    compilations: AtomicUsize,
}

static GLOBAL: OnceLock<Arc<BindingCache>> = OnceLock::new();

impl BindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Arc<BindingCache> {
        GLOBAL.get_or_init(|| Arc::new(BindingCache::new())).clone()
    }
}

impl CacheStore for BindingCache {
    fn get_or_compute(
        &self,
        key: &Fingerprint,
        compute: &mut dyn FnMut() -> BindResult<CachedBinder>,
    ) -> BindResult<CachedBinder> {
        // Clone the slot out so the map shard is not held during compilation
        let slot: Slot = self.slots.entry(key.clone()).or_default().value().clone();
        let mut guard = slot.lock();

        if let Some(binder) = guard.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("binder cache hit: {}", key);
            return Ok(binder.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let binder = match compute() {
            Ok(binder) => binder,
            Err(err) => {
                // Still locked and empty, so nothing else can have filled it
                self.slots.remove_if(key, |_, mapped| Arc::ptr_eq(mapped, &slot));
                return Err(err);
            }
        };
        self.compilations.fetch_add(1, Ordering::Relaxed);
        *guard = Some(binder.clone());
        // A waiter whose slot was dropped after a failure puts it back
        self.slots.entry(key.clone()).or_insert_with(|| slot.clone());
        Ok(binder)
    }

    fn stats(&self) -> CacheStats {
        // No slot lock is taken while a shard lock is held
        let slots: Vec<Slot> = self.slots.iter().map(|entry| entry.value().clone()).collect();
        let size = slots.iter().filter(|slot| slot.lock().is_some()).count();

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            compilations: self.compilations.load(Ordering::Relaxed),
            size,
        }
    }

    fn clear(&self) {
        self.slots.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.compilations.store(0, Ordering::Relaxed);
    }
}
