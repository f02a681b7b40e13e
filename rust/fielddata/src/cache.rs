//! Per-segment cache of built field data.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::AHashMap;
use fielddata_common::Result;

use crate::atomic::AtomicNumericFieldData;

/// Identifies the field data of one field in one segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub segment_id: u64,
    pub field: String,
}

impl CacheKey {
    pub fn new(segment_id: u64, field: impl Into<String>) -> CacheKey {
        CacheKey {
            segment_id,
            field: field.into(),
        }
    }
}

/// Store of built field data, keyed by `(segment, field)`.
///
/// Implementations run at most one build at a time per key; concurrent callers for the
/// same key wait for that build and share its result. A failed or panicked build leaves
/// no entry, so the next caller builds again.
pub trait FieldDataCache: Send + Sync {
    fn load_or_build(
        &self,
        key: &CacheKey,
        build: &mut dyn FnMut() -> Result<AtomicNumericFieldData>,
    ) -> Result<Arc<AtomicNumericFieldData>>;
}

type Slot = Arc<Mutex<Option<Arc<AtomicNumericFieldData>>>>;

/// Keyed in-memory cache without eviction; entries are dropped with
/// [`clear_segment`](Self::clear_segment) when a segment goes away.
#[derive(Default)]
pub struct SegmentFieldDataCache {
    entries: Mutex<AHashMap<CacheKey, Slot>>,
}

impl SegmentFieldDataCache {
    pub fn new() -> SegmentFieldDataCache {
        SegmentFieldDataCache::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<AtomicNumericFieldData>> {
        let slot = lock(&self.entries).get(key).cloned()?;
        lock(&slot).clone()
    }

    /// Number of built entries.
    pub fn len(&self) -> usize {
        self.built().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry of the segment.
    pub fn clear_segment(&self, segment_id: u64) {
        lock(&self.entries).retain(|key, _| key.segment_id != segment_id);
    }

    /// Sum of the estimated sizes of the built entries.
    pub fn memory_size_bytes(&self) -> u64 {
        self.built()
            .map(|data| data.estimated_memory_size_bytes())
            .sum()
    }

    fn built(&self) -> impl Iterator<Item = Arc<AtomicNumericFieldData>> {
        let slots = lock(&self.entries).values().cloned().collect::<Vec<_>>();
        slots.into_iter().filter_map(|slot| lock(&slot).clone())
    }
}

impl FieldDataCache for SegmentFieldDataCache {
    fn load_or_build(
        &self,
        key: &CacheKey,
        build: &mut dyn FnMut() -> Result<AtomicNumericFieldData>,
    ) -> Result<Arc<AtomicNumericFieldData>> {
        let slot = lock(&self.entries).entry(key.clone()).or_default().clone();

        // The slot lock is held for the whole build: one build per key. The entries
        // lock is never held while waiting for a slot.
        let mut entry = lock(&slot);
        if let Some(data) = entry.as_ref() {
            return Ok(data.clone());
        }
        match build() {
            Ok(data) => {
                let data = Arc::new(data);
                *entry = Some(data.clone());
                // A waiter may build after a failed attempt removed the slot.
                lock(&self.entries)
                    .entry(key.clone())
                    .or_insert_with(|| slot.clone());
                Ok(data)
            }
            Err(e) => {
                let mut entries = lock(&self.entries);
                if entries.get(key).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
                    entries.remove(key);
                }
                Err(e)
            }
        }
    }
}

/// A panic during a build leaves the slot empty, which is a valid state, so poisoning
/// is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::{
        panic::AssertUnwindSafe,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use fielddata_common::error::Error;

    use super::*;

    fn empty(num_docs: u32) -> Result<AtomicNumericFieldData> {
        Ok(AtomicNumericFieldData::Empty { num_docs })
    }

    #[test]
    fn test_builds_once_per_key() {
        let cache = SegmentFieldDataCache::new();
        let key = CacheKey::new(1, "price");
        let mut builds = 0;
        let a = cache
            .load_or_build(&key, &mut || {
                builds += 1;
                empty(3)
            })
            .unwrap();
        let b = cache
            .load_or_build(&key, &mut || {
                builds += 1;
                empty(4)
            })
            .unwrap();
        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap().num_docs(), 3);
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache = SegmentFieldDataCache::new();
        let key = CacheKey::new(1, "price");
        let err = cache
            .load_or_build(&key, &mut || Err(Error::invalid_operation("build")))
            .unwrap_err();
        assert!(err.to_string().contains("build"));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
        assert!(cache.entries.lock().unwrap().is_empty());
        assert!(cache.load_or_build(&key, &mut || empty(1)).is_ok());
        assert_eq!(cache.entries.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_panicked_build_does_not_poison_cache() {
        let cache = SegmentFieldDataCache::new();
        let ok = CacheKey::new(1, "ok");
        let bad = CacheKey::new(2, "bad");
        cache.load_or_build(&ok, &mut || empty(5)).unwrap();

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            cache.load_or_build(&bad, &mut || panic!("build panicked"))
        }));
        assert!(result.is_err());

        // The slot of `bad` was poisoned by the panic.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.memory_size_bytes(), 0);
        assert!(cache.get(&bad).is_none());
        assert_eq!(cache.get(&ok).unwrap().num_docs(), 5);

        let data = cache.load_or_build(&bad, &mut || empty(2)).unwrap();
        assert_eq!(data.num_docs(), 2);
        assert_eq!(cache.len(), 2);
        cache.clear_segment(2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_segment() {
        let cache = SegmentFieldDataCache::new();
        for segment_id in [1, 2] {
            for field in ["a", "b"] {
                cache
                    .load_or_build(&CacheKey::new(segment_id, field), &mut || empty(1))
                    .unwrap();
            }
        }
        assert_eq!(cache.len(), 4);
        cache.clear_segment(1);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&CacheKey::new(1, "a")).is_none());
        assert!(cache.get(&CacheKey::new(2, "a")).is_some());
        assert_eq!(cache.memory_size_bytes(), 0);
    }

    #[test]
    fn test_concurrent_callers_share_one_build() {
        let cache = SegmentFieldDataCache::new();
        let builds = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache
                        .load_or_build(&CacheKey::new(7, "f"), &mut || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(5));
                            empty(10)
                        })
                        .unwrap()
                });
            }
        });
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }
}
