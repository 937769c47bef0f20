//! An LRU cache of GEOS prepared geometries, keyed by handle identity.
//!
//! Entries never keep their handle alive: they hold a weak reference to it plus their own
//! copy of the native geometry. Entries whose handle has been dropped are purged on every
//! lookup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use geos::{Geom, PreparedGeometry};
use indexmap::IndexMap;

use crate::algorithm::catalog::Predicate;
use crate::error::{GeoShapeError, Result};
use crate::handle::{GeometryHandle, HandleId, WeakGeometryHandle};

/// A prepared geometry together with the native geometry it was built from.
pub struct PreparedEntry {
    // Declared first so that it is dropped before `base`, which it points into.
    prepared: Mutex<PreparedGeometry<'static>>,
    base: Box<geos::Geometry>,
    owner: WeakGeometryHandle,
}

// SAFETY: `base` is never accessed after construction except through `prepared`, and all
// access to `prepared` is serialized by its mutex.
unsafe impl Send for PreparedEntry {}
unsafe impl Sync for PreparedEntry {}

impl PreparedEntry {
    fn try_new(handle: &GeometryHandle) -> Result<Self> {
        let base = Box::new(Clone::clone(handle.as_geos()));
        let prepared = base.to_prepared_geom().map_err(|err| {
            GeoShapeError::Resource(format!("failed to prepare geometry: {err}"))
        })?;
        // SAFETY: the prepared geometry refers to the boxed native geometry, which is owned
        // by this entry, never moved out of its box and dropped after `prepared`.
        let prepared = unsafe {
            std::mem::transmute::<PreparedGeometry<'_>, PreparedGeometry<'static>>(prepared)
        };
        Ok(Self {
            prepared: Mutex::new(prepared),
            base,
            owner: handle.downgrade(),
        })
    }

    /// Whether the handle this entry was built from is still alive.
    pub fn is_alive(&self) -> bool {
        self.owner.is_alive()
    }

    /// Evaluate `prepared.predicate(other)`.
    pub fn evaluate(&self, predicate: Predicate, other: &geos::Geometry) -> Result<bool> {
        let prepared = self
            .prepared
            .lock()
            .map_err(|_| GeoShapeError::Resource("prepared geometry lock poisoned".to_string()))?;
        let result = match predicate {
            Predicate::Contains => prepared.contains(other),
            Predicate::Intersects => prepared.intersects(other),
            Predicate::Crosses => prepared.crosses(other),
            Predicate::Touches => prepared.touches(other),
            Predicate::Overlaps => prepared.overlaps(other),
            Predicate::Disjoint => prepared.disjoint(other),
            Predicate::Within => prepared.within(other),
            Predicate::Equals => {
                return Err(GeoShapeError::IncorrectType(
                    "equals cannot be evaluated on a prepared geometry".into(),
                ))
            }
        };
        Ok(result?)
    }

    /// Area of the native geometry this entry was prepared from.
    pub fn base_area(&self) -> Result<f64> {
        Ok(self.base.area()?)
    }
}

impl std::fmt::Debug for PreparedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedEntry")
            .field("owner", &self.owner)
            .finish()
    }
}

/// Counters of a [`PreparedCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreparedCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Number of entries currently cached.
    pub len: usize,
}

/// A bounded, least-recently-used cache of prepared geometries.
#[derive(Debug)]
pub struct PreparedCache {
    capacity: usize,
    entries: Mutex<IndexMap<HandleId, Arc<PreparedEntry>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl PreparedCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, IndexMap<HandleId, Arc<PreparedEntry>>>> {
        self.entries
            .lock()
            .map_err(|_| GeoShapeError::Resource("prepared cache lock poisoned".to_string()))
    }

    fn purge_dropped(entries: &mut IndexMap<HandleId, Arc<PreparedEntry>>) {
        let before = entries.len();
        entries.retain(|_, entry| entry.is_alive());
        let purged = before - entries.len();
        if purged > 0 {
            tracing::debug!(purged, "purged prepared geometries of dropped handles");
        }
    }

    /// Get the prepared geometry of `handle`, preparing it on a miss.
    pub fn get_or_prepare(&self, handle: &GeometryHandle) -> Result<Arc<PreparedEntry>> {
        let id = handle.id();
        {
            let mut entries = self.lock()?;
            Self::purge_dropped(&mut entries);
            if let Some(index) = entries.get_index_of(&id) {
                let last = entries.len() - 1;
                entries.move_index(index, last);
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(entries[last].clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(PreparedEntry::try_new(handle)?);

        let mut entries = self.lock()?;
        Self::purge_dropped(&mut entries);
        entries.insert(id, entry.clone());
        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(handle = evicted.as_u64(), "evicted prepared geometry");
            }
        }
        Ok(entry)
    }

    /// Evaluate `prepared(handle).predicate(other)`.
    pub fn evaluate(
        &self,
        handle: &GeometryHandle,
        predicate: Predicate,
        other: &GeometryHandle,
    ) -> Result<bool> {
        self.get_or_prepare(handle)?
            .evaluate(predicate, other.as_geos())
    }

    pub fn contains(&self, handle: &GeometryHandle) -> bool {
        self.lock()
            .map(|entries| entries.contains_key(&handle.id()))
            .unwrap_or(false)
    }

    /// Number of cached entries, including ones whose handle is already gone.
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    pub fn stats(&self) -> PreparedCacheStats {
        PreparedCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{point, square};

    #[test]
    fn hit_and_miss() {
        let cache = PreparedCache::new(4);
        let polygon = square(0.0, 0.0, 10.0);
        assert!(cache.evaluate(&polygon, Predicate::Contains, &point(5.0, 5.0)).unwrap());
        assert!(!cache.evaluate(&polygon, Predicate::Contains, &point(15.0, 5.0)).unwrap());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.len), (1, 1, 1));
        assert!(cache.contains(&polygon));
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let cache = PreparedCache::new(2);
        let a = square(0.0, 0.0, 1.0);
        let b = square(10.0, 0.0, 1.0);
        let c = square(20.0, 0.0, 1.0);
        cache.get_or_prepare(&a).unwrap();
        cache.get_or_prepare(&b).unwrap();
        // touch a so that b becomes the oldest entry
        cache.get_or_prepare(&a).unwrap();
        cache.get_or_prepare(&c).unwrap();

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn cache_does_not_keep_handles_alive() {
        let cache = PreparedCache::new(4);
        let polygon = square(0.0, 0.0, 1.0);
        let weak = polygon.downgrade();
        let entry = cache.get_or_prepare(&polygon).unwrap();
        assert_eq!(polygon.strong_count(), 1);

        drop(polygon);
        assert!(weak.upgrade().is_err());
        assert!(!entry.is_alive());
        // the entry still owns its own native copy
        assert_eq!(entry.base_area().unwrap(), 1.0);

        cache.get_or_prepare(&square(5.0, 5.0, 1.0)).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn dropped_handles_are_purged_on_hit() {
        let cache = PreparedCache::new(4);
        let kept = square(0.0, 0.0, 1.0);
        let dropped = square(5.0, 5.0, 1.0);
        cache.get_or_prepare(&kept).unwrap();
        cache.get_or_prepare(&dropped).unwrap();
        assert_eq!(cache.len(), 2);

        drop(dropped);
        cache.get_or_prepare(&kept).unwrap();
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.len), (1, 2, 1));
    }

    #[test]
    fn equals_is_not_preparable() {
        let cache = PreparedCache::new(1);
        let polygon = square(0.0, 0.0, 1.0);
        assert!(matches!(
            cache.evaluate(&polygon, Predicate::Equals, &polygon),
            Err(GeoShapeError::IncorrectType(_))
        ));
    }
}
