use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the surface cache.
///
/// Updated on the render thread; the snapshot may be forwarded elsewhere for telemetry.
#[derive(Debug, Default)]
pub struct SurfaceCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    flushes: AtomicU64,
    uploads: AtomicU64,
    downloads: AtomicU64,
    invalidations: AtomicU64,
    /// Dirty surfaces dropped by `invalidate_region` without write-back.
    dirty_discards: AtomicU64,
}

impl SurfaceCacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_hits(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_misses(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_loads(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_flushes(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_uploads(&self) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_downloads(&self) {
        self.downloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_invalidations(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dirty_discards(&self) {
        self.dirty_discards.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SurfaceCacheStatsSnapshot {
        SurfaceCacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            uploads: self.uploads.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            dirty_discards: self.dirty_discards.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceCacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub flushes: u64,
    pub uploads: u64,
    pub downloads: u64,
    pub invalidations: u64,
    pub dirty_discards: u64,
}

impl SurfaceCacheStatsSnapshot {
    /// Fraction of lookups served from the cache, `0.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
