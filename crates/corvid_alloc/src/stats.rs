//! Mutex-protected allocator statistics.

use std::sync::Mutex;

/// A point-in-time copy of an allocator's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocStatsSnapshot {
    /// Bytes currently outstanding (allocated minus freed).
    pub bytes_allocated: usize,
    /// High-water mark of `bytes_allocated`.
    pub peak_bytes: usize,
    /// Total number of successful allocations (not decremented on free).
    pub count: u64,
    /// Total number of allocations that failed, for any reason.
    pub failed_allocations: u64,
    /// Bytes reserved from the OS/backing store but not necessarily handed
    /// out yet (e.g. a bump arena's current block size).
    pub reserved_bytes: usize,
}

/// Counters shared across threads by an allocator, one lock guarding the
/// whole snapshot so readers never observe a torn update.
#[derive(Debug, Default)]
pub struct AllocStats {
    inner: Mutex<AllocStatsSnapshot>,
}

impl AllocStats {
    pub fn new() -> Self {
        AllocStats { inner: Mutex::new(AllocStatsSnapshot::default()) }
    }

    pub fn record_alloc(&self, bytes: usize) {
        let mut s = self.inner.lock().unwrap();
        s.bytes_allocated += bytes;
        s.count += 1;
        if s.bytes_allocated > s.peak_bytes {
            s.peak_bytes = s.bytes_allocated;
        }
    }

    pub fn record_free(&self, bytes: usize) {
        let mut s = self.inner.lock().unwrap();
        s.bytes_allocated = s.bytes_allocated.saturating_sub(bytes);
    }

    pub fn record_failure(&self) {
        self.inner.lock().unwrap().failed_allocations += 1;
    }

    pub fn set_reserved(&self, bytes: usize) {
        self.inner.lock().unwrap().reserved_bytes = bytes;
    }

    pub fn reset(&self) {
        *self.inner.lock().unwrap() = AllocStatsSnapshot::default();
    }

    pub fn snapshot(&self) -> AllocStatsSnapshot {
        *self.inner.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_peak_independently_of_current() {
        let stats = AllocStats::new();
        stats.record_alloc(100);
        stats.record_alloc(50);
        stats.record_free(120);
        let s = stats.snapshot();
        assert_eq!(s.bytes_allocated, 30);
        assert_eq!(s.peak_bytes, 150);
        assert_eq!(s.count, 2);
    }

    #[test]
    fn failed_allocations_counted_separately() {
        let stats = AllocStats::new();
        stats.record_failure();
        stats.record_failure();
        assert_eq!(stats.snapshot().failed_allocations, 2);
    }
}
