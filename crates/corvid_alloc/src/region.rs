//! The Region variant: one arena partitioned into independently freeable
//! sub-arenas. `free_region` reclaims a single region; `reset` tears down
//! every region at once.

use std::alloc::Layout;
use std::collections::HashMap;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use bumpalo::Bump;

use crate::allocator::Allocator;
use crate::error::AllocError;
use crate::flags::{AllocFlags, FailureStrategy};
use crate::stats::{AllocStats, AllocStatsSnapshot};

/// Identifies one sub-region within a [`RegionAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(usize);

pub struct RegionAllocator {
    regions: Mutex<HashMap<RegionId, Bump>>,
    next_id: AtomicUsize,
    default_region: RegionId,
    strategy: FailureStrategy,
    stats: AllocStats,
}

impl RegionAllocator {
    pub fn new(strategy: FailureStrategy) -> Self {
        let default_region = RegionId(0);
        let mut regions = HashMap::new();
        regions.insert(default_region, Bump::new());
        RegionAllocator {
            regions: Mutex::new(regions),
            next_id: AtomicUsize::new(1),
            default_region,
            strategy,
            stats: AllocStats::new(),
        }
    }

    /// Open a new, independently freeable region.
    pub fn new_region(&self) -> RegionId {
        let id = RegionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.regions.lock().unwrap().insert(id, Bump::new());
        id
    }

    /// Allocate inside a specific region instead of the default one.
    pub fn alloc_in(&self, region: RegionId, layout: Layout, flags: AllocFlags) -> Result<NonNull<u8>, AllocError> {
        if !layout.align().is_power_of_two() {
            return Err(AllocError::InvalidAlignment);
        }
        let attempt = || {
            let regions = self.regions.lock().unwrap();
            let bump = regions.get(&region).ok_or(AllocError::OutOfMemory)?;
            bump.try_alloc_layout(layout).map_err(|_| AllocError::OutOfMemory)
        };
        match attempt() {
            Ok(ptr) => {
                if flags.contains(AllocFlags::ZERO) {
                    unsafe { ptr.as_ptr().write_bytes(0, layout.size()) };
                }
                self.stats.record_alloc(layout.size());
                Ok(ptr)
            }
            Err(e) => {
                self.stats.record_failure();
                self.strategy.handle(attempt).map(|ptr| {
                    self.stats.record_alloc(layout.size());
                    ptr
                }).map_err(|_| e)
            }
        }
    }

    /// Reclaim a single region. Allocations made from it become dangling;
    /// the region id is no longer valid for further `alloc_in` calls.
    pub fn free_region(&self, region: RegionId) {
        self.regions.lock().unwrap().remove(&region);
    }
}

impl Allocator for RegionAllocator {
    fn alloc(&self, layout: Layout, flags: AllocFlags) -> Result<NonNull<u8>, AllocError> {
        self.alloc_in(self.default_region, layout, flags)
    }

    fn realloc(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
        flags: AllocFlags,
    ) -> Result<NonNull<u8>, AllocError> {
        let new_ptr = self.alloc(new_layout, flags)?;
        let copy_len = old_layout.size().min(new_layout.size());
        unsafe {
            std::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
        }
        Ok(new_ptr)
    }

    /// No-op: use [`RegionAllocator::free_region`] to reclaim a whole
    /// region at once.
    fn free(&self, _ptr: NonNull<u8>, _layout: Layout) {}

    /// Destroys every region, including the default one, then recreates
    /// an empty default region so the allocator stays usable.
    fn reset(&self) {
        let mut regions = self.regions.lock().unwrap();
        regions.clear();
        regions.insert(self.default_region, Bump::new());
        drop(regions);
        self.stats.reset();
    }

    fn destroy(&self) {
        self.reset();
    }

    fn stats(&self) -> AllocStatsSnapshot {
        self.stats.snapshot()
    }
}
