//! The Arena variant: bump-pointer allocation over linked blocks.
//!
//! Grounded on the teacher's `Zone::Heap` bump-arena pattern — same
//! "Hotel California" idea (values go in, bulk deallocation comes out via
//! `reset`), generalized from a single arena into one of four pluggable
//! allocator backends with the shared [`crate::Allocator`] trait.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::Mutex;

use bumpalo::Bump;

use crate::allocator::Allocator;
use crate::error::AllocError;
use crate::flags::{AllocFlags, FailureStrategy};
use crate::stats::{AllocStats, AllocStatsSnapshot};

pub struct ArenaAllocator {
    bump: Mutex<Bump>,
    strategy: FailureStrategy,
    stats: AllocStats,
}

impl ArenaAllocator {
    pub fn new(strategy: FailureStrategy) -> Self {
        ArenaAllocator { bump: Mutex::new(Bump::new()), strategy, stats: AllocStats::new() }
    }

    pub fn with_capacity(capacity_bytes: usize, strategy: FailureStrategy) -> Self {
        ArenaAllocator {
            bump: Mutex::new(Bump::with_capacity(capacity_bytes)),
            strategy,
            stats: AllocStats::new(),
        }
    }

    fn raw_alloc(&self, layout: Layout, flags: AllocFlags) -> Result<NonNull<u8>, AllocError> {
        let bump = self.bump.lock().unwrap();
        let ptr = bump.try_alloc_layout(layout).map_err(|_| AllocError::OutOfMemory)?;
        if flags.contains(AllocFlags::ZERO) {
            unsafe { ptr.as_ptr().write_bytes(0, layout.size()) };
        }
        Ok(ptr)
    }
}

impl Allocator for ArenaAllocator {
    fn alloc(&self, layout: Layout, flags: AllocFlags) -> Result<NonNull<u8>, AllocError> {
        if !layout.align().is_power_of_two() {
            return Err(AllocError::InvalidAlignment);
        }
        match self.raw_alloc(layout, flags) {
            Ok(ptr) => {
                self.stats.record_alloc(layout.size());
                self.stats.set_reserved(self.bump.lock().unwrap().allocated_bytes());
                Ok(ptr)
            }
            Err(e) => {
                self.stats.record_failure();
                self.strategy
                    .handle(|| self.raw_alloc(layout, flags))
                    .map(|ptr| {
                        self.stats.record_alloc(layout.size());
                        ptr
                    })
                    .map_err(|_| e)
            }
        }
    }

    /// Bump arenas never shrink or move in place; `realloc` allocates a
    /// fresh block and copies the overlap, leaving the old allocation
    /// dangling until the next `reset`.
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

    /// No-op: individual allocations inside an arena are never reclaimed
    /// one at a time, only via [`ArenaAllocator::reset`].
    fn free(&self, _ptr: NonNull<u8>, _layout: Layout) {}

    fn reset(&self) {
        self.bump.lock().unwrap().reset();
        self.stats.reset();
    }

    fn destroy(&self) {
        *self.bump.lock().unwrap() = Bump::new();
        self.stats.reset();
    }

    fn stats(&self) -> AllocStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_reclaims_allocated_bytes_counter() {
        let arena = ArenaAllocator::new(FailureStrategy::ReturnNull);
        let layout = Layout::new::<[u8; 64]>();
        let _ = arena.alloc(layout, AllocFlags::NONE).unwrap();
        assert!(arena.stats().bytes_allocated > 0);
        arena.reset();
        assert_eq!(arena.stats().bytes_allocated, 0);
    }

    #[test]
    fn free_does_not_reclaim_bytes() {
        let arena = ArenaAllocator::new(FailureStrategy::ReturnNull);
        let layout = Layout::new::<[u8; 32]>();
        let ptr = arena.alloc(layout, AllocFlags::NONE).unwrap();
        let before = arena.stats().bytes_allocated;
        arena.free(ptr, layout);
        assert_eq!(arena.stats().bytes_allocated, before);
    }

    #[test]
    fn realloc_copies_overlap() {
        let arena = ArenaAllocator::new(FailureStrategy::ReturnNull);
        let small = Layout::new::<[u8; 4]>();
        let ptr = arena.alloc(small, AllocFlags::NONE).unwrap();
        unsafe { ptr.as_ptr().copy_from([1u8, 2, 3, 4].as_ptr(), 4) };
        let big = Layout::new::<[u8; 8]>();
        let grown = arena.realloc(ptr, small, big, AllocFlags::NONE).unwrap();
        let bytes = unsafe { std::slice::from_raw_parts(grown.as_ptr(), 4) };
        assert_eq!(bytes, [1, 2, 3, 4]);
    }
}
