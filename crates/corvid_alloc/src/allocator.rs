//! The common interface every allocator variant implements.

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::error::AllocError;
use crate::flags::AllocFlags;
use crate::stats::AllocStatsSnapshot;

/// A pluggable allocator backend.
///
/// All four variants ([`crate::heap::HeapAllocator`],
/// [`crate::arena::ArenaAllocator`], [`crate::pool::PoolAllocator`],
/// [`crate::region::RegionAllocator`]) implement this trait, so code that
/// only needs `alloc`/`realloc`/`free`/`destroy` can be generic over which
/// one is installed via [`crate::scope::scope`].
pub trait Allocator {
    /// Allocate memory for `layout`. `layout.align()` must be a power of
    /// two no smaller than the allocator's minimum alignment, or this
    /// returns [`AllocError::InvalidAlignment`].
    fn alloc(&self, layout: Layout, flags: AllocFlags) -> Result<NonNull<u8>, AllocError>;

    /// Resize a previous allocation in place or by moving it, copying
    /// `min(old_layout.size(), new_layout.size())` bytes.
    fn realloc(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
        flags: AllocFlags,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Release a single allocation. A no-op for allocators (Arena, and
    /// Region outside `free_region`) whose variant does not support
    /// per-pointer free.
    fn free(&self, ptr: NonNull<u8>, layout: Layout);

    /// Reclaim everything this allocator owns in one shot. Semantics
    /// differ per variant: see each module's docs.
    fn reset(&self);

    /// Tear the allocator down, releasing any OS-level resources it holds.
    /// After `destroy`, the allocator is empty but still usable — the next
    /// `alloc` call establishes fresh backing storage.
    fn destroy(&self);

    /// A snapshot of this allocator's mutex-protected counters.
    fn stats(&self) -> AllocStatsSnapshot;
}

/// `count * size` with an explicit alignment, failing on overflow rather
/// than silently wrapping. Every array allocation goes through this —
/// overflow always fails, regardless of the allocator's failure strategy.
pub fn checked_array_layout(count: usize, size: usize, align: usize) -> Result<Layout, AllocError> {
    let total = count.checked_mul(size).ok_or(AllocError::Overflow)?;
    Layout::from_size_align(total, align).map_err(|_| AllocError::InvalidAlignment)
}
