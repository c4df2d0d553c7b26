//! Cross-module exercises of the allocator runtime: scope lifetime
//! binding, the typed safety wrapper, and pool/arena/region conservation
//! properties, each driven through more than one module's public API.

use std::alloc::Layout;
use std::rc::Rc;

use corvid_alloc::{
    current_allocator, scope, AllocFlags, Allocator, ArenaAllocator, FailureStrategy,
    HeapAllocator, PoolAllocator, RegionAllocator, TypeSignature, TypedAllocator,
};
use corvid_base::Interner;

#[test]
fn scope_installs_and_then_clears_the_current_allocator() {
    assert!(current_allocator().is_none());
    scope(Rc::new(HeapAllocator::new(FailureStrategy::ReturnNull)), |_s| {
        assert!(current_allocator().is_some());
    });
    assert!(current_allocator().is_none());
}

#[test]
fn typed_allocation_survives_check_type_and_rejects_double_free() {
    let heap = HeapAllocator::new(FailureStrategy::ReturnNull);
    let typed = TypedAllocator::new(&heap);
    let mut interner = Interner::new();
    let name = interner.intern("i32");
    let signature = TypeSignature::new(&interner, name, 4);

    let ptr = typed.alloc_typed(signature, 4, AllocFlags::ZERO).unwrap();
    assert!(typed.check_type(ptr, &signature).is_ok());

    typed.free_typed(ptr).unwrap();
    assert!(typed.free_typed(ptr).is_err());
}

#[test]
fn arena_reset_is_idempotent_and_reclaims_the_allocated_byte_counter() {
    let arena = ArenaAllocator::new(FailureStrategy::ReturnNull);
    let layout = Layout::from_size_align(64, 8).unwrap();
    arena.alloc(layout, AllocFlags::NONE).unwrap();
    assert!(arena.stats().bytes_allocated > 0);

    arena.reset();
    arena.reset();
    assert_eq!(arena.stats().bytes_allocated, 0);
}

#[test]
fn region_allocator_frees_one_region_without_disturbing_others() {
    let regions = RegionAllocator::new(FailureStrategy::ReturnNull);
    let layout = Layout::from_size_align(32, 8).unwrap();

    let region_a = regions.new_region();
    let region_b = regions.new_region();
    regions.alloc_in(region_a, layout, AllocFlags::NONE).unwrap();
    regions.alloc_in(region_b, layout, AllocFlags::NONE).unwrap();

    regions.free_region(region_a);
    assert!(regions.alloc_in(region_a, layout, AllocFlags::NONE).is_err());
    assert!(regions.alloc_in(region_b, layout, AllocFlags::NONE).is_ok());
}

#[test]
fn pool_allocator_conserves_reserved_bytes_across_alloc_and_free_cycles() {
    let pool = PoolAllocator::new(16, 8, 8, FailureStrategy::ReturnNull);
    let layout = Layout::from_size_align(16, 8).unwrap();

    let a = pool.alloc(layout, AllocFlags::NONE).unwrap();
    let b = pool.alloc(layout, AllocFlags::NONE).unwrap();
    pool.free(a, layout);
    pool.free(b, layout);

    // Both chunks are back on the free list, so two more allocations must
    // be satisfied from the existing block rather than growing the pool.
    let reserved_before = pool.stats().reserved_bytes;
    pool.alloc(layout, AllocFlags::NONE).unwrap();
    pool.alloc(layout, AllocFlags::NONE).unwrap();
    assert_eq!(pool.stats().reserved_bytes, reserved_before);
}
