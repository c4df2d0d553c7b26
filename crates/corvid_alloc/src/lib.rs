#![cfg_attr(docsrs, feature(doc_cfg))]

//! # corvid-alloc
//!
//! The pluggable allocator runtime backing Corvid's `allocator` blocks and
//! `scope(A) { ... }` statements: four allocation strategies behind one
//! [`Allocator`] trait, a typed safety wrapper with double-free detection,
//! and mutex-protected stats shared across threads.
//!
//! ```
//! use corvid_alloc::{AllocFlags, Allocator, FailureStrategy, HeapAllocator};
//! use std::alloc::Layout;
//!
//! let heap = HeapAllocator::new(FailureStrategy::ReturnNull);
//! let ptr = heap.alloc(Layout::new::<[u8; 16]>(), AllocFlags::ZERO).unwrap();
//! heap.free(ptr, Layout::new::<[u8; 16]>());
//! ```

pub mod allocator;
pub mod arena;
pub mod error;
pub mod flags;
pub mod heap;
pub mod pool;
pub mod region;
pub mod scope;
pub mod stats;
pub mod typed;

pub use allocator::{checked_array_layout, Allocator};
pub use arena::ArenaAllocator;
pub use error::AllocError;
pub use flags::{AllocFlags, FailureStrategy, OomHook};
pub use heap::HeapAllocator;
pub use pool::PoolAllocator;
pub use region::{RegionAllocator, RegionId};
pub use scope::{current_allocator, scope, Scope};
pub use stats::{AllocStats, AllocStatsSnapshot};
pub use typed::{TypeSignature, TypedAllocator, TypedPtr};
