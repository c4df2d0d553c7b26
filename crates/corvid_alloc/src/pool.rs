//! The Pool variant: a free list of fixed-size chunks, carved from blocks
//! requested from the process allocator as the pool grows.

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::Mutex;

use crate::allocator::Allocator;
use crate::error::AllocError;
use crate::flags::{AllocFlags, FailureStrategy};
use crate::stats::{AllocStats, AllocStatsSnapshot};

struct PoolState {
    /// Head of the intrusive free list; each free chunk's first
    /// `size_of::<*mut u8>()` bytes store the next free chunk's address.
    free_head: Option<NonNull<u8>>,
    /// Every block we've requested from the process allocator, so
    /// `destroy` can release them.
    blocks: Vec<(NonNull<u8>, Layout)>,
}

unsafe impl Send for PoolState {}

/// A pool of fixed-size, fixed-alignment chunks.
pub struct PoolAllocator {
    chunk_layout: Layout,
    chunks_per_block: usize,
    state: Mutex<PoolState>,
    strategy: FailureStrategy,
    stats: AllocStats,
}

impl PoolAllocator {
    pub fn new(chunk_size: usize, chunk_align: usize, chunks_per_block: usize, strategy: FailureStrategy) -> Self {
        let chunk_size = chunk_size.max(std::mem::size_of::<*mut u8>());
        let chunk_layout = Layout::from_size_align(chunk_size, chunk_align)
            .expect("pool chunk layout must be valid");
        PoolAllocator {
            chunk_layout,
            chunks_per_block: chunks_per_block.max(1),
            state: Mutex::new(PoolState { free_head: None, blocks: Vec::new() }),
            strategy,
            stats: AllocStats::new(),
        }
    }

    fn grow(&self, state: &mut PoolState) -> Result<(), AllocError> {
        let block_layout = Layout::from_size_align(
            self.chunk_layout.size() * self.chunks_per_block,
            self.chunk_layout.align(),
        )
        .map_err(|_| AllocError::InvalidAlignment)?;
        let raw = unsafe { alloc::alloc(block_layout) };
        let block = NonNull::new(raw).ok_or(AllocError::OutOfMemory)?;
        for i in 0..self.chunks_per_block {
            let chunk = unsafe { block.as_ptr().add(i * self.chunk_layout.size()) };
            self.push_free(state, NonNull::new(chunk).unwrap());
        }
        state.blocks.push((block, block_layout));
        self.stats.set_reserved(state.blocks.len() * block_layout.size());
        Ok(())
    }

    fn push_free(&self, state: &mut PoolState, chunk: NonNull<u8>) {
        unsafe {
            (chunk.as_ptr() as *mut Option<NonNull<u8>>).write(state.free_head);
        }
        state.free_head = Some(chunk);
    }

    fn pop_free(&self, state: &mut PoolState) -> Option<NonNull<u8>> {
        let head = state.free_head?;
        state.free_head = unsafe { (head.as_ptr() as *mut Option<NonNull<u8>>).read() };
        Some(head)
    }

    fn take_chunk(&self) -> Result<NonNull<u8>, AllocError> {
        let mut state = self.state.lock().unwrap();
        if state.free_head.is_none() {
            self.grow(&mut state)?;
        }
        self.pop_free(&mut state).ok_or(AllocError::OutOfMemory)
    }
}

impl Allocator for PoolAllocator {
    fn alloc(&self, layout: Layout, flags: AllocFlags) -> Result<NonNull<u8>, AllocError> {
        if layout.size() > self.chunk_layout.size() || layout.align() > self.chunk_layout.align() {
            return Err(AllocError::InvalidAlignment);
        }
        match self.take_chunk() {
            Ok(ptr) => {
                if flags.contains(AllocFlags::ZERO) {
                    unsafe { ptr.as_ptr().write_bytes(0, self.chunk_layout.size()) };
                }
                self.stats.record_alloc(self.chunk_layout.size());
                Ok(ptr)
            }
            Err(e) => {
                self.stats.record_failure();
                self.strategy
                    .handle(|| self.take_chunk())
                    .map(|ptr| {
                        self.stats.record_alloc(self.chunk_layout.size());
                        ptr
                    })
                    .map_err(|_| e)
            }
        }
    }

    /// A pool's chunks are a fixed size; `realloc` only succeeds when the
    /// new layout still fits inside one chunk, in which case the pointer
    /// is returned unchanged.
    fn realloc(
        &self,
        ptr: NonNull<u8>,
        _old_layout: Layout,
        new_layout: Layout,
        _flags: AllocFlags,
    ) -> Result<NonNull<u8>, AllocError> {
        if new_layout.size() > self.chunk_layout.size() || new_layout.align() > self.chunk_layout.align() {
            return Err(AllocError::InvalidAlignment);
        }
        Ok(ptr)
    }

    fn free(&self, ptr: NonNull<u8>, _layout: Layout) {
        let mut state = self.state.lock().unwrap();
        self.push_free(&mut state, ptr);
        self.stats.record_free(self.chunk_layout.size());
    }

    /// Rebuilds the free list so every chunk in every owned block is free
    /// again, without releasing the blocks themselves.
    fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.free_head = None;
        let blocks = std::mem::take(&mut state.blocks);
        for (block, block_layout) in &blocks {
            let count = block_layout.size() / self.chunk_layout.size();
            for i in 0..count {
                let chunk = unsafe { block.as_ptr().add(i * self.chunk_layout.size()) };
                self.push_free(&mut state, NonNull::new(chunk).unwrap());
            }
        }
        state.blocks = blocks;
        self.stats.reset();
    }

    fn destroy(&self) {
        let mut state = self.state.lock().unwrap();
        state.free_head = None;
        for (block, block_layout) in state.blocks.drain(..) {
            unsafe { alloc::dealloc(block.as_ptr(), block_layout) };
        }
        self.stats.reset();
    }

    fn stats(&self) -> AllocStatsSnapshot {
        self.stats.snapshot()
    }
}
