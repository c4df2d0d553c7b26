//! Typed safety wrapper.
//!
//! Every typed allocation is prefixed with a header carrying a magic
//! value and the type it was allocated as. Freeing checks the magic
//! before zeroing it, turning a double free into a detectable error
//! instead of silent corruption; `check_type` validates a pointer's
//! header against an expected signature before a cast is trusted.

use std::alloc::Layout;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ptr::NonNull;

use corvid_base::{Interner, Symbol};

use crate::allocator::{checked_array_layout, Allocator};
use crate::error::AllocError;
use crate::flags::AllocFlags;

const MAGIC: u32 = 0xC0_7B_1D_00;
const FREED_MAGIC: u32 = 0;

/// Identifies the Corvid type an allocation was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSignature {
    pub type_id: u32,
    pub name: Symbol,
    pub size: usize,
}

impl TypeSignature {
    /// Derives `type_id` from the type's name mixed with its size, so two
    /// signatures built independently for the same type still compare equal.
    pub fn new(interner: &Interner, name: Symbol, size: usize) -> Self {
        let mut hasher = DefaultHasher::new();
        interner.resolve(name).hash(&mut hasher);
        size.hash(&mut hasher);
        TypeSignature { type_id: hasher.finish() as u32, name, size }
    }
}

#[repr(C)]
struct TypedHeader {
    magic: u32,
    signature: TypeSignature,
    /// Element count for this allocation (1 for scalar allocations).
    size: usize,
}

/// A pointer into the body of a typed allocation, past its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedPtr(NonNull<u8>);

impl TypedPtr {
    pub fn as_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }
}

fn header_layout() -> Layout {
    Layout::new::<TypedHeader>()
}

/// A reasonable alignment for a type of the given size when the caller
/// hasn't supplied one explicitly: its own size rounded up to a power of
/// two, capped at 16 (the common max scalar alignment).
fn natural_align(size: usize) -> usize {
    size.max(1).next_power_of_two().min(16)
}

fn combined_layout(body: Layout) -> Result<(Layout, usize), AllocError> {
    header_layout().extend(body).map_err(|_| AllocError::InvalidAlignment)
}

unsafe fn header_for<'a>(ptr: NonNull<u8>, offset: usize) -> &'a mut TypedHeader {
    &mut *(ptr.as_ptr().sub(offset) as *mut TypedHeader)
}

/// Wraps an [`Allocator`] to hand out typed, double-free-checked
/// allocations.
pub struct TypedAllocator<'a, A: Allocator> {
    inner: &'a A,
}

impl<'a, A: Allocator> TypedAllocator<'a, A> {
    pub fn new(inner: &'a A) -> Self {
        TypedAllocator { inner }
    }

    /// Allocate `count` elements of the type described by `signature`.
    pub fn alloc_typed(
        &self,
        signature: TypeSignature,
        count: usize,
        flags: AllocFlags,
    ) -> Result<TypedPtr, AllocError> {
        let body = checked_array_layout(count, signature.size, natural_align(signature.size))?;
        let (combined, offset) = combined_layout(body)?;
        let raw = self.inner.alloc(combined, flags)?;
        let header = unsafe { &mut *(raw.as_ptr() as *mut TypedHeader) };
        header.magic = MAGIC;
        header.signature = signature;
        header.size = count;
        let body_ptr = unsafe { NonNull::new_unchecked(raw.as_ptr().add(offset)) };
        Ok(TypedPtr(body_ptr))
    }

    /// Validate `ptr`'s header against `expected` without freeing it.
    pub fn check_type(&self, ptr: TypedPtr, expected: &TypeSignature) -> Result<(), AllocError> {
        let offset = header_layout().size();
        let header = unsafe { header_for(ptr.0, offset) };
        if header.magic != MAGIC {
            return Err(AllocError::DoubleFree);
        }
        if &header.signature != expected {
            return Err(AllocError::TypeMismatch);
        }
        Ok(())
    }

    /// Free a typed allocation. Zeroes the magic so a second `free_typed`
    /// call on the same pointer is rejected as a double free.
    pub fn free_typed(&self, ptr: TypedPtr) -> Result<(), AllocError> {
        let offset = header_layout().size();
        let header = unsafe { header_for(ptr.0, offset) };
        if header.magic != MAGIC {
            return Err(AllocError::DoubleFree);
        }
        let body = checked_array_layout(
            header.size,
            header.signature.size,
            natural_align(header.signature.size),
        )?;
        let (combined, _) = combined_layout(body)?;
        header.magic = FREED_MAGIC;
        let raw = unsafe { NonNull::new_unchecked((ptr.0.as_ptr()).sub(offset)) };
        self.inner.free(raw, combined);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FailureStrategy;
    use crate::heap::HeapAllocator;

    #[test]
    fn double_free_is_detected() {
        let heap = HeapAllocator::new(FailureStrategy::ReturnNull);
        let typed = TypedAllocator::new(&heap);
        let mut interner = Interner::new();
        let name = interner.intern("i32");
        let sig = TypeSignature::new(&interner, name, 4);
        let ptr = typed.alloc_typed(sig, 1, AllocFlags::NONE).unwrap();
        assert!(typed.free_typed(ptr).is_ok());
        assert_eq!(typed.free_typed(ptr), Err(AllocError::DoubleFree));
    }

    #[test]
    fn check_type_rejects_mismatched_signature() {
        let heap = HeapAllocator::new(FailureStrategy::ReturnNull);
        let typed = TypedAllocator::new(&heap);
        let mut interner = Interner::new();
        let i32_name = interner.intern("i32");
        let f64_name = interner.intern("f64");
        let i32_sig = TypeSignature::new(&interner, i32_name, 4);
        let f64_sig = TypeSignature::new(&interner, f64_name, 8);
        let ptr = typed.alloc_typed(i32_sig, 1, AllocFlags::NONE).unwrap();
        assert_eq!(typed.check_type(ptr, &f64_sig), Err(AllocError::TypeMismatch));
        assert!(typed.check_type(ptr, &i32_sig).is_ok());
        typed.free_typed(ptr).unwrap();
    }
}
