//! Allocation failure reasons.

use std::fmt;

/// Why an allocation, reallocation, or typed-header check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The underlying allocator had no memory left to satisfy the request.
    OutOfMemory,
    /// `count * size` (or an explicit layout) overflowed `usize`.
    ///
    /// Checked regardless of [`crate::FailureStrategy`]; a retry or a
    /// return-null strategy both still fail on overflow.
    Overflow,
    /// The requested alignment was not a power of two, or was smaller than
    /// the allocator's minimum alignment.
    InvalidAlignment,
    /// A typed free or `check_type` call found a magic value that did not
    /// match, indicating a double free or a pointer that was never
    /// allocated through the typed wrapper.
    DoubleFree,
    /// `check_type` found a magic value but a mismatched type signature.
    TypeMismatch,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::OutOfMemory => write!(f, "out of memory"),
            AllocError::Overflow => write!(f, "allocation size overflowed"),
            AllocError::InvalidAlignment => write!(f, "invalid alignment"),
            AllocError::DoubleFree => write!(f, "double free detected"),
            AllocError::TypeMismatch => write!(f, "type signature mismatch"),
        }
    }
}

impl std::error::Error for AllocError {}
