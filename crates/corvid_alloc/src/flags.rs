//! Allocation flags and out-of-memory failure strategies.

use std::sync::Arc;

/// Per-call allocation flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocFlags(u32);

impl AllocFlags {
    /// No flags set.
    pub const NONE: AllocFlags = AllocFlags(0);
    /// Zero the returned bytes before handing the pointer back.
    pub const ZERO: AllocFlags = AllocFlags(1 << 0);

    /// Returns `true` if `self` contains every bit set in `other`.
    pub fn contains(self, other: AllocFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for AllocFlags {
    type Output = AllocFlags;
    fn bitor(self, rhs: AllocFlags) -> AllocFlags {
        AllocFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for AllocFlags {
    fn bitor_assign(&mut self, rhs: AllocFlags) {
        self.0 |= rhs.0;
    }
}

/// An out-of-memory hook invoked once by the `retry` strategy.
///
/// Returns `true` if it freed memory and the allocation should be retried,
/// `false` if it could not help.
pub type OomHook = Arc<dyn Fn() -> bool + Send + Sync>;

/// What an allocator does when it cannot satisfy a request.
#[derive(Clone)]
pub enum FailureStrategy {
    /// Return `Err(AllocError::OutOfMemory)`. The default.
    ReturnNull,
    /// Panic immediately.
    Panic,
    /// Invoke the OOM hook once and retry the allocation. If the hook
    /// reports it could not free anything, or the retry still fails,
    /// the allocation fails as if `ReturnNull` had been used.
    Retry(OomHook),
}

impl Default for FailureStrategy {
    fn default() -> Self {
        FailureStrategy::ReturnNull
    }
}

impl std::fmt::Debug for FailureStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStrategy::ReturnNull => write!(f, "ReturnNull"),
            FailureStrategy::Panic => write!(f, "Panic"),
            FailureStrategy::Retry(_) => write!(f, "Retry(..)"),
        }
    }
}

impl FailureStrategy {
    /// Apply this strategy to an allocation attempt that has already
    /// failed once. `retry` is called again only for the `Retry` variant,
    /// and only if the OOM hook claims to have freed something.
    pub fn handle<F>(&self, mut retry: F) -> Result<std::ptr::NonNull<u8>, crate::AllocError>
    where
        F: FnMut() -> Result<std::ptr::NonNull<u8>, crate::AllocError>,
    {
        match self {
            FailureStrategy::ReturnNull => Err(crate::AllocError::OutOfMemory),
            FailureStrategy::Panic => panic!("allocation failed: out of memory"),
            FailureStrategy::Retry(hook) => {
                if hook() {
                    retry()
                } else {
                    Err(crate::AllocError::OutOfMemory)
                }
            }
        }
    }
}
