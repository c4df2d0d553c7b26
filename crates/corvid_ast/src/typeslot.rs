//! The resolved-type slot every expression and declaration node carries.
//!
//! Parsing never populates this; the type checker does, exactly once per
//! node, as it walks the tree. A second write is a checker bug, not
//! recoverable user-facing state, so it panics rather than silently
//! overwriting.

use std::cell::Cell;
use std::fmt;

/// An opaque handle into the type checker's interning table.
///
/// Defined here, not in `corvid_types`, so the AST crate has no dependency
/// on the type-checking crate; `corvid_types` treats `TypeId` as the key it
/// hands out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ERROR: TypeId = TypeId(0);
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A write-once cell for a node's resolved type.
///
/// Starts empty at parse time; the checker calls [`TypeSlot::set`] exactly
/// once while resolving the node. Reading before it's set returns `None`.
#[derive(Debug, Default)]
pub struct TypeSlot(Cell<Option<TypeId>>);

impl TypeSlot {
    pub fn new() -> Self {
        Self(Cell::new(None))
    }

    pub fn get(&self) -> Option<TypeId> {
        self.0.get()
    }

    /// Records the resolved type for this node.
    ///
    /// # Panics
    ///
    /// Panics if called twice on the same node; the checker is expected to
    /// visit each node's type exactly once.
    pub fn set(&self, ty: TypeId) {
        let previous = self.0.replace(Some(ty));
        if previous.is_some() {
            panic!("TypeSlot::set called twice on the same node (already {:?}, now {:?})", previous, ty);
        }
    }
}
