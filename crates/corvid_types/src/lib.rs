#![cfg_attr(docsrs, feature(doc_cfg))]

//! # corvid-types
//!
//! The type table, lexical scope stack, numeric promotion rules, and
//! structural interface satisfaction used by the Corvid type checker.
//!
//! ```
//! use corvid_types::{Type, TypeTable};
//!
//! let mut table = TypeTable::new();
//! let ptr = table.intern(Type::Pointer(TypeTable::I32));
//! assert_eq!(table.get(ptr), &Type::Pointer(TypeTable::I32));
//! ```

pub mod interface;
pub mod numeric;
pub mod scope;
pub mod table;

pub use interface::{missing_methods, satisfies};
pub use numeric::promote;
pub use scope::{Binding, BindingKind, ScopeStack};
pub use table::{EnumVariant, FloatKind, IntKind, MethodSignature, StructField, Type, TypeTable};
