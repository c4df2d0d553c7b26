#![cfg_attr(docsrs, feature(doc_cfg))]

//! # corvid-check
//!
//! The two-pass type checker: hoist every top-level declaration into a
//! [`corvid_types::TypeTable`]/[`corvid_types::ScopeStack`], then walk each
//! function and method body resolving every expression's [`corvid_ast::TypeId`]
//! exactly once.
//!
//! ```
//! use corvid_ast::AstArena;
//! use corvid_base::Interner;
//! use corvid_check::Checker;
//! use corvid_parser::Parser;
//!
//! let arena = AstArena::new();
//! let parsed = Parser::new(&arena, "demo.cv", "fn main() { var x = 1 + 2; }").parse();
//! let checker = Checker::new(&parsed.interner);
//! let out = checker.check(&parsed.unit);
//! assert!(!out.diagnostics.has_errors());
//! ```

pub mod checker;

pub use checker::{missing_for, CheckOutput, Checker};
