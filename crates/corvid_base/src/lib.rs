#![cfg_attr(docsrs, feature(doc_cfg))]

//! # corvid-base
//!
//! Pure structural atoms shared across the Corvid compiler frontend.
//!
//! This crate provides the foundational types every other `corvid_*` crate
//! builds on:
//!
//! - [`Arena`] — Bump allocation for stable AST references
//! - [`Interner`]/[`Symbol`] — String interning for O(1) equality
//! - [`Span`] — byte-offset ranges used internally for lexeme slicing
//! - [`SourcePosition`] — file/line/column/length, the position every token
//!   and AST node carries
//! - [`SpannedError`]/[`Result`] — Errors with source positions
//!
//! # Design Principles
//!
//! This crate has **no knowledge of Corvid grammar or I/O**. It provides
//! only generic, reusable infrastructure that higher-level crates build
//! upon (lexer, parser, type checker, allocator and channel runtimes).
//!
//! # Example
//!
//! ```
//! use corvid_base::{Arena, Interner, Span};
//!
//! let arena: Arena<&str> = Arena::new();
//! let mut interner = Interner::new();
//!
//! let hello = interner.intern("hello");
//! let span = Span::new(0, 5);
//!
//! let allocated = arena.alloc("hello");
//! assert_eq!(*allocated, "hello");
//! ```

pub mod arena;
pub mod diagnostic;
pub mod intern;
pub mod span;
pub mod position;
pub mod error;

pub use arena::Arena;
pub use diagnostic::{Diagnostic, DiagnosticBag, Severity};
pub use intern::{Interner, Symbol, SymbolEq};
pub use span::Span;
pub use position::SourcePosition;
pub use error::{SpannedError, Result};
