#![cfg_attr(docsrs, feature(doc_cfg))]

//! # corvid-parser
//!
//! A hand-written recursive-descent parser over [`corvid_lexer`] tokens,
//! producing a [`corvid_ast`] tree. Expression precedence is handled by a
//! small Pratt parser ([`precedence`]).
//!
//! ```
//! use corvid_ast::AstArena;
//! use corvid_parser::Parser;
//!
//! let arena = AstArena::new();
//! let parser = Parser::new(&arena, "main.cv", "package main;\nfn main() {}\n");
//! let output = parser.parse();
//! assert!(!output.diagnostics.has_errors());
//! assert_eq!(output.unit.declarations.len(), 1);
//! ```

pub mod parser;
pub mod precedence;

pub use parser::{ParseOutput, Parser};
