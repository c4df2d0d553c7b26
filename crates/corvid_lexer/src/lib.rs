#![cfg_attr(docsrs, feature(doc_cfg))]

//! # corvid-lexer
//!
//! Token model and hand-written lexer for the Corvid compiler frontend.
//!
//! ```
//! use corvid_lexer::{Lexer, TokenKind};
//!
//! let mut lexer = Lexer::from_source("main.cv", "var x = 1;");
//! let first = lexer.next_token();
//! assert_eq!(first.kind, TokenKind::Var);
//! ```

pub mod lexer;
pub mod token;

pub use lexer::{ErrorCallback, Lexer};
pub use token::{lookup_keyword, LiteralValue, Token, TokenKind};
