//! Human-facing source locations: file, line, column, length.
//!
//! [`Span`](crate::Span) is the cheap, `Copy` byte-offset range used
//! internally while scanning and parsing. [`SourcePosition`] is the
//! richer, display-oriented location every [`Token`](../index.html) and AST
//! node carries once it leaves the lexer: a 1-based line and column plus
//! the file it came from. The lexer tracks line/column incrementally while
//! scanning and stamps each token with the position at the point the token
//! started.
//!
//! # Example
//!
//! ```
//! use corvid_base::SourcePosition;
//! use std::rc::Rc;
//!
//! let pos = SourcePosition::new(Rc::from("main.cv"), 3, 5, 4);
//! assert_eq!(format!("{}", pos), "main.cv:3:5");
//! ```

use std::fmt;
use std::rc::Rc;

/// A location in a named source file.
///
/// Immutable once constructed. `line` and `column` are 1-based, matching
/// how editors and compiler diagnostics report positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourcePosition {
    /// The source file this position belongs to.
    pub file: Rc<str>,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// Length, in bytes, of the lexeme or node this position covers.
    pub length: u32,
}

impl SourcePosition {
    /// Creates a position.
    ///
    /// # Panics
    ///
    /// Panics if `line` or `column` is zero; both are 1-based per the
    /// invariant every position in Corvid must uphold.
    pub fn new(file: Rc<str>, line: u32, column: u32, length: u32) -> Self {
        assert!(line >= 1, "SourcePosition::line is 1-based, got 0");
        assert!(column >= 1, "SourcePosition::column is 1-based, got 0");
        Self {
            file,
            line,
            column,
            length,
        }
    }

    /// A synthetic position for generated or built-in nodes that don't come
    /// from any real source text.
    pub fn synthetic() -> Self {
        Self {
            file: Rc::from("<synthetic>"),
            line: 1,
            column: 1,
            length: 0,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stores_fields() {
        let pos = SourcePosition::new(Rc::from("a.cv"), 2, 3, 5);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.length, 5);
    }

    #[test]
    #[should_panic(expected = "1-based")]
    fn rejects_zero_line() {
        SourcePosition::new(Rc::from("a.cv"), 0, 1, 1);
    }

    #[test]
    #[should_panic(expected = "1-based")]
    fn rejects_zero_column() {
        SourcePosition::new(Rc::from("a.cv"), 1, 0, 1);
    }

    #[test]
    fn display_format() {
        let pos = SourcePosition::new(Rc::from("main.cv"), 10, 4, 3);
        assert_eq!(format!("{}", pos), "main.cv:10:4");
    }

    #[test]
    fn synthetic_is_valid() {
        let pos = SourcePosition::synthetic();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
    }
}
