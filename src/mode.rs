//! Source-file mode detection.
//!
//! Corvid source normally carries the `.cv` extension, but a file piped in
//! on stdin or saved under a foreign extension can still be recognized by
//! sniffing its first token: every Corvid file begins with a `package`
//! declaration, so a lone `package` keyword up front is enough to treat an
//! otherwise-ambiguous file as Corvid source.

use std::path::Path;

use corvid_lexer::{Lexer, TokenKind};

/// The result of [`detect_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Recognized as Corvid source, either by extension or by content.
    Corvid,
    /// Neither the extension nor the leading token identify this as Corvid.
    Unknown,
}

/// Decide whether `path`/`source` should be treated as Corvid source.
///
/// Checks the file extension first; on anything other than `.cv` it falls
/// back to lexing just the first token and checking for `package`.
pub fn detect_mode(path: &Path, source: &str) -> Mode {
    if path.extension().and_then(|ext| ext.to_str()) == Some("cv") {
        return Mode::Corvid;
    }
    if starts_with_package_keyword(source) {
        return Mode::Corvid;
    }
    Mode::Unknown
}

fn starts_with_package_keyword(source: &str) -> bool {
    let mut lexer = Lexer::from_source("<mode-sniff>", source);
    matches!(lexer.next_token().kind, TokenKind::Package)
}
