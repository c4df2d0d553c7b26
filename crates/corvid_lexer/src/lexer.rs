//! A single-pass, single-threaded, deterministic lexer.
//!
//! Construct a [`Lexer`] from a file path or an in-memory string, then pull
//! tokens with [`Lexer::next_token`] until it returns an `Eof` token. On any
//! malformed input the lexer emits an `Error` token carrying diagnostic
//! text and resumes scanning at the next recognizable boundary — it never
//! panics or returns `Result`; callers consume `Error` tokens as ordinary
//! data, same as any other kind.

use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use corvid_base::{SourcePosition, Span};

use crate::token::{lookup_keyword, LiteralValue, Token, TokenKind};

/// Receives lexer diagnostics as they're produced, in addition to the
/// `Error` token itself. Defaults to a no-op; install one with
/// [`Lexer::set_error_callback`] to, e.g., mirror diagnostics to a log.
pub type ErrorCallback = Box<dyn FnMut(&SourcePosition, &str)>;

pub struct Lexer {
    file: Rc<str>,
    bytes: Vec<u8>,
    pos: usize,
    line: u32,
    column: u32,
    on_error: Option<ErrorCallback>,
}

impl Lexer {
    /// Reads `path` and constructs a lexer over its contents.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        Ok(Self::from_source(path.to_string_lossy().to_string(), source))
    }

    /// Constructs a lexer over an in-memory string.
    pub fn from_source(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        let mut bytes = source.into().into_bytes();
        // A BOM at offset 0 is skipped, not tokenized.
        if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            bytes.drain(0..3);
        }
        Self {
            file: Rc::from(file_name.into().as_str()),
            bytes,
            pos: 0,
            line: 1,
            column: 1,
            on_error: None,
        }
    }

    /// Redirects error messages to `callback` instead of the default no-op.
    pub fn set_error_callback(&mut self, callback: impl FnMut(&SourcePosition, &str) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    fn report(&mut self, position: &SourcePosition, message: &str) {
        if let Some(cb) = self.on_error.as_mut() {
            cb(position, message);
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn current_position(&self, start_line: u32, start_column: u32, length: u32) -> SourcePosition {
        SourcePosition::new(self.file.clone(), start_line, start_column, length)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let (start_line, start_column) = (self.line, self.column);
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some(b) = self.peek() {
                        if b == b'*' && self.peek_at(1) == Some(b'/') {
                            self.advance();
                            self.advance();
                            closed = true;
                            break;
                        }
                        self.advance();
                    }
                    if !closed {
                        let position = self.current_position(start_line, start_column, 0);
                        self.report(&position, "unterminated block comment");
                    }
                }
                _ => break,
            }
        }
    }

    /// Returns the next token, or an `Eof` sentinel once the input is
    /// exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.pos;
        let (start_line, start_column) = (self.line, self.column);

        let Some(b) = self.peek() else {
            let position = self.current_position(start_line, start_column, 0);
            return Token::new(TokenKind::Eof, position, Span::new(start, start), "");
        };

        if is_ident_start(b) {
            return self.lex_identifier(start, start_line, start_column);
        }
        if b.is_ascii_digit() {
            return self.lex_number(start, start_line, start_column);
        }
        match b {
            b'"' => self.lex_string(start, start_line, start_column),
            b'`' => self.lex_raw_string(start, start_line, start_column),
            b'\'' => self.lex_char(start, start_line, start_column),
            _ => self.lex_operator(start, start_line, start_column),
        }
    }

    fn make(&self, kind: TokenKind, start: usize, start_line: u32, start_column: u32) -> Token {
        let lexeme = String::from_utf8_lossy(&self.bytes[start..self.pos]).to_string();
        let length = (self.pos - start) as u32;
        let position = self.current_position(start_line, start_column, length);
        Token::new(kind, position, Span::new(start, self.pos), lexeme)
    }

    fn lex_identifier(&mut self, start: usize, start_line: u32, start_column: u32) -> Token {
        while let Some(b) = self.peek() {
            if is_ident_continue(b) {
                self.advance();
            } else {
                break;
            }
        }
        let lexeme = String::from_utf8_lossy(&self.bytes[start..self.pos]).to_string();
        if let Some(kw) = lookup_keyword(&lexeme) {
            let tok = self.make(kw, start, start_line, start_column);
            return match tok.kind {
                TokenKind::True => tok.with_value(LiteralValue::Bool(true)),
                TokenKind::False => tok.with_value(LiteralValue::Bool(false)),
                _ => tok,
            };
        }
        self.make(TokenKind::Identifier, start, start_line, start_column)
    }

    /// Numeric literal recognition is longest-match: decimal, `0x` hex,
    /// `0b` binary, `0o` octal, all accepting `_` digit separators, plus
    /// float fractions/exponents and `..`/`..=` range literals.
    fn lex_number(&mut self, start: usize, start_line: u32, start_column: u32) -> Token {
        let radix = if self.peek() == Some(b'0') {
            match self.peek_at(1) {
                Some(b'x') | Some(b'X') => Some((16, 2)),
                Some(b'b') | Some(b'B') => Some((2, 2)),
                Some(b'o') | Some(b'O') => Some((8, 2)),
                _ => None,
            }
        } else {
            None
        };

        if let Some((radix, prefix_len)) = radix {
            for _ in 0..prefix_len {
                self.advance();
            }
            let digits_start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'_' || (b as char).is_digit(radix) {
                    self.advance();
                } else {
                    break;
                }
            }
            let digits: String = self.bytes[digits_start..self.pos]
                .iter()
                .map(|&b| b as char)
                .filter(|&c| c != '_')
                .collect();
            if digits.is_empty() {
                let tok = self.make(TokenKind::Error, start, start_line, start_column);
                let message = "invalid numeric literal: no digits after radix prefix".to_string();
                self.report(&tok.position, &message);
                return tok.with_error(message);
            }
            match i64::from_str_radix(&digits, radix) {
                Ok(value) => self
                    .make(TokenKind::IntLiteral, start, start_line, start_column)
                    .with_value(LiteralValue::Int(value)),
                Err(_) => {
                    let tok = self.make(TokenKind::Error, start, start_line, start_column);
                    let message = format!(
                        "invalid {} digit in numeric literal",
                        match radix {
                            2 => "binary",
                            8 => "octal",
                            16 => "hex",
                            _ => "numeric",
                        }
                    );
                    self.report(&tok.position, &message);
                    tok.with_error(message)
                }
            }
        } else {
            self.lex_decimal_or_float(start, start_line, start_column)
        }
    }

    fn consume_decimal_digits(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || b == b'_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn lex_decimal_or_float(&mut self, start: usize, start_line: u32, start_column: u32) -> Token {
        self.consume_decimal_digits();

        let mut is_float = false;
        if self.peek() == Some(b'.')
            && self.peek_at(1).map(|b| b.is_ascii_digit()).unwrap_or(false)
        {
            is_float = true;
            self.advance();
            self.consume_decimal_digits();
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let save = (self.pos, self.line, self.column);
            self.advance();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.advance();
            }
            if self.peek().map(|b| b.is_ascii_digit()).unwrap_or(false) {
                is_float = true;
                self.consume_decimal_digits();
            } else {
                (self.pos, self.line, self.column) = save;
            }
        }

        let digits: String = self.bytes[start..self.pos]
            .iter()
            .map(|&b| b as char)
            .filter(|&c| c != '_')
            .collect();

        if is_float {
            match digits.parse::<f64>() {
                Ok(value) => self
                    .make(TokenKind::FloatLiteral, start, start_line, start_column)
                    .with_value(LiteralValue::Float(value)),
                Err(_) => {
                    let tok = self.make(TokenKind::Error, start, start_line, start_column);
                    let message = "invalid float literal".to_string();
                    self.report(&tok.position, &message);
                    tok.with_error(message)
                }
            }
        } else {
            match digits.parse::<i64>() {
                Ok(value) => self
                    .make(TokenKind::IntLiteral, start, start_line, start_column)
                    .with_value(LiteralValue::Int(value)),
                Err(_) => {
                    let tok = self.make(TokenKind::Error, start, start_line, start_column);
                    let message = "integer literal too large for 64 bits".to_string();
                    self.report(&tok.position, &message);
                    tok.with_error(message)
                }
            }
        }
    }

    fn lex_string(&mut self, start: usize, start_line: u32, start_column: u32) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let tok = self.make(TokenKind::Error, start, start_line, start_column);
                    let message = "unterminated string literal".to_string();
                    self.report(&tok.position, &message);
                    return tok.with_error(message);
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    match self.decode_escape() {
                        Ok(c) => value.push(c),
                        Err(message) => {
                            let tok = self.make(TokenKind::Error, start, start_line, start_column);
                            self.report(&tok.position, &message);
                            return tok.with_error(message);
                        }
                    }
                }
                Some(_) => {
                    let ch_start = self.pos;
                    self.advance();
                    // Pull in the rest of a multi-byte UTF-8 sequence.
                    while self.peek().map(|b| b & 0xC0 == 0x80).unwrap_or(false) {
                        self.advance();
                    }
                    value.push_str(&String::from_utf8_lossy(&self.bytes[ch_start..self.pos]));
                }
            }
        }
        self.make(TokenKind::StringLiteral, start, start_line, start_column)
            .with_value(LiteralValue::Str(value))
    }

    fn decode_escape(&mut self) -> Result<char, String> {
        let Some(b) = self.peek() else {
            return Err("unterminated escape sequence".to_string());
        };
        match b {
            b'n' => {
                self.advance();
                Ok('\n')
            }
            b't' => {
                self.advance();
                Ok('\t')
            }
            b'r' => {
                self.advance();
                Ok('\r')
            }
            b'"' => {
                self.advance();
                Ok('"')
            }
            b'\'' => {
                self.advance();
                Ok('\'')
            }
            b'\\' => {
                self.advance();
                Ok('\\')
            }
            b'u' => {
                self.advance();
                self.decode_unicode_escape(4)
            }
            b'U' => {
                self.advance();
                self.decode_unicode_escape(8)
            }
            other => Err(format!("invalid escape sequence '\\{}'", other as char)),
        }
    }

    fn decode_unicode_escape(&mut self, digits: usize) -> Result<char, String> {
        let start = self.pos;
        for _ in 0..digits {
            match self.peek() {
                Some(b) if b.is_ascii_hexdigit() => {
                    self.advance();
                }
                _ => return Err("invalid unicode escape: expected hex digits".to_string()),
            }
        }
        let text = String::from_utf8_lossy(&self.bytes[start..self.pos]);
        let code = u32::from_str_radix(&text, 16).map_err(|_| "invalid unicode escape".to_string())?;
        char::from_u32(code).ok_or_else(|| "unicode escape is not a valid code point".to_string())
    }

    /// Raw strings are backtick-delimited and take bytes verbatim: no
    /// escape processing at all.
    fn lex_raw_string(&mut self, start: usize, start_line: u32, start_column: u32) -> Token {
        self.advance(); // opening backtick
        let body_start = self.pos;
        loop {
            match self.peek() {
                None => {
                    let tok = self.make(TokenKind::Error, start, start_line, start_column);
                    let message = "unterminated raw string literal".to_string();
                    self.report(&tok.position, &message);
                    return tok.with_error(message);
                }
                Some(b'`') => break,
                Some(_) => {
                    self.advance();
                }
            }
        }
        let value = String::from_utf8_lossy(&self.bytes[body_start..self.pos]).to_string();
        self.advance(); // closing backtick
        self.make(TokenKind::StringLiteral, start, start_line, start_column)
            .with_value(LiteralValue::Str(value))
    }

    fn lex_char(&mut self, start: usize, start_line: u32, start_column: u32) -> Token {
        self.advance(); // opening quote
        let value = match self.peek() {
            Some(b'\\') => {
                self.advance();
                match self.decode_escape() {
                    Ok(c) => c,
                    Err(message) => {
                        let tok = self.make(TokenKind::Error, start, start_line, start_column);
                        self.report(&tok.position, &message);
                        return tok.with_error(message);
                    }
                }
            }
            Some(_) => {
                let ch_start = self.pos;
                self.advance();
                while self.peek().map(|b| b & 0xC0 == 0x80).unwrap_or(false) {
                    self.advance();
                }
                String::from_utf8_lossy(&self.bytes[ch_start..self.pos])
                    .chars()
                    .next()
                    .unwrap_or('\u{FFFD}')
            }
            None => {
                let tok = self.make(TokenKind::Error, start, start_line, start_column);
                let message = "unterminated character literal".to_string();
                self.report(&tok.position, &message);
                return tok.with_error(message);
            }
        };
        if self.peek() != Some(b'\'') {
            let tok = self.make(TokenKind::Error, start, start_line, start_column);
            let message = "character literal must contain exactly one code point".to_string();
            self.report(&tok.position, &message);
            return tok.with_error(message);
        }
        self.advance(); // closing quote
        self.make(TokenKind::CharLiteral, start, start_line, start_column)
            .with_value(LiteralValue::Char(value))
    }

    fn lex_operator(&mut self, start: usize, start_line: u32, start_column: u32) -> Token {
        use TokenKind::*;
        let b = self.advance().unwrap();
        let kind = match b {
            b'+' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    PlusEq
                } else {
                    Plus
                }
            }
            b'-' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    MinusEq
                } else if self.peek() == Some(b'>') {
                    self.advance();
                    Arrow
                } else {
                    Minus
                }
            }
            b'*' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    StarEq
                } else {
                    Star
                }
            }
            b'/' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    SlashEq
                } else {
                    Slash
                }
            }
            b'%' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    PercentEq
                } else {
                    Percent
                }
            }
            b'&' => {
                if self.peek() == Some(b'&') {
                    self.advance();
                    AmpAmp
                } else {
                    Amp
                }
            }
            b'|' => {
                if self.peek() == Some(b'|') {
                    self.advance();
                    PipePipe
                } else {
                    Pipe
                }
            }
            b'^' => Caret,
            b'~' => Tilde,
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    BangEq
                } else {
                    Bang
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    EqEq
                } else if self.peek() == Some(b'>') {
                    self.advance();
                    FatArrow
                } else {
                    Assign
                }
            }
            // `<<` / `<=` / `<-` / `<` disambiguation needs only one byte
            // of lookahead beyond the first.
            b'<' => {
                if self.peek() == Some(b'<') {
                    self.advance();
                    Shl
                } else if self.peek() == Some(b'=') {
                    self.advance();
                    LtEq
                } else if self.peek() == Some(b'-') {
                    self.advance();
                    ChanSend
                } else {
                    Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'>') {
                    self.advance();
                    Shr
                } else if self.peek() == Some(b'=') {
                    self.advance();
                    GtEq
                } else {
                    Gt
                }
            }
            // `..` vs `.` disambiguation.
            b'.' => {
                if self.peek() == Some(b'.') {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        DotDotEq
                    } else {
                        DotDot
                    }
                } else {
                    Dot
                }
            }
            b',' => Comma,
            b':' => {
                if self.peek() == Some(b':') {
                    self.advance();
                    ColonColon
                } else {
                    Colon
                }
            }
            b';' => Semicolon,
            b'(' => LParen,
            b')' => RParen,
            b'{' => LBrace,
            b'}' => RBrace,
            b'[' => LBracket,
            b']' => RBracket,
            b'@' => At,
            b'?' => Question,
            other => {
                let tok = self.make(TokenKind::Error, start, start_line, start_column);
                let message = format!("unexpected byte 0x{:02x} ('{}')", other, other as char);
                self.report(&tok.position, &message);
                return tok.with_error(message);
            }
        };
        self.make(kind, start, start_line, start_column)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::from_source("test.cv", source);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            let is_eof = tok.is_eof();
            out.push(tok.kind);
            if is_eof {
                break;
            }
        }
        out
    }

    // S1: `let x = 0xFF_00;` ... the grammar uses `var`, but the
    // hex-with-separator literal behavior is what's under test here.
    #[test]
    fn s1_lexes_hex_literal_with_separator() {
        let mut lexer = Lexer::from_source("test.cv", "var x = 0xFF_00;");
        let toks: Vec<Token> = std::iter::from_fn(|| {
            let t = lexer.next_token();
            if t.is_eof() {
                None
            } else {
                Some(t)
            }
        })
        .collect();
        assert_eq!(toks[0].kind, TokenKind::Var);
        assert_eq!(toks[1].kind, TokenKind::Identifier);
        assert_eq!(toks[2].kind, TokenKind::Assign);
        assert_eq!(toks[3].kind, TokenKind::IntLiteral);
        assert_eq!(toks[3].value, Some(LiteralValue::Int(0xFF00)));
        assert_eq!(toks[4].kind, TokenKind::Semicolon);
    }

    // S2: `var y = 0b12;` should emit an Error token and parsing can
    // continue from the next `;`.
    #[test]
    fn s2_invalid_binary_digit_is_an_error_token() {
        let mut lexer = Lexer::from_source("test.cv", "var y = 0b12;");
        lexer.next_token(); // var
        lexer.next_token(); // y
        lexer.next_token(); // =
        let err = lexer.next_token();
        assert_eq!(err.kind, TokenKind::Error);
        assert!(err
            .error_message
            .as_ref()
            .unwrap()
            .contains("binary"));
        let next = lexer.next_token();
        assert_eq!(next.kind, TokenKind::Semicolon);
    }

    #[test]
    fn lexer_round_trip_positions() {
        let source = "fn add(a: i32) {}";
        let mut lexer = Lexer::from_source("test.cv", source);
        loop {
            let tok = lexer.next_token();
            if tok.is_eof() {
                break;
            }
            let slice = &source.as_bytes()[tok.span.start..tok.span.end];
            assert_eq!(std::str::from_utf8(slice).unwrap(), tok.lexeme);
        }
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(
            kinds("// comment\n/* block */ fn"),
            vec![TokenKind::Fn, TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_block_comment_reports_and_recovers() {
        let mut lexer = Lexer::from_source("test.cv", "/* never closed");
        let tok = lexer.next_token();
        assert!(tok.is_eof());
    }

    #[test]
    fn decodes_string_escapes() {
        let mut lexer = Lexer::from_source("test.cv", r#""a\nb\tc\"d""#);
        let tok = lexer.next_token();
        assert_eq!(tok.value, Some(LiteralValue::Str("a\nb\tc\"d".to_string())));
    }

    #[test]
    fn decodes_unicode_escape() {
        let mut lexer = Lexer::from_source("test.cv", r#""A""#);
        let tok = lexer.next_token();
        assert_eq!(tok.value, Some(LiteralValue::Str("A".to_string())));
    }

    #[test]
    fn raw_string_takes_bytes_verbatim() {
        let mut lexer = Lexer::from_source("test.cv", r#"`a\nb`"#);
        let tok = lexer.next_token();
        assert_eq!(tok.value, Some(LiteralValue::Str("a\\nb".to_string())));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lexer = Lexer::from_source("test.cv", "\"no closing quote");
        let tok = lexer.next_token();
        assert!(tok.is_error());
    }

    #[test]
    fn disambiguates_dot_and_range() {
        assert_eq!(kinds("a.b"), vec![TokenKind::Identifier, TokenKind::Dot, TokenKind::Identifier, TokenKind::Eof]);
        assert_eq!(kinds("a..b"), vec![TokenKind::Identifier, TokenKind::DotDot, TokenKind::Identifier, TokenKind::Eof]);
        assert_eq!(kinds("a..=b"), vec![TokenKind::Identifier, TokenKind::DotDotEq, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn disambiguates_shift_and_comparison() {
        assert_eq!(kinds("<<"), vec![TokenKind::Shl, TokenKind::Eof]);
        assert_eq!(kinds("<="), vec![TokenKind::LtEq, TokenKind::Eof]);
        assert_eq!(kinds("<-"), vec![TokenKind::ChanSend, TokenKind::Eof]);
        assert_eq!(kinds("<"), vec![TokenKind::Lt, TokenKind::Eof]);
    }

    #[test]
    fn float_literal_with_exponent() {
        let mut lexer = Lexer::from_source("test.cv", "1.5e10");
        let tok = lexer.next_token();
        assert_eq!(tok.value, Some(LiteralValue::Float(1.5e10)));
    }

    #[test]
    fn skips_byte_order_mark() {
        let mut source = String::from('\u{FEFF}');
        source.push_str("fn");
        assert_eq!(kinds(&source), vec![TokenKind::Fn, TokenKind::Eof]);
    }

    #[test]
    fn crlf_counts_as_one_line_advance() {
        let mut lexer = Lexer::from_source("test.cv", "a\r\nb");
        lexer.next_token();
        let b = lexer.next_token();
        assert_eq!(b.position.line, 2);
    }

    #[test]
    fn binary_and_octal_literals() {
        let mut lexer = Lexer::from_source("test.cv", "0b1010");
        assert_eq!(lexer.next_token().value, Some(LiteralValue::Int(10)));
        let mut lexer = Lexer::from_source("test.cv", "0o17");
        assert_eq!(lexer.next_token().value, Some(LiteralValue::Int(15)));
    }

    #[test]
    fn keyword_booleans_carry_decoded_value() {
        let mut lexer = Lexer::from_source("test.cv", "true false");
        let t = lexer.next_token();
        assert_eq!(t.value, Some(LiteralValue::Bool(true)));
        let f = lexer.next_token();
        assert_eq!(f.value, Some(LiteralValue::Bool(false)));
    }
}
