//! Binary operator precedence table for Pratt parsing.

use corvid_ast::BinaryOp;
use corvid_lexer::TokenKind;

/// Binding power, low to high. Unary operators bind tighter than every
/// binary operator; postfix (call/index/slice/selector) binds tighter
/// still and is handled outside this table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    LogicalOr,
    LogicalAnd,
    Comparison,
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Additive,
    Multiplicative,
}

/// Returns the binary operator and its precedence for `kind`, or `None` if
/// `kind` does not start a binary operator.
pub fn binary_op(kind: &TokenKind) -> Option<(BinaryOp, Precedence)> {
    use TokenKind::*;
    Some(match kind {
        PipePipe => (BinaryOp::Or, Precedence::LogicalOr),
        AmpAmp => (BinaryOp::And, Precedence::LogicalAnd),
        EqEq => (BinaryOp::Eq, Precedence::Comparison),
        BangEq => (BinaryOp::NotEq, Precedence::Comparison),
        Lt => (BinaryOp::Lt, Precedence::Comparison),
        LtEq => (BinaryOp::LtEq, Precedence::Comparison),
        Gt => (BinaryOp::Gt, Precedence::Comparison),
        GtEq => (BinaryOp::GtEq, Precedence::Comparison),
        Pipe => (BinaryOp::BitOr, Precedence::BitOr),
        Caret => (BinaryOp::BitXor, Precedence::BitXor),
        Amp => (BinaryOp::BitAnd, Precedence::BitAnd),
        Shl => (BinaryOp::Shl, Precedence::Shift),
        Shr => (BinaryOp::Shr, Precedence::Shift),
        Plus => (BinaryOp::Add, Precedence::Additive),
        Minus => (BinaryOp::Sub, Precedence::Additive),
        Star => (BinaryOp::Mul, Precedence::Multiplicative),
        Slash => (BinaryOp::Div, Precedence::Multiplicative),
        Percent => (BinaryOp::Mod, Precedence::Multiplicative),
        _ => return None,
    })
}
