#![cfg_attr(docsrs, feature(doc_cfg))]

//! # corvid-ast
//!
//! The arena-allocated AST node model shared by the parser and the type
//! checker.
//!
//! Nodes reference each other through arena borrows (`&'a Expr<'a>`), never
//! ownership — the tree is built once by the parser and then read (and, for
//! the resolved-type slot, written exactly once) by the checker. Parse
//! failures don't abort the tree: they leave an `Error` node in place so the
//! rest of the file keeps parsing.
//!
//! ```
//! use corvid_ast::{AstArena, ExprKind, Literal};
//! use corvid_base::SourcePosition;
//!
//! let arena = AstArena::new();
//! let expr = arena.alloc_expr(ExprKind::Literal(Literal::Int(42)), SourcePosition::synthetic());
//! assert!(matches!(expr.kind, ExprKind::Literal(Literal::Int(42))));
//! ```

pub mod decl;
pub mod expr;
pub mod stmt;
pub mod typeslot;

pub use decl::{
    AllocatorDecl, CapabilityDecl, ChannelDecl, CompilationUnit, ComptimeDecl, ConstDecl, Decl,
    DeclKind, EnumDecl, EnumVariant, Field, FunctionDecl, InterfaceDecl, MethodDecl, MethodSig,
    ModuleDecl, StructDecl, TypeAliasDecl, VarDecl,
};
pub use expr::{BinaryOp, CallArg, Expr, ExprKind, Literal, Param, TypeExpr, UnaryOp};
pub use stmt::{Block, ForHeader, SelectCase, Stmt, StmtKind, SwitchCase};
pub use typeslot::{TypeId, TypeSlot};

use corvid_base::{Arena, SourcePosition};

/// The three arenas backing a single compilation unit's tree: one per node
/// kind, since [`corvid_base::Arena`] is monomorphic in its element type.
pub struct AstArena<'a> {
    exprs: Arena<Expr<'a>>,
    stmts: Arena<Stmt<'a>>,
    decls: Arena<Decl<'a>>,
}

impl<'a> AstArena<'a> {
    pub fn new() -> Self {
        Self {
            exprs: Arena::new(),
            stmts: Arena::new(),
            decls: Arena::new(),
        }
    }

    pub fn alloc_expr(&'a self, kind: ExprKind<'a>, position: SourcePosition) -> &'a Expr<'a> {
        self.exprs.alloc(Expr::new(kind, position))
    }

    pub fn alloc_error_expr(&'a self, position: SourcePosition) -> &'a Expr<'a> {
        self.exprs.alloc(Expr::error(position))
    }

    pub fn alloc_stmt(&'a self, kind: StmtKind<'a>, position: SourcePosition) -> &'a Stmt<'a> {
        self.stmts.alloc(Stmt::new(kind, position))
    }

    pub fn alloc_error_stmt(&'a self, position: SourcePosition) -> &'a Stmt<'a> {
        self.stmts.alloc(Stmt::error(position))
    }

    pub fn alloc_stmt_slice(&'a self, stmts: Vec<Stmt<'a>>) -> &'a [Stmt<'a>] {
        self.stmts.alloc_slice(stmts)
    }

    pub fn alloc_decl(&'a self, kind: DeclKind<'a>, position: SourcePosition) -> &'a Decl<'a> {
        self.decls.alloc(Decl::new(kind, position))
    }

    pub fn alloc_error_decl(&'a self, position: SourcePosition) -> &'a Decl<'a> {
        self.decls.alloc(Decl::error(position))
    }

    pub fn alloc_decl_slice(&'a self, decls: Vec<Decl<'a>>) -> &'a [Decl<'a>] {
        self.decls.alloc_slice(decls)
    }
}

impl<'a> Default for AstArena<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_base::Symbol;

    #[test]
    fn builds_a_small_expression_tree() {
        let arena = AstArena::new();
        let pos = SourcePosition::synthetic();
        let one = arena.alloc_expr(ExprKind::Literal(Literal::Int(1)), pos.clone());
        let two = arena.alloc_expr(ExprKind::Literal(Literal::Int(2)), pos.clone());
        let sum = arena.alloc_expr(
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: one,
                right: two,
            },
            pos,
        );
        match &sum.kind {
            ExprKind::Binary { op, left, right } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(left.kind, ExprKind::Literal(Literal::Int(1))));
                assert!(matches!(right.kind, ExprKind::Literal(Literal::Int(2))));
            }
            _ => panic!("expected Binary"),
        }
    }

    #[test]
    fn error_nodes_are_distinguishable() {
        let arena = AstArena::new();
        let e = arena.alloc_error_expr(SourcePosition::synthetic());
        assert!(e.is_error());
        assert!(e.resolved_type.get().is_none());
    }

    #[test]
    fn resolved_type_slot_is_write_once_per_node() {
        let arena = AstArena::new();
        let e = arena.alloc_expr(ExprKind::Literal(Literal::Bool(true)), SourcePosition::synthetic());
        e.resolved_type.set(TypeId(3));
        assert_eq!(e.resolved_type.get(), Some(TypeId(3)));
    }

    #[test]
    fn decl_slice_round_trips() {
        let arena = AstArena::new();
        let pos = SourcePosition::synthetic();
        let var = Decl::new(
            DeclKind::Var(VarDecl {
                name: Symbol::EMPTY,
                type_expr: None,
                value: None,
                mutable: true,
            }),
            pos.clone(),
        );
        let slice = arena.alloc_decl_slice(vec![var]);
        assert_eq!(slice.len(), 1);
    }
}
