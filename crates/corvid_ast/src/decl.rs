//! Declaration nodes: the top level of a compilation unit, and anything
//! that introduces a name into a scope.

use corvid_base::{SourcePosition, Symbol};

use crate::expr::{Expr, Param, TypeExpr};
use crate::stmt::Block;

#[derive(Debug)]
pub struct Field<'a> {
    pub name: Symbol,
    pub type_expr: &'a TypeExpr<'a>,
    pub position: SourcePosition,
}

#[derive(Debug)]
pub struct StructDecl<'a> {
    pub name: Symbol,
    pub fields: &'a [Field<'a>],
}

#[derive(Debug)]
pub struct EnumVariant<'a> {
    pub name: Symbol,
    /// Present for tagged-union style enums; absent for plain C-style ones.
    pub payload: Option<&'a [TypeExpr<'a>]>,
}

#[derive(Debug)]
pub struct EnumDecl<'a> {
    pub name: Symbol,
    pub variants: &'a [EnumVariant<'a>],
}

#[derive(Debug)]
pub struct MethodSig<'a> {
    pub name: Symbol,
    pub params: &'a [Param<'a>],
    pub return_type: Option<&'a TypeExpr<'a>>,
}

#[derive(Debug)]
pub struct InterfaceDecl<'a> {
    pub name: Symbol,
    pub methods: &'a [MethodSig<'a>],
}

#[derive(Debug)]
pub struct FunctionDecl<'a> {
    pub name: Symbol,
    pub params: &'a [Param<'a>],
    pub return_type: Option<&'a TypeExpr<'a>>,
    pub body: Block<'a>,
    /// `comptime fn` bodies are evaluated during checking rather than
    /// deferred to a runtime call.
    pub is_comptime: bool,
}

/// A method is a function with an explicit receiver, mirroring how
/// interfaces are satisfied structurally rather than by declared
/// inheritance.
#[derive(Debug)]
pub struct MethodDecl<'a> {
    pub receiver_name: Symbol,
    pub receiver_type: &'a TypeExpr<'a>,
    pub function: FunctionDecl<'a>,
}

#[derive(Debug)]
pub struct VarDecl<'a> {
    pub name: Symbol,
    pub type_expr: Option<&'a TypeExpr<'a>>,
    pub value: Option<&'a Expr<'a>>,
    pub mutable: bool,
}

#[derive(Debug)]
pub struct ConstDecl<'a> {
    pub name: Symbol,
    pub type_expr: Option<&'a TypeExpr<'a>>,
    pub value: &'a Expr<'a>,
}

#[derive(Debug)]
pub struct TypeAliasDecl<'a> {
    pub name: Symbol,
    pub target: &'a TypeExpr<'a>,
}

#[derive(Debug)]
pub struct ModuleDecl<'a> {
    pub name: Symbol,
    pub body: &'a [Decl<'a>],
}

/// `allocator name { strategy: ..., on_failure: ... }`. The fields beyond
/// `name` are kept as raw key/value expressions at the AST level; the
/// checker resolves `kind`/`on_failure` into the enums `corvid_alloc`
/// understands.
#[derive(Debug)]
pub struct AllocatorDecl<'a> {
    pub name: Symbol,
    pub kind: Symbol,
    pub options: &'a [(Symbol, &'a Expr<'a>)],
}

/// `channel name: T { capacity: n, pattern: ... }`.
#[derive(Debug)]
pub struct ChannelDecl<'a> {
    pub name: Symbol,
    pub element_type: &'a TypeExpr<'a>,
    pub options: &'a [(Symbol, &'a Expr<'a>)],
}

/// A `comptime { ... }` top-level block, evaluated once during checking;
/// any declarations it produces are spliced into the enclosing scope.
#[derive(Debug)]
pub struct ComptimeDecl<'a> {
    pub body: Block<'a>,
}

/// `@requires(capability)` attached to a function or module, restricting
/// which callers may invoke it without an explicit capability token.
#[derive(Debug)]
pub struct CapabilityDecl<'a> {
    pub name: Symbol,
    pub grants: &'a [Symbol],
}

#[derive(Debug)]
pub enum DeclKind<'a> {
    Error,
    Function(FunctionDecl<'a>),
    Method(MethodDecl<'a>),
    Var(VarDecl<'a>),
    Const(ConstDecl<'a>),
    TypeAlias(TypeAliasDecl<'a>),
    Struct(StructDecl<'a>),
    Enum(EnumDecl<'a>),
    Interface(InterfaceDecl<'a>),
    Module(ModuleDecl<'a>),
    Allocator(AllocatorDecl<'a>),
    Channel(ChannelDecl<'a>),
    Comptime(ComptimeDecl<'a>),
    Capability(CapabilityDecl<'a>),
    Import { path: Symbol, alias: Option<Symbol> },
}

#[derive(Debug)]
pub struct Decl<'a> {
    pub kind: DeclKind<'a>,
    pub position: SourcePosition,
}

impl<'a> Decl<'a> {
    pub fn new(kind: DeclKind<'a>, position: SourcePosition) -> Self {
        Self { kind, position }
    }

    pub fn error(position: SourcePosition) -> Self {
        Self::new(DeclKind::Error, position)
    }
}

/// The root of a parsed file: a package clause plus its top-level
/// declarations, in source order.
#[derive(Debug)]
pub struct CompilationUnit<'a> {
    pub package: Symbol,
    pub declarations: &'a [Decl<'a>],
}
