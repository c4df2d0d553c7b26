//! Statement nodes.

use corvid_base::{SourcePosition, Symbol};

use crate::decl::Decl;
use crate::expr::Expr;

pub type Block<'a> = &'a [Stmt<'a>];

#[derive(Debug)]
pub struct SwitchCase<'a> {
    /// Empty `values` marks the `default`/`case else` arm.
    pub values: &'a [&'a Expr<'a>],
    pub body: Block<'a>,
}

#[derive(Debug)]
pub struct SelectCase<'a> {
    pub channel_op: &'a Expr<'a>,
    pub binding: Option<Symbol>,
    pub body: Block<'a>,
    /// `true` for the `default:` arm of a `select`, which must not block.
    pub is_default: bool,
}

/// The three shapes of `for`: C-style three-clause, range-based, and the
/// bare `for { ... }` infinite loop (modeled as all three clauses absent).
#[derive(Debug)]
pub enum ForHeader<'a> {
    Classic {
        init: Option<&'a Stmt<'a>>,
        cond: Option<&'a Expr<'a>>,
        post: Option<&'a Stmt<'a>>,
    },
    Range {
        binding: Symbol,
        index_binding: Option<Symbol>,
        iterable: &'a Expr<'a>,
    },
    Infinite,
}

#[derive(Debug)]
pub enum StmtKind<'a> {
    /// A node that failed to parse; recovery resumes at the next
    /// synchronization token and a placeholder of this kind fills the gap.
    Error,
    Expr(&'a Expr<'a>),
    Block(Block<'a>),
    Decl(&'a Decl<'a>),
    If {
        cond: &'a Expr<'a>,
        then_branch: Block<'a>,
        else_branch: Option<&'a Stmt<'a>>,
    },
    For {
        header: ForHeader<'a>,
        body: Block<'a>,
    },
    While {
        cond: &'a Expr<'a>,
        body: Block<'a>,
    },
    Return(Option<&'a Expr<'a>>),
    Break(Option<Symbol>),
    Continue(Option<Symbol>),
    Switch {
        subject: Option<&'a Expr<'a>>,
        cases: &'a [SwitchCase<'a>],
    },
    Select {
        cases: &'a [SelectCase<'a>],
    },
    Defer(&'a Expr<'a>),
    /// `go expr` spawns the call as a worker-pool task.
    Go(&'a Expr<'a>),
    /// `supervise { ... } recover (e) { ... }` fault-isolation block.
    Supervise {
        body: Block<'a>,
        recover_binding: Option<Symbol>,
        recover_body: Option<Block<'a>>,
    },
    /// `try { ... } recover (e) { ... }`, distinct from `Supervise` in that
    /// it doesn't isolate panics across goroutine boundaries, only
    /// propagated `try`-expression errors.
    TryRecover {
        body: Block<'a>,
        recover_binding: Symbol,
        recover_body: Block<'a>,
    },
    Panic(&'a Expr<'a>),
    /// `scope { ... }` binds an implicit allocator scope whose allocations
    /// are freed LIFO when the block exits, including on early return.
    Scope {
        allocator: Option<&'a Expr<'a>>,
        body: Block<'a>,
    },
    Assign {
        target: &'a Expr<'a>,
        value: &'a Expr<'a>,
    },
}

#[derive(Debug)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub position: SourcePosition,
}

impl<'a> Stmt<'a> {
    pub fn new(kind: StmtKind<'a>, position: SourcePosition) -> Self {
        Self { kind, position }
    }

    pub fn error(position: SourcePosition) -> Self {
        Self::new(StmtKind::Error, position)
    }
}
