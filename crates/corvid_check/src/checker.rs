//! The two-pass type checker: hoist every top-level name first, then walk
//! function and method bodies with full knowledge of the program's
//! top-level symbol table. This lets one function call another defined
//! later in the same file without a forward-declaration dance.

use std::collections::HashMap;

use corvid_ast::{
    BinaryOp, Block, CompilationUnit, Decl, DeclKind, Expr, ExprKind, ForHeader, FunctionDecl,
    Literal, MethodDecl, Stmt, StmtKind, TypeExpr, TypeId, UnaryOp,
};
use corvid_base::{DiagnosticBag, Interner, SourcePosition, Symbol};
use corvid_types::{
    missing_methods, promote, satisfies, Binding, BindingKind, EnumVariant as TyEnumVariant,
    MethodSignature, ScopeStack, StructField, Type, TypeTable,
};

pub struct CheckOutput {
    pub table: TypeTable,
    pub diagnostics: DiagnosticBag,
}

pub struct Checker<'i> {
    table: TypeTable,
    scopes: ScopeStack,
    diagnostics: DiagnosticBag,
    interner: &'i Interner,
    /// Top-level type names resolved during the hoist pass.
    type_names: HashMap<Symbol, TypeId>,
    /// Methods registered per receiver type, for interface satisfaction.
    methods_by_type: HashMap<TypeId, Vec<MethodSignature>>,
    /// The return type of the function/method body currently being
    /// checked, consulted by `return` statements.
    current_return: Vec<TypeId>,
}

impl<'i> Checker<'i> {
    pub fn new(interner: &'i Interner) -> Self {
        Self {
            table: TypeTable::new(),
            scopes: ScopeStack::new(),
            diagnostics: DiagnosticBag::new(),
            interner,
            type_names: HashMap::new(),
            methods_by_type: HashMap::new(),
            current_return: Vec::new(),
        }
    }

    pub fn check<'a>(mut self, unit: &CompilationUnit<'a>) -> CheckOutput {
        for decl in unit.declarations {
            self.hoist(decl);
        }
        for decl in unit.declarations {
            self.check_decl_body(decl);
        }
        CheckOutput { table: self.table, diagnostics: self.diagnostics }
    }

    // ----- pass 1: hoist -----

    fn hoist<'a>(&mut self, decl: &Decl<'a>) {
        match &decl.kind {
            DeclKind::TypeAlias(alias) => {
                let target = self.resolve_type(alias.target);
                let id = self.table.intern(Type::Alias { name: alias.name, target });
                self.type_names.insert(alias.name, id);
            }
            DeclKind::Struct(s) => {
                let fields = s
                    .fields
                    .iter()
                    .map(|f| StructField { name: f.name, ty: self.resolve_type(f.type_expr) })
                    .collect();
                let id = self.table.intern(Type::Struct { name: s.name, fields });
                self.type_names.insert(s.name, id);
            }
            DeclKind::Enum(e) => {
                let variants = e
                    .variants
                    .iter()
                    .map(|v| TyEnumVariant {
                        name: v.name,
                        payload: v
                            .payload
                            .map(|tys| tys.iter().map(|t| self.resolve_type(t)).collect())
                            .unwrap_or_default(),
                    })
                    .collect();
                let id = self.table.intern(Type::Enum { name: e.name, variants });
                self.type_names.insert(e.name, id);
            }
            DeclKind::Interface(iface) => {
                let methods = iface
                    .methods
                    .iter()
                    .map(|m| MethodSignature {
                        name: m.name,
                        params: m.params.iter().map(|p| self.resolve_param_type(p)).collect(),
                        ret: m.return_type.map(|t| self.resolve_type(t)).unwrap_or(TypeTable::VOID),
                    })
                    .collect();
                let id = self.table.intern(Type::Interface { name: iface.name, methods });
                self.type_names.insert(iface.name, id);
            }
            DeclKind::Function(f) => {
                let ty = self.function_type(f);
                self.scopes.declare(f.name, Binding { kind: BindingKind::Function, ty });
            }
            DeclKind::Method(m) => {
                let receiver_ty = self.resolve_type(m.receiver_type);
                let sig = MethodSignature {
                    name: m.function.name,
                    params: m.function.params.iter().map(|p| self.resolve_param_type(p)).collect(),
                    ret: m
                        .function
                        .return_type
                        .map(|t| self.resolve_type(t))
                        .unwrap_or(TypeTable::VOID),
                };
                self.methods_by_type.entry(receiver_ty).or_default().push(sig);
            }
            DeclKind::Var(v) => {
                if let Some(value) = v.value {
                    if let ExprKind::ChannelRecv { ok_binding: Some(ok), .. } = value.kind {
                        let recv_ty = self.check_expr(value);
                        let elem_ty = match self.table.get(recv_ty) {
                            Type::Tuple(parts) if parts.len() == 2 => parts[0],
                            _ => TypeTable::ERROR,
                        };
                        self.scopes.declare(v.name, Binding { kind: BindingKind::Var, ty: elem_ty });
                        self.scopes.declare(ok, Binding { kind: BindingKind::Var, ty: TypeTable::BOOL });
                        return;
                    }
                }
                let ty = match v.type_expr {
                    Some(t) => self.resolve_type(t),
                    None => v.value.map(|e| self.infer_literal_only(e)).unwrap_or(TypeTable::ERROR),
                };
                self.scopes.declare(v.name, Binding { kind: BindingKind::Var, ty });
            }
            DeclKind::Const(c) => {
                let ty = match c.type_expr {
                    Some(t) => self.resolve_type(t),
                    None => self.infer_literal_only(c.value),
                };
                self.scopes.declare(c.name, Binding { kind: BindingKind::Const, ty });
            }
            DeclKind::Channel(c) => {
                let elem = self.resolve_type(c.element_type);
                let ty = self.table.intern(Type::Channel(elem));
                self.scopes.declare(c.name, Binding { kind: BindingKind::Var, ty });
            }
            DeclKind::Allocator(alloc) => {
                // Allocators are a runtime handle, not a checker-visible value
                // type; declaring the name avoids spurious "undefined
                // identifier" diagnostics at call sites like `alloc(a) T`.
                self.scopes.declare(alloc.name, Binding { kind: BindingKind::Var, ty: TypeTable::VOID });
            }
            DeclKind::Module(m) => {
                for inner in m.body {
                    self.hoist(inner);
                }
            }
            DeclKind::Comptime(_) | DeclKind::Capability(_) | DeclKind::Import { .. } | DeclKind::Error => {}
        }
    }

    fn function_type<'a>(&mut self, f: &FunctionDecl<'a>) -> TypeId {
        let params = f.params.iter().map(|p| self.resolve_param_type(p)).collect();
        let ret = f.return_type.map(|t| self.resolve_type(t)).unwrap_or(TypeTable::VOID);
        self.table.intern(Type::Function { params, ret })
    }

    fn resolve_param_type<'a>(&mut self, param: &corvid_ast::Param<'a>) -> TypeId {
        match param.type_expr {
            Some(t) => self.resolve_type(t),
            None => TypeTable::ERROR,
        }
    }

    /// Resolves a surface `TypeExpr` into a `TypeId`, reporting and
    /// returning `error` for unknown names.
    fn resolve_type<'a>(&mut self, expr: &TypeExpr<'a>) -> TypeId {
        match *expr {
            TypeExpr::Named(name) => self.resolve_named_type(name),
            TypeExpr::Pointer(inner) => {
                let target = self.resolve_type(inner);
                self.table.intern(Type::Pointer(target))
            }
            TypeExpr::Slice(inner) => {
                let target = self.resolve_type(inner);
                self.table.intern(Type::Slice(target))
            }
            TypeExpr::Array(inner, len) => {
                let target = self.resolve_type(inner);
                self.table.intern(Type::Array(target, len))
            }
            TypeExpr::Channel(inner) => {
                let target = self.resolve_type(inner);
                self.table.intern(Type::Channel(target))
            }
            TypeExpr::Function { params, ret } => {
                let params = params.iter().map(|p| self.resolve_type(p)).collect();
                let ret = ret.map(|r| self.resolve_type(r)).unwrap_or(TypeTable::VOID);
                self.table.intern(Type::Function { params, ret })
            }
            TypeExpr::Qualified { name, .. } => self.resolve_named_type(name),
        }
    }

    fn resolve_named_type(&mut self, name: Symbol) -> TypeId {
        if let Some(&id) = self.type_names.get(&name) {
            return id;
        }
        match self.interner.resolve(name) {
            "i8" => TypeTable::I8,
            "i16" => TypeTable::I16,
            "i32" => TypeTable::I32,
            "i64" => TypeTable::I64,
            "u8" => TypeTable::U8,
            "u16" => TypeTable::U16,
            "u32" => TypeTable::U32,
            "u64" => TypeTable::U64,
            "f32" => TypeTable::F32,
            "f64" => TypeTable::F64,
            "bool" => TypeTable::BOOL,
            "str" => TypeTable::STR,
            "char" => TypeTable::CHAR,
            "void" => TypeTable::VOID,
            other => {
                let message = format!("unknown type '{}'", other);
                self.diagnostics.error(SourcePosition::synthetic(), message);
                TypeTable::ERROR
            }
        }
    }

    /// A restricted initializer-type inference used only while hoisting
    /// top-level `var`/`const` declarations with no explicit type
    /// annotation: literals infer directly, anything else is `error` until
    /// the body pass re-checks it for real.
    fn infer_literal_only<'a>(&self, expr: &Expr<'a>) -> TypeId {
        match &expr.kind {
            ExprKind::Literal(lit) => self.literal_type(lit),
            _ => TypeTable::ERROR,
        }
    }

    fn literal_type(&self, lit: &Literal) -> TypeId {
        match lit {
            Literal::Int(_) => TypeTable::I32,
            Literal::Float(_) => TypeTable::F64,
            Literal::Str(_) => TypeTable::STR,
            Literal::Char(_) => TypeTable::CHAR,
            Literal::Bool(_) => TypeTable::BOOL,
            Literal::Null => TypeTable::VOID,
        }
    }

    // ----- pass 2: check bodies -----

    fn check_decl_body<'a>(&mut self, decl: &Decl<'a>) {
        match &decl.kind {
            DeclKind::Function(f) => self.check_function_body(f),
            DeclKind::Method(m) => self.check_method_body(m),
            DeclKind::Module(m) => {
                for inner in m.body {
                    self.check_decl_body(inner);
                }
            }
            DeclKind::Var(v) => {
                // The closed-aware `v, ok = <-ch` form is already checked and
                // bound during hoisting, where both names are declared at once.
                let already_checked = matches!(
                    v.value.map(|e| &e.kind),
                    Some(ExprKind::ChannelRecv { ok_binding: Some(_), .. })
                );
                if let Some(value) = v.value {
                    if !already_checked {
                        self.check_expr(value);
                    }
                }
            }
            DeclKind::Const(c) => {
                self.check_expr(c.value);
            }
            _ => {}
        }
    }

    fn check_function_body<'a>(&mut self, f: &FunctionDecl<'a>) {
        self.scopes.push_scope();
        for param in f.params.iter() {
            let ty = self.resolve_param_type(param);
            self.scopes.declare(param.name, Binding { kind: BindingKind::Param, ty });
        }
        let ret = f.return_type.map(|t| self.resolve_type(t)).unwrap_or(TypeTable::VOID);
        self.current_return.push(ret);
        self.check_block(f.body);
        self.current_return.pop();
        self.scopes.pop_scope();
    }

    fn check_method_body<'a>(&mut self, m: &MethodDecl<'a>) {
        self.scopes.push_scope();
        let receiver_ty = self.resolve_type(m.receiver_type);
        self.scopes.declare(m.receiver_name, Binding { kind: BindingKind::Param, ty: receiver_ty });
        for param in m.function.params.iter() {
            let ty = self.resolve_param_type(param);
            self.scopes.declare(param.name, Binding { kind: BindingKind::Param, ty });
        }
        let ret = m.function.return_type.map(|t| self.resolve_type(t)).unwrap_or(TypeTable::VOID);
        self.current_return.push(ret);
        self.check_block(m.function.body);
        self.current_return.pop();
        self.scopes.pop_scope();
    }

    fn check_block<'a>(&mut self, block: Block<'a>) {
        self.scopes.push_scope();
        for stmt in block.iter() {
            self.check_stmt(stmt);
        }
        self.scopes.pop_scope();
    }

    fn check_stmt<'a>(&mut self, stmt: &Stmt<'a>) {
        match &stmt.kind {
            StmtKind::Error => {}
            StmtKind::Expr(e) => {
                self.check_expr(e);
            }
            StmtKind::Block(b) => self.check_block(b),
            StmtKind::Decl(d) => {
                self.hoist(d);
                self.check_decl_body(d);
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.expect_bool(cond);
                self.check_block(then_branch);
                if let Some(alt) = else_branch {
                    self.check_stmt(alt);
                }
            }
            StmtKind::For { header, body } => {
                self.scopes.push_scope();
                match header {
                    ForHeader::Classic { init, cond, post } => {
                        if let Some(init) = init {
                            self.check_stmt(init);
                        }
                        if let Some(cond) = cond {
                            self.expect_bool(cond);
                        }
                        if let Some(post) = post {
                            self.check_stmt(post);
                        }
                    }
                    ForHeader::Range { binding, index_binding, iterable } => {
                        let iterable_ty = self.check_expr(iterable);
                        let elem_ty = self.element_type_of(iterable_ty);
                        self.scopes.declare(*binding, Binding { kind: BindingKind::Var, ty: elem_ty });
                        if let Some(idx) = index_binding {
                            self.scopes.declare(*idx, Binding { kind: BindingKind::Var, ty: TypeTable::I64 });
                        }
                    }
                    ForHeader::Infinite => {}
                }
                self.check_block(body);
                self.scopes.pop_scope();
            }
            StmtKind::While { cond, body } => {
                self.expect_bool(cond);
                self.check_block(body);
            }
            StmtKind::Return(value) => {
                let expected = self.current_return.last().copied().unwrap_or(TypeTable::VOID);
                match value {
                    Some(e) => {
                        let got = self.check_expr(e);
                        if got != expected && got != TypeTable::ERROR && expected != TypeTable::ERROR {
                            let message = format!("return type mismatch: expected {}, found {}", expected, got);
                            self.diagnostics.error(e.position.clone(), message);
                        }
                    }
                    None => {
                        if expected != TypeTable::VOID {
                            self.diagnostics.error(stmt.position.clone(), "missing return value");
                        }
                    }
                }
            }
            StmtKind::Break(_) | StmtKind::Continue(_) => {}
            StmtKind::Switch { subject, cases } => {
                if let Some(subject) = subject {
                    self.check_expr(subject);
                }
                for case in cases.iter() {
                    for value in case.values.iter() {
                        self.check_expr(value);
                    }
                    self.check_block(case.body);
                }
            }
            StmtKind::Select { cases } => {
                for case in cases.iter() {
                    if !case.is_default {
                        self.check_expr(case.channel_op);
                    }
                    self.check_block(case.body);
                }
            }
            StmtKind::Defer(e) | StmtKind::Go(e) | StmtKind::Panic(e) => {
                self.check_expr(e);
            }
            StmtKind::Supervise { body, recover_binding, recover_body } => {
                self.check_block(body);
                if let Some(rb) = recover_body {
                    self.scopes.push_scope();
                    if let Some(name) = recover_binding {
                        self.scopes.declare(*name, Binding { kind: BindingKind::Var, ty: TypeTable::STR });
                    }
                    for s in rb.iter() {
                        self.check_stmt(s);
                    }
                    self.scopes.pop_scope();
                }
            }
            StmtKind::TryRecover { body, recover_binding, recover_body } => {
                self.check_block(body);
                self.scopes.push_scope();
                self.scopes.declare(*recover_binding, Binding { kind: BindingKind::Var, ty: TypeTable::STR });
                for s in recover_body.iter() {
                    self.check_stmt(s);
                }
                self.scopes.pop_scope();
            }
            StmtKind::Scope { allocator, body } => {
                if let Some(a) = allocator {
                    self.check_expr(a);
                }
                self.check_block(body);
            }
            StmtKind::Assign { target, value } => {
                let target_ty = self.check_expr(target);
                let value_ty = self.check_expr(value);
                if !self.assignable(target_ty, value_ty) {
                    let message = format!("cannot assign {} to {}", value_ty, target_ty);
                    self.diagnostics.error(value.position.clone(), message);
                }
            }
        }
    }

    fn element_type_of(&self, container: TypeId) -> TypeId {
        match self.table.get(container) {
            Type::Slice(t) | Type::Array(t, _) | Type::Channel(t) => *t,
            _ => TypeTable::ERROR,
        }
    }

    /// `true` if a value of type `value` may be stored where `target` is
    /// expected: exact match, numeric promotion, or a struct satisfying a
    /// target interface type.
    fn assignable(&mut self, target: TypeId, value: TypeId) -> bool {
        if target == TypeId::ERROR || value == TypeId::ERROR {
            return true;
        }
        if target == value {
            return true;
        }
        if promote(&self.table, target, value) == Some(target) {
            return true;
        }
        self.satisfies_interface(value, target)
    }

    fn satisfies_interface(&mut self, concrete: TypeId, iface: TypeId) -> bool {
        if !matches!(self.table.get(iface), Type::Interface { .. }) {
            return false;
        }
        match self.methods_by_type.get(&concrete) {
            Some(methods) => satisfies(&self.table, methods, iface),
            None => false,
        }
    }

    /// Orderable types support `< <= > >=`: numerics and strings. A
    /// strict subset of `is_comparable` (which also allows bool, char,
    /// and pointer identity for `==`/`!=` but not ordering).
    fn is_orderable(&self, ty: TypeId) -> bool {
        self.table.is_numeric(ty) || matches!(self.table.get(ty), Type::Str)
    }

    fn expect_bool<'a>(&mut self, expr: &Expr<'a>) {
        let ty = self.check_expr(expr);
        if ty != TypeTable::BOOL && ty != TypeTable::ERROR {
            let message = format!("expected bool, found {}", ty);
            self.diagnostics.error(expr.position.clone(), message);
        }
    }

    /// Checks `expr`, records its resolved type on the node, and returns
    /// that type.
    fn check_expr<'a>(&mut self, expr: &Expr<'a>) -> TypeId {
        let ty = self.infer_expr(expr);
        expr.resolved_type.set(ty);
        ty
    }

    fn infer_expr<'a>(&mut self, expr: &Expr<'a>) -> TypeId {
        match &expr.kind {
            ExprKind::Error => TypeTable::ERROR,
            ExprKind::Literal(lit) => self.literal_type(lit),
            ExprKind::Identifier(name) => match self.scopes.lookup(*name) {
                Some(binding) => binding.ty,
                None => {
                    let message = format!("undefined identifier '{}'", self.interner.resolve(*name));
                    self.diagnostics.error(expr.position.clone(), message);
                    TypeTable::ERROR
                }
            },
            ExprKind::Binary { op, left, right } => self.infer_binary(expr, *op, left, right),
            ExprKind::Unary { op, operand } => self.infer_unary(expr, *op, operand),
            ExprKind::Call { callee, args } => self.infer_call(expr, callee, args),
            ExprKind::Selector { target, field } => self.infer_selector(target, *field),
            ExprKind::Index { target, index } => {
                self.check_expr(index);
                let target_ty = self.check_expr(target);
                self.element_type_of(target_ty)
            }
            ExprKind::Slice { target, low, high } => {
                if let Some(low) = low {
                    self.check_expr(low);
                }
                if let Some(high) = high {
                    self.check_expr(high);
                }
                let target_ty = self.check_expr(target);
                match self.table.get(target_ty) {
                    Type::Slice(t) | Type::Array(t, _) => {
                        let elem = *t;
                        self.table.intern(Type::Slice(elem))
                    }
                    _ => TypeTable::ERROR,
                }
            }
            ExprKind::ChannelSend { channel, value } => {
                self.check_expr(value);
                self.check_expr(channel);
                TypeTable::VOID
            }
            ExprKind::ChannelRecv { channel, ok_binding } => {
                let channel_ty = self.check_expr(channel);
                let elem_ty = self.element_type_of(channel_ty);
                match ok_binding {
                    Some(_) => self.table.intern(Type::Tuple(vec![elem_ty, TypeTable::BOOL])),
                    None => elem_ty,
                }
            }
            ExprKind::TypeAssert { target, type_expr } => {
                self.check_expr(target);
                self.resolve_type(type_expr)
            }
            ExprKind::FunctionLiteral { params, return_type, body } => {
                self.scopes.push_scope();
                for p in params.iter() {
                    let ty = self.resolve_param_type(p);
                    self.scopes.declare(p.name, Binding { kind: BindingKind::Param, ty });
                }
                let ret = return_type.map(|t| self.resolve_type(t)).unwrap_or(TypeTable::VOID);
                self.current_return.push(ret);
                self.check_block(body);
                self.current_return.pop();
                self.scopes.pop_scope();
                let params = params.iter().map(|p| self.resolve_param_type(p)).collect();
                self.table.intern(Type::Function { params, ret })
            }
            ExprKind::Alloc { allocator, type_expr, count } => {
                if let Some(a) = allocator {
                    self.check_expr(a);
                }
                if let Some(c) = count {
                    self.check_expr(c);
                }
                let target = self.resolve_type(type_expr);
                self.table.intern(Type::Pointer(target))
            }
            ExprKind::Free { allocator, target } => {
                if let Some(a) = allocator {
                    self.check_expr(a);
                }
                self.check_expr(target);
                TypeTable::VOID
            }
            ExprKind::Try { inner } => self.check_expr(inner),
            ExprKind::Super { .. } => TypeTable::ERROR,
        }
    }

    fn infer_binary<'a>(&mut self, expr: &Expr<'a>, op: BinaryOp, left: &Expr<'a>, right: &Expr<'a>) -> TypeId {
        let left_ty = self.check_expr(left);
        let right_ty = self.check_expr(right);
        match op {
            BinaryOp::And | BinaryOp::Or => {
                self.expect_bool(left);
                self.expect_bool(right);
                TypeTable::BOOL
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                let both_known = left_ty != TypeTable::ERROR && right_ty != TypeTable::ERROR;
                if both_known && left_ty != right_ty {
                    let message = format!("cannot compare {} with {}", left_ty, right_ty);
                    self.diagnostics.error(expr.position.clone(), message);
                } else if both_known && !self.table.is_comparable(left_ty) {
                    let message = format!("type {} does not support equality comparison", left_ty);
                    self.diagnostics.error(expr.position.clone(), message);
                }
                TypeTable::BOOL
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                let both_known = left_ty != TypeTable::ERROR && right_ty != TypeTable::ERROR;
                if both_known && left_ty != right_ty {
                    let message = format!("cannot compare {} with {}", left_ty, right_ty);
                    self.diagnostics.error(expr.position.clone(), message);
                } else if both_known && !self.is_orderable(left_ty) {
                    let message = format!("type {} is not ordered (expected a numeric or string type)", left_ty);
                    self.diagnostics.error(expr.position.clone(), message);
                }
                TypeTable::BOOL
            }
            _ => match promote(&self.table, left_ty, right_ty) {
                Some(ty) => ty,
                None => {
                    if left_ty != TypeTable::ERROR && right_ty != TypeTable::ERROR {
                        let message = format!("incompatible operand types {} and {}", left_ty, right_ty);
                        self.diagnostics.error(expr.position.clone(), message);
                    }
                    TypeTable::ERROR
                }
            },
        }
    }

    fn infer_unary<'a>(&mut self, expr: &Expr<'a>, op: UnaryOp, operand: &Expr<'a>) -> TypeId {
        let ty = self.check_expr(operand);
        match op {
            UnaryOp::Not => {
                if ty != TypeTable::BOOL && ty != TypeTable::ERROR {
                    let message = format!("expected bool, found {}", ty);
                    self.diagnostics.error(expr.position.clone(), message);
                }
                TypeTable::BOOL
            }
            UnaryOp::Neg | UnaryOp::BitNot => ty,
            UnaryOp::Recv => self.element_type_of(ty),
        }
    }

    fn infer_call<'a>(&mut self, expr: &Expr<'a>, callee: &Expr<'a>, args: &'a [corvid_ast::CallArg<'a>]) -> TypeId {
        let callee_ty = self.check_expr(callee);
        let arg_types: Vec<(TypeId, SourcePosition)> = args
            .iter()
            .map(|arg| (self.check_expr(arg.value), arg.value.position.clone()))
            .collect();
        match self.table.get(callee_ty).clone() {
            Type::Function { params, ret } => {
                if params.len() != arg_types.len() {
                    let message = format!("expected {} argument(s), found {}", params.len(), arg_types.len());
                    self.diagnostics.error(expr.position.clone(), message);
                } else {
                    for (param_ty, (arg_ty, pos)) in params.iter().zip(arg_types.iter()) {
                        if !self.assignable(*param_ty, *arg_ty) {
                            let message = format!("expected argument of type {}, found {}", param_ty, arg_ty);
                            self.diagnostics.error(pos.clone(), message);
                        }
                    }
                }
                ret
            }
            Type::Error => TypeTable::ERROR,
            _ => {
                self.diagnostics.error(expr.position.clone(), "called value is not a function");
                TypeTable::ERROR
            }
        }
    }

    fn infer_selector<'a>(&mut self, target: &Expr<'a>, field: Symbol) -> TypeId {
        let target_ty = self.check_expr(target);
        match self.table.get(target_ty) {
            Type::Struct { fields, .. } => fields
                .iter()
                .find(|f| f.name == field)
                .map(|f| f.ty)
                .unwrap_or(TypeTable::ERROR),
            _ => TypeTable::ERROR,
        }
    }
}

/// The names of interface methods a concrete type's method set is still
/// missing, for a precise diagnostic rather than a bare yes/no — kept as a
/// thin re-export so callers outside this crate don't need to depend on
/// `corvid_types` directly just to format that message.
pub fn missing_for(table: &TypeTable, methods: &[MethodSignature], iface: TypeId) -> Vec<Symbol> {
    missing_methods(table, methods, iface)
}
