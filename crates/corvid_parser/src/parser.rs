//! Recursive-descent parser with Pratt expression parsing.
//!
//! The parser never aborts: a malformed declaration, statement, or
//! expression is recorded as a diagnostic and replaced with an `Error`
//! node, and scanning resumes at the next synchronization token (`;`, a
//! closing brace, or a keyword that starts a new declaration/statement).
//! This mirrors the lexer's own "never throw, hand back data" contract.

use std::rc::Rc;

use corvid_ast::{
    AllocatorDecl, AstArena, CallArg, CapabilityDecl, ChannelDecl, CompilationUnit,
    ComptimeDecl, ConstDecl, Decl, DeclKind, EnumDecl, EnumVariant, Expr, ExprKind, Field,
    ForHeader, FunctionDecl, InterfaceDecl, Literal, MethodDecl, MethodSig, ModuleDecl, Param,
    SelectCase, Stmt, StmtKind, StructDecl, SwitchCase, TypeAliasDecl, TypeExpr, UnaryOp, VarDecl,
};
use corvid_base::{DiagnosticBag, Interner, SourcePosition, Symbol};
use corvid_lexer::{Lexer, Token, TokenKind};

use crate::precedence::{binary_op, Precedence};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    arena: &'a AstArena<'a>,
    interner: Interner,
    diagnostics: DiagnosticBag,
    file: Rc<str>,
}

/// The result of parsing a whole file: the tree, the interner that
/// produced its symbols, and any diagnostics collected along the way.
pub struct ParseOutput<'a> {
    pub unit: CompilationUnit<'a>,
    pub interner: Interner,
    pub diagnostics: DiagnosticBag,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a AstArena<'a>, file_name: impl Into<String>, source: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let mut lexer = Lexer::from_source(file_name.clone(), source.into());
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let is_eof = tok.is_eof();
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Self {
            tokens,
            pos: 0,
            arena,
            interner: Interner::new(),
            diagnostics: DiagnosticBag::new(),
            file: Rc::from(file_name.as_str()),
        }
    }

    pub fn parse(mut self) -> ParseOutput<'a> {
        let unit = self.parse_unit();
        ParseOutput {
            unit,
            interner: self.interner,
            diagnostics: self.diagnostics,
        }
    }

    // ----- token stream plumbing -----

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn position(&self) -> SourcePosition {
        self.current().position.clone()
    }

    fn at_eof(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Token {
        if self.check(&kind) {
            self.advance()
        } else {
            let pos = self.position();
            let found = format!("{:?}", self.current_kind());
            self.diagnostics.error(pos, format!("expected {}, found {}", what, found));
            self.current().clone()
        }
    }

    fn symbol(&mut self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    fn expect_identifier(&mut self) -> Symbol {
        if self.check(&TokenKind::Identifier) {
            let tok = self.advance();
            self.symbol(&tok.lexeme)
        } else {
            let pos = self.position();
            self.diagnostics.error(pos, "expected an identifier");
            Symbol::EMPTY
        }
    }

    /// Synchronizes after a parse error: discards tokens until a semicolon
    /// (consumed), a closing brace (not consumed), eof, or a keyword that
    /// starts a new declaration or statement.
    fn synchronize(&mut self) {
        while !self.at_eof() {
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => return,
                TokenKind::Fn
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::Type
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Interface
                | TokenKind::Module
                | TokenKind::Allocator
                | TokenKind::Channel
                | TokenKind::Import
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ----- compilation unit -----

    fn parse_unit(&mut self) -> CompilationUnit<'a> {
        let package = if self.eat(&TokenKind::Package) {
            let name = self.expect_identifier();
            self.eat(&TokenKind::Semicolon);
            name
        } else {
            let pos = self.position();
            self.diagnostics.error(pos, "file must begin with a package clause");
            Symbol::EMPTY
        };

        let mut decls = Vec::new();
        while !self.at_eof() {
            decls.push(self.parse_declaration());
        }
        let declarations = self.arena.alloc_decl_slice(decls);
        CompilationUnit { package, declarations }
    }

    // ----- declarations -----

    fn parse_declaration(&mut self) -> Decl<'a> {
        let pos = self.position();
        match self.current_kind().clone() {
            TokenKind::Import => self.parse_import(pos),
            TokenKind::Comptime => self.parse_comptime_decl(pos),
            TokenKind::Fn => self.parse_fn_or_method_decl(pos, false),
            TokenKind::Var => {
                let decl = self.parse_var_decl_inner();
                self.eat(&TokenKind::Semicolon);
                Decl::new(DeclKind::Var(decl), pos)
            }
            TokenKind::Const => {
                let decl = self.parse_const_decl_inner();
                self.eat(&TokenKind::Semicolon);
                Decl::new(DeclKind::Const(decl), pos)
            }
            TokenKind::Type => self.parse_type_alias(pos),
            TokenKind::Struct => self.parse_struct_decl(pos),
            TokenKind::Enum => self.parse_enum_decl(pos),
            TokenKind::Interface => self.parse_interface_decl(pos),
            TokenKind::Module => self.parse_module_decl(pos),
            TokenKind::Allocator => self.parse_allocator_decl(pos),
            TokenKind::Channel => self.parse_channel_decl(pos),
            TokenKind::At => self.parse_capability_decl(pos),
            _ => {
                let found = format!("{:?}", self.current_kind());
                self.diagnostics.error(pos.clone(), format!("expected a declaration, found {}", found));
                self.synchronize();
                Decl::error(pos)
            }
        }
    }

    fn parse_import(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // import
        let path_tok = self.expect(TokenKind::StringLiteral, "an import path string");
        let path = self.symbol(&path_tok.lexeme);
        self.eat(&TokenKind::Semicolon);
        Decl::new(DeclKind::Import { path, alias: None }, pos)
    }

    fn parse_comptime_decl(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // comptime
        if self.check(&TokenKind::Fn) {
            return self.parse_fn_or_method_decl(pos, true);
        }
        let body = self.parse_block();
        Decl::new(DeclKind::Comptime(ComptimeDecl { body }), pos)
    }

    fn parse_capability_decl(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // @
        let name = self.expect_identifier();
        let mut grants = Vec::new();
        if self.eat(&TokenKind::LParen) {
            if !self.check(&TokenKind::RParen) {
                loop {
                    grants.push(self.expect_identifier());
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "')'");
        }
        self.eat(&TokenKind::Semicolon);
        let grants = self.arena_leak_symbols(grants);
        Decl::new(DeclKind::Capability(CapabilityDecl { name, grants }), pos)
    }

    /// Small helper: capability grant lists and a few other fixed-size
    /// lists are leaked into `'a` via the declaration arena's backing
    /// allocator rather than threading a fourth, symbol-only arena
    /// through the whole parser.
    fn arena_leak_symbols(&self, items: Vec<Symbol>) -> &'a [Symbol] {
        Box::leak(items.into_boxed_slice())
    }

    fn parse_fn_or_method_decl(&mut self, pos: SourcePosition, is_comptime: bool) -> Decl<'a> {
        self.advance(); // fn
        if self.check(&TokenKind::LParen) {
            self.advance();
            let receiver_name = self.expect_identifier();
            let receiver_type = self.parse_type_expr();
            self.expect(TokenKind::RParen, "')'");
            let function = self.parse_function_tail(is_comptime);
            return Decl::new(
                DeclKind::Method(MethodDecl { receiver_name, receiver_type, function }),
                pos,
            );
        }
        let function = self.parse_function_tail(is_comptime);
        Decl::new(DeclKind::Function(function), pos)
    }

    fn parse_function_tail(&mut self, is_comptime: bool) -> FunctionDecl<'a> {
        let name = self.expect_identifier();
        let params = self.parse_params();
        let return_type = if self.eat(&TokenKind::Arrow) {
            Some(self.parse_type_expr())
        } else {
            None
        };
        let body = self.parse_block();
        FunctionDecl { name, params, return_type, body, is_comptime }
    }

    fn parse_params(&mut self) -> &'a [Param<'a>] {
        self.expect(TokenKind::LParen, "'('");
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let position = self.position();
                let name = self.expect_identifier();
                let type_expr = if self.eat(&TokenKind::Colon) {
                    Some(self.parse_type_expr())
                } else {
                    None
                };
                params.push(Param { name, type_expr, position });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'");
        Box::leak(params.into_boxed_slice())
    }

    fn parse_var_decl_inner(&mut self) -> VarDecl<'a> {
        self.advance(); // var
        let name = self.expect_identifier();
        if self.eat(&TokenKind::Comma) {
            // `var v, ok = <-ch;`, the closed-aware channel receive.
            let ok_name = self.expect_identifier();
            self.expect(TokenKind::Assign, "'='");
            let pos = self.position();
            self.expect(TokenKind::ChanSend, "'<-'");
            let channel = self.parse_unary();
            let value = self.arena.alloc_expr(ExprKind::ChannelRecv { channel, ok_binding: Some(ok_name) }, pos);
            return VarDecl { name, type_expr: None, value: Some(value), mutable: true };
        }
        let type_expr = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_expr())
        } else {
            None
        };
        let value = if self.eat(&TokenKind::Assign) {
            Some(self.parse_expression(Precedence::Lowest))
        } else {
            None
        };
        VarDecl { name, type_expr, value, mutable: true }
    }

    fn parse_const_decl_inner(&mut self) -> ConstDecl<'a> {
        self.advance(); // const
        let name = self.expect_identifier();
        let type_expr = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_expr())
        } else {
            None
        };
        self.expect(TokenKind::Assign, "'='");
        let value = self.parse_expression(Precedence::Lowest);
        ConstDecl { name, type_expr, value }
    }

    fn parse_type_alias(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // type
        let name = self.expect_identifier();
        self.expect(TokenKind::Assign, "'='");
        let target = self.parse_type_expr();
        self.eat(&TokenKind::Semicolon);
        Decl::new(DeclKind::TypeAlias(TypeAliasDecl { name, target }), pos)
    }

    fn parse_struct_decl(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // struct
        let name = self.expect_identifier();
        self.expect(TokenKind::LBrace, "'{'");
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let position = self.position();
            let field_name = self.expect_identifier();
            self.expect(TokenKind::Colon, "':'");
            let type_expr = self.parse_type_expr();
            fields.push(Field { name: field_name, type_expr, position });
            if !self.eat(&TokenKind::Comma) {
                self.eat(&TokenKind::Semicolon);
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        let fields = Box::leak(fields.into_boxed_slice());
        Decl::new(DeclKind::Struct(StructDecl { name, fields }), pos)
    }

    fn parse_enum_decl(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // enum
        let name = self.expect_identifier();
        self.expect(TokenKind::LBrace, "'{'");
        let mut variants = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let variant_name = self.expect_identifier();
            let payload = if self.eat(&TokenKind::LParen) {
                let mut types = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    loop {
                        types.push(*self.parse_type_expr());
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "')'");
                Some(&*Box::leak(types.into_boxed_slice()))
            } else {
                None
            };
            variants.push(EnumVariant { name: variant_name, payload });
            if !self.eat(&TokenKind::Comma) {
                self.eat(&TokenKind::Semicolon);
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        let variants = Box::leak(variants.into_boxed_slice());
        Decl::new(DeclKind::Enum(EnumDecl { name, variants }), pos)
    }

    fn parse_interface_decl(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // interface
        let name = self.expect_identifier();
        self.expect(TokenKind::LBrace, "'{'");
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let method_name = self.expect_identifier();
            let params = self.parse_params();
            let return_type = if self.eat(&TokenKind::Arrow) {
                Some(self.parse_type_expr())
            } else {
                None
            };
            methods.push(MethodSig { name: method_name, params, return_type });
            self.eat(&TokenKind::Semicolon);
        }
        self.expect(TokenKind::RBrace, "'}'");
        let methods = Box::leak(methods.into_boxed_slice());
        Decl::new(DeclKind::Interface(InterfaceDecl { name, methods }), pos)
    }

    fn parse_module_decl(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // module
        let name = self.expect_identifier();
        self.expect(TokenKind::LBrace, "'{'");
        let mut decls = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            decls.push(self.parse_declaration());
        }
        self.expect(TokenKind::RBrace, "'}'");
        let body = self.arena.alloc_decl_slice(decls);
        Decl::new(DeclKind::Module(ModuleDecl { name, body }), pos)
    }

    fn parse_key_value_options(&mut self) -> &'a [(Symbol, &'a Expr<'a>)] {
        let mut options = Vec::new();
        if self.eat(&TokenKind::LBrace) {
            while !self.check(&TokenKind::RBrace) && !self.at_eof() {
                let key = self.expect_identifier();
                self.expect(TokenKind::Colon, "':'");
                let value = self.parse_expression(Precedence::Lowest);
                options.push((key, value));
                if !self.eat(&TokenKind::Comma) {
                    self.eat(&TokenKind::Semicolon);
                }
            }
            self.expect(TokenKind::RBrace, "'}'");
        }
        Box::leak(options.into_boxed_slice())
    }

    fn parse_allocator_decl(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // allocator
        let name = self.expect_identifier();
        self.expect(TokenKind::Colon, "':'");
        let kind = self.expect_identifier();
        let options = self.parse_key_value_options();
        self.eat(&TokenKind::Semicolon);
        Decl::new(DeclKind::Allocator(AllocatorDecl { name, kind, options }), pos)
    }

    fn parse_channel_decl(&mut self, pos: SourcePosition) -> Decl<'a> {
        self.advance(); // channel
        let name = self.expect_identifier();
        self.expect(TokenKind::Colon, "':'");
        let element_type = self.parse_type_expr();
        let options = self.parse_key_value_options();
        self.eat(&TokenKind::Semicolon);
        Decl::new(DeclKind::Channel(ChannelDecl { name, element_type, options }), pos)
    }

    // ----- type expressions -----

    fn parse_type_expr(&mut self) -> &'a TypeExpr<'a> {
        let expr = match self.current_kind().clone() {
            TokenKind::Star => {
                self.advance();
                TypeExpr::Pointer(self.parse_type_expr())
            }
            TokenKind::LBracket => {
                self.advance();
                if self.check(&TokenKind::RBracket) {
                    self.advance();
                    TypeExpr::Slice(self.parse_type_expr())
                } else {
                    let len_tok = self.expect(TokenKind::IntLiteral, "an array length");
                    let len = match &len_tok.value {
                        Some(corvid_lexer::LiteralValue::Int(n)) => *n as u64,
                        _ => 0,
                    };
                    self.expect(TokenKind::RBracket, "']'");
                    TypeExpr::Array(self.parse_type_expr(), len)
                }
            }
            TokenKind::Channel => {
                self.advance();
                TypeExpr::Channel(self.parse_type_expr())
            }
            TokenKind::Fn => {
                self.advance();
                self.expect(TokenKind::LParen, "'('");
                let mut params = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    loop {
                        params.push(self.parse_type_expr());
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "')'");
                let ret = if self.eat(&TokenKind::Arrow) {
                    Some(self.parse_type_expr())
                } else {
                    None
                };
                let params: &'a [&'a TypeExpr<'a>] = Box::leak(params.into_boxed_slice());
                TypeExpr::Function { params, ret }
            }
            TokenKind::Identifier => {
                let first = self.expect_identifier();
                if self.eat(&TokenKind::ColonColon) {
                    let name = self.expect_identifier();
                    TypeExpr::Qualified { module: first, name }
                } else {
                    TypeExpr::Named(first)
                }
            }
            _ => {
                let pos = self.position();
                self.diagnostics.error(pos, "expected a type");
                TypeExpr::Named(Symbol::EMPTY)
            }
        };
        Box::leak(Box::new(expr))
    }

    // ----- statements -----

    fn parse_block(&mut self) -> &'a [Stmt<'a>] {
        self.expect(TokenKind::LBrace, "'{'");
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            stmts.push(self.parse_statement());
        }
        self.expect(TokenKind::RBrace, "'}'");
        self.arena.alloc_stmt_slice(stmts)
    }

    fn parse_statement(&mut self) -> Stmt<'a> {
        let pos = self.position();
        match self.current_kind().clone() {
            TokenKind::LBrace => Stmt::new(StmtKind::Block(self.parse_block()), pos),
            TokenKind::Var | TokenKind::Const | TokenKind::Type | TokenKind::Struct
            | TokenKind::Enum | TokenKind::Interface | TokenKind::Fn => {
                let decl = self.parse_declaration();
                let decl = self.arena.alloc_decl(decl.kind, decl.position);
                Stmt::new(StmtKind::Decl(decl), pos)
            }
            TokenKind::If => self.parse_if(pos),
            TokenKind::For => self.parse_for(pos),
            TokenKind::While => self.parse_while(pos),
            TokenKind::Return => self.parse_return(pos),
            TokenKind::Break => {
                self.advance();
                let label = if self.check(&TokenKind::Identifier) {
                    Some(self.expect_identifier())
                } else {
                    None
                };
                self.eat(&TokenKind::Semicolon);
                Stmt::new(StmtKind::Break(label), pos)
            }
            TokenKind::Continue => {
                self.advance();
                let label = if self.check(&TokenKind::Identifier) {
                    Some(self.expect_identifier())
                } else {
                    None
                };
                self.eat(&TokenKind::Semicolon);
                Stmt::new(StmtKind::Continue(label), pos)
            }
            TokenKind::Switch => self.parse_switch(pos),
            TokenKind::Select => self.parse_select(pos),
            TokenKind::Defer => {
                self.advance();
                let expr = self.parse_expression(Precedence::Lowest);
                self.eat(&TokenKind::Semicolon);
                Stmt::new(StmtKind::Defer(expr), pos)
            }
            TokenKind::Go => {
                self.advance();
                let expr = self.parse_expression(Precedence::Lowest);
                if !matches!(expr.kind, ExprKind::Call { .. }) {
                    self.diagnostics.error(expr.position.clone(), "go requires a call expression");
                }
                self.eat(&TokenKind::Semicolon);
                Stmt::new(StmtKind::Go(expr), pos)
            }
            TokenKind::Supervise => self.parse_supervise(pos),
            TokenKind::Try => self.parse_try_recover(pos),
            TokenKind::Panic => {
                self.advance();
                let expr = self.parse_expression(Precedence::Lowest);
                self.eat(&TokenKind::Semicolon);
                Stmt::new(StmtKind::Panic(expr), pos)
            }
            TokenKind::Scope => self.parse_scope(pos),
            _ => self.parse_simple_statement(pos),
        }
    }

    fn parse_if(&mut self, pos: SourcePosition) -> Stmt<'a> {
        self.advance(); // if
        let cond = self.parse_expression(Precedence::Lowest);
        let then_branch = self.parse_block();
        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                let inner = self.parse_statement();
                Some(&*self.arena.alloc_stmt(inner.kind, inner.position))
            } else {
                let body = self.parse_block();
                Some(&*self.arena.alloc_stmt(StmtKind::Block(body), pos.clone()))
            }
        } else {
            None
        };
        Stmt::new(StmtKind::If { cond, then_branch, else_branch }, pos)
    }

    fn parse_for(&mut self, pos: SourcePosition) -> Stmt<'a> {
        self.advance(); // for
        if self.check(&TokenKind::LBrace) {
            let body = self.parse_block();
            return Stmt::new(StmtKind::For { header: ForHeader::Infinite, body }, pos);
        }

        // Range form: `for x in expr { }` or `for x, i in expr { }`.
        if self.check(&TokenKind::Identifier) {
            let checkpoint = self.pos;
            let binding = self.expect_identifier();
            let index_binding = if self.eat(&TokenKind::Comma) {
                Some(self.expect_identifier())
            } else {
                None
            };
            if self.eat(&TokenKind::In) {
                let iterable = self.parse_expression(Precedence::Lowest);
                let body = self.parse_block();
                return Stmt::new(
                    StmtKind::For {
                        header: ForHeader::Range { binding, index_binding, iterable },
                        body,
                    },
                    pos,
                );
            }
            self.pos = checkpoint;
        }

        // Classic `for init; cond; post { }`, with any clause optional.
        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            let stmt = self.parse_simple_statement_no_consume_semicolon();
            Some(&*self.arena.alloc_stmt(stmt.kind, stmt.position))
        };
        self.expect(TokenKind::Semicolon, "';'");
        let cond = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest))
        };
        self.expect(TokenKind::Semicolon, "';'");
        let post = if self.check(&TokenKind::LBrace) {
            None
        } else {
            let stmt = self.parse_simple_statement_no_consume_semicolon();
            Some(&*self.arena.alloc_stmt(stmt.kind, stmt.position))
        };
        let body = self.parse_block();
        Stmt::new(StmtKind::For { header: ForHeader::Classic { init, cond, post }, body }, pos)
    }

    fn parse_while(&mut self, pos: SourcePosition) -> Stmt<'a> {
        self.advance(); // while
        let cond = self.parse_expression(Precedence::Lowest);
        let body = self.parse_block();
        Stmt::new(StmtKind::While { cond, body }, pos)
    }

    fn parse_return(&mut self, pos: SourcePosition) -> Stmt<'a> {
        self.advance(); // return
        let value = if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::RBrace) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest))
        };
        self.eat(&TokenKind::Semicolon);
        Stmt::new(StmtKind::Return(value), pos)
    }

    fn parse_switch(&mut self, pos: SourcePosition) -> Stmt<'a> {
        self.advance(); // switch
        let subject = if self.check(&TokenKind::LBrace) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest))
        };
        self.expect(TokenKind::LBrace, "'{'");
        let mut cases = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let values = if self.eat(&TokenKind::Case) {
                let mut values = Vec::new();
                loop {
                    values.push(self.parse_expression(Precedence::Lowest));
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                Box::leak(values.into_boxed_slice()) as &[_]
            } else {
                self.expect(TokenKind::Default, "'case' or 'default'");
                &[]
            };
            self.expect(TokenKind::Colon, "':'");
            let mut body = Vec::new();
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.at_eof()
            {
                body.push(self.parse_statement());
            }
            let body = self.arena.alloc_stmt_slice(body);
            cases.push(SwitchCase { values, body });
        }
        self.expect(TokenKind::RBrace, "'}'");
        let cases = Box::leak(cases.into_boxed_slice());
        Stmt::new(StmtKind::Switch { subject, cases }, pos)
    }

    fn parse_select(&mut self, pos: SourcePosition) -> Stmt<'a> {
        self.advance(); // select
        self.expect(TokenKind::LBrace, "'{'");
        let mut cases = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let is_default = self.eat(&TokenKind::Default);
            let (channel_op, binding) = if is_default {
                (self.dummy_expr(), None)
            } else {
                self.expect(TokenKind::Case, "'case' or 'default'");
                let binding = if self.check(&TokenKind::Identifier) {
                    let checkpoint = self.pos;
                    let name = self.expect_identifier();
                    if self.eat(&TokenKind::Assign) {
                        Some(name)
                    } else {
                        self.pos = checkpoint;
                        None
                    }
                } else {
                    None
                };
                let channel_op = self.parse_expression(Precedence::Lowest);
                (channel_op, binding)
            };
            self.expect(TokenKind::Colon, "':'");
            let mut body = Vec::new();
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.at_eof()
            {
                body.push(self.parse_statement());
            }
            let body = self.arena.alloc_stmt_slice(body);
            cases.push(SelectCase { channel_op, binding, body, is_default });
        }
        self.expect(TokenKind::RBrace, "'}'");
        let cases = Box::leak(cases.into_boxed_slice());
        Stmt::new(StmtKind::Select { cases }, pos)
    }

    fn dummy_expr(&self) -> &'a Expr<'a> {
        self.arena.alloc_error_expr(SourcePosition::synthetic())
    }

    fn parse_supervise(&mut self, pos: SourcePosition) -> Stmt<'a> {
        self.advance(); // supervise
        let body = self.parse_block();
        let (recover_binding, recover_body) = if self.eat(&TokenKind::Recover) {
            self.expect(TokenKind::LParen, "'('");
            let binding = self.expect_identifier();
            self.expect(TokenKind::RParen, "')'");
            (Some(binding), Some(self.parse_block()))
        } else {
            (None, None)
        };
        Stmt::new(StmtKind::Supervise { body, recover_binding, recover_body }, pos)
    }

    fn parse_try_recover(&mut self, pos: SourcePosition) -> Stmt<'a> {
        self.advance(); // try
        let body = self.parse_block();
        self.expect(TokenKind::Recover, "'recover'");
        self.expect(TokenKind::LParen, "'('");
        let recover_binding = self.expect_identifier();
        self.expect(TokenKind::RParen, "')'");
        let recover_body = self.parse_block();
        Stmt::new(StmtKind::TryRecover { body, recover_binding, recover_body }, pos)
    }

    fn parse_scope(&mut self, pos: SourcePosition) -> Stmt<'a> {
        self.advance(); // scope
        let allocator = if self.eat(&TokenKind::LParen) {
            let expr = self.parse_expression(Precedence::Lowest);
            self.expect(TokenKind::RParen, "')'");
            Some(expr)
        } else {
            None
        };
        let body = self.parse_block();
        Stmt::new(StmtKind::Scope { allocator, body }, pos)
    }

    fn parse_simple_statement(&mut self, pos: SourcePosition) -> Stmt<'a> {
        let stmt = self.parse_simple_statement_no_consume_semicolon_at(pos);
        self.eat(&TokenKind::Semicolon);
        stmt
    }

    fn parse_simple_statement_no_consume_semicolon(&mut self) -> Stmt<'a> {
        let pos = self.position();
        self.parse_simple_statement_no_consume_semicolon_at(pos)
    }

    /// An expression statement, a channel send (`ch <- value`), or a plain
    /// assignment (`target = value`) — these three share a leading
    /// expression and so are disambiguated after parsing it.
    fn parse_simple_statement_no_consume_semicolon_at(&mut self, pos: SourcePosition) -> Stmt<'a> {
        let expr = self.parse_expression(Precedence::Lowest);
        if self.eat(&TokenKind::ChanSend) {
            let value = self.parse_expression(Precedence::Lowest);
            let send = self.arena.alloc_expr(
                ExprKind::ChannelSend { channel: expr, value },
                pos.clone(),
            );
            return Stmt::new(StmtKind::Expr(send), pos);
        }
        if self.eat(&TokenKind::Assign) {
            let value = self.parse_expression(Precedence::Lowest);
            return Stmt::new(StmtKind::Assign { target: expr, value }, pos);
        }
        Stmt::new(StmtKind::Expr(expr), pos)
    }

    // ----- expressions (Pratt parsing) -----

    fn parse_expression(&mut self, min_prec: Precedence) -> &'a Expr<'a> {
        let mut left = self.parse_unary();
        loop {
            let Some((op, prec)) = binary_op(self.current_kind()) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let pos = self.position();
            self.advance();
            // Left-associative: the right-hand side only accepts operators
            // strictly tighter than this one.
            let next_min = match prec {
                Precedence::Lowest => Precedence::LogicalOr,
                Precedence::LogicalOr => Precedence::LogicalAnd,
                Precedence::LogicalAnd => Precedence::Comparison,
                Precedence::Comparison => Precedence::BitOr,
                Precedence::BitOr => Precedence::BitXor,
                Precedence::BitXor => Precedence::BitAnd,
                Precedence::BitAnd => Precedence::Shift,
                Precedence::Shift => Precedence::Additive,
                Precedence::Additive => Precedence::Multiplicative,
                Precedence::Multiplicative => Precedence::Multiplicative,
            };
            let right = self.parse_expression(next_min);
            left = self.arena.alloc_expr(ExprKind::Binary { op, left, right }, pos);
        }
        left
    }

    fn parse_unary(&mut self) -> &'a Expr<'a> {
        let pos = self.position();
        let op = match self.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::ChanSend => Some(UnaryOp::Recv),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary();
            if op == UnaryOp::Recv {
                return self.arena.alloc_expr(ExprKind::ChannelRecv { channel: operand, ok_binding: None }, pos);
            }
            return self.arena.alloc_expr(ExprKind::Unary { op, operand }, pos);
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> &'a Expr<'a> {
        let mut expr = self.parse_primary();
        loop {
            let pos = self.position();
            match self.current_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            let label = if self.check(&TokenKind::Identifier) {
                                let checkpoint = self.pos;
                                let name = self.expect_identifier();
                                if self.eat(&TokenKind::Colon) {
                                    Some(name)
                                } else {
                                    self.pos = checkpoint;
                                    None
                                }
                            } else {
                                None
                            };
                            let value = self.parse_expression(Precedence::Lowest);
                            args.push(CallArg { label, value });
                            if !self.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')'");
                    let args: &'a [CallArg<'a>] = Box::leak(args.into_boxed_slice());
                    expr = self.arena.alloc_expr(ExprKind::Call { callee: expr, args }, pos);
                }
                TokenKind::Dot => {
                    self.advance();
                    if self.eat(&TokenKind::LParen) {
                        let type_expr = self.parse_type_expr();
                        self.expect(TokenKind::RParen, "')'");
                        expr = self.arena.alloc_expr(
                            ExprKind::TypeAssert { target: expr, type_expr },
                            pos,
                        );
                    } else {
                        let field = self.expect_identifier();
                        expr = self.arena.alloc_expr(ExprKind::Selector { target: expr, field }, pos);
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    if self.check(&TokenKind::Colon) {
                        self.advance();
                        let high = if self.check(&TokenKind::RBracket) {
                            None
                        } else {
                            Some(&*self.parse_expression(Precedence::Lowest))
                        };
                        self.expect(TokenKind::RBracket, "']'");
                        expr = self.arena.alloc_expr(
                            ExprKind::Slice { target: expr, low: None, high },
                            pos,
                        );
                        continue;
                    }
                    let first = self.parse_expression(Precedence::Lowest);
                    if self.eat(&TokenKind::Colon) {
                        let high = if self.check(&TokenKind::RBracket) {
                            None
                        } else {
                            Some(&*self.parse_expression(Precedence::Lowest))
                        };
                        self.expect(TokenKind::RBracket, "']'");
                        expr = self.arena.alloc_expr(
                            ExprKind::Slice { target: expr, low: Some(first), high },
                            pos,
                        );
                    } else {
                        self.expect(TokenKind::RBracket, "']'");
                        expr = self.arena.alloc_expr(ExprKind::Index { target: expr, index: first }, pos);
                    }
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_primary(&mut self) -> &'a Expr<'a> {
        let pos = self.position();
        match self.current_kind().clone() {
            TokenKind::IntLiteral => {
                let tok = self.advance();
                let n = match tok.value {
                    Some(corvid_lexer::LiteralValue::Int(n)) => n,
                    _ => 0,
                };
                self.arena.alloc_expr(ExprKind::Literal(Literal::Int(n)), pos)
            }
            TokenKind::FloatLiteral => {
                let tok = self.advance();
                let n = match tok.value {
                    Some(corvid_lexer::LiteralValue::Float(n)) => n,
                    _ => 0.0,
                };
                self.arena.alloc_expr(ExprKind::Literal(Literal::Float(n)), pos)
            }
            TokenKind::StringLiteral => {
                let tok = self.advance();
                let s = match tok.value {
                    Some(corvid_lexer::LiteralValue::Str(s)) => s,
                    _ => String::new(),
                };
                self.arena.alloc_expr(ExprKind::Literal(Literal::Str(s)), pos)
            }
            TokenKind::CharLiteral => {
                let tok = self.advance();
                let c = match tok.value {
                    Some(corvid_lexer::LiteralValue::Char(c)) => c,
                    _ => '\0',
                };
                self.arena.alloc_expr(ExprKind::Literal(Literal::Char(c)), pos)
            }
            TokenKind::True => {
                self.advance();
                self.arena.alloc_expr(ExprKind::Literal(Literal::Bool(true)), pos)
            }
            TokenKind::False => {
                self.advance();
                self.arena.alloc_expr(ExprKind::Literal(Literal::Bool(false)), pos)
            }
            TokenKind::Null => {
                self.advance();
                self.arena.alloc_expr(ExprKind::Literal(Literal::Null), pos)
            }
            TokenKind::Identifier => {
                let name = self.expect_identifier();
                self.arena.alloc_expr(ExprKind::Identifier(name), pos)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(Precedence::Lowest);
                self.expect(TokenKind::RParen, "')'");
                inner
            }
            TokenKind::Fn => self.parse_function_literal(pos),
            TokenKind::Alloc => self.parse_alloc_expr(pos),
            TokenKind::Free => self.parse_free_expr(pos),
            TokenKind::Try => {
                self.advance();
                let inner = self.parse_unary();
                self.arena.alloc_expr(ExprKind::Try { inner }, pos)
            }
            _ if self.check(&TokenKind::ColonColon) => {
                // `::field` referencing an embedded supertype member.
                self.advance();
                let field = self.expect_identifier();
                self.arena.alloc_expr(ExprKind::Super { field }, pos)
            }
            _ => {
                let found = format!("{:?}", self.current_kind());
                self.diagnostics.error(pos.clone(), format!("expected an expression, found {}", found));
                self.advance();
                self.arena.alloc_error_expr(pos)
            }
        }
    }

    fn parse_function_literal(&mut self, pos: SourcePosition) -> &'a Expr<'a> {
        self.advance(); // fn
        let params = self.parse_params();
        let return_type = if self.eat(&TokenKind::Arrow) {
            Some(self.parse_type_expr())
        } else {
            None
        };
        let body = self.parse_block();
        self.arena.alloc_expr(ExprKind::FunctionLiteral { params, return_type, body }, pos)
    }

    fn parse_alloc_expr(&mut self, pos: SourcePosition) -> &'a Expr<'a> {
        self.advance(); // alloc
        let allocator = if self.eat(&TokenKind::LParen) {
            let expr = self.parse_expression(Precedence::Lowest);
            self.expect(TokenKind::RParen, "')'");
            Some(expr)
        } else {
            None
        };
        let type_expr = self.parse_type_expr();
        let count = if self.eat(&TokenKind::LBracket) {
            let count = self.parse_expression(Precedence::Lowest);
            self.expect(TokenKind::RBracket, "']'");
            Some(count)
        } else {
            None
        };
        self.arena.alloc_expr(ExprKind::Alloc { allocator, type_expr, count }, pos)
    }

    fn parse_free_expr(&mut self, pos: SourcePosition) -> &'a Expr<'a> {
        self.advance(); // free
        let allocator = if self.eat(&TokenKind::LParen) {
            let expr = self.parse_expression(Precedence::Lowest);
            self.expect(TokenKind::RParen, "')'");
            Some(expr)
        } else {
            None
        };
        let target = self.parse_expression(Precedence::Lowest);
        self.arena.alloc_expr(ExprKind::Free { allocator, target }, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_ast::DeclKind;

    fn parse(source: &str) -> ParseOutput<'static> {
        let arena: &'static AstArena<'static> = Box::leak(Box::new(AstArena::new()));
        Parser::new(arena, "test.cv", source).parse()
    }

    #[test]
    fn parses_empty_function() {
        let out = parse("package main;\nfn main() {}\n");
        assert!(!out.diagnostics.has_errors());
        assert_eq!(out.unit.declarations.len(), 1);
        assert!(matches!(out.unit.declarations[0].kind, DeclKind::Function(_)));
    }

    #[test]
    fn parses_var_and_arithmetic() {
        let out = parse("package main;\nvar x = 1 + 2 * 3;\n");
        assert!(!out.diagnostics.has_errors());
        match &out.unit.declarations[0].kind {
            DeclKind::Var(v) => {
                let value = v.value.expect("value");
                match &value.kind {
                    ExprKind::Binary { op, .. } => assert_eq!(*op, corvid_ast::BinaryOp::Add),
                    other => panic!("expected top-level Add, got {:?}", other),
                }
            }
            other => panic!("expected Var decl, got {:?}", other),
        }
    }

    #[test]
    fn precedence_climbing_groups_multiplication_first() {
        let out = parse("package main;\nvar x = 1 + 2 * 3;\n");
        let DeclKind::Var(v) = &out.unit.declarations[0].kind else { panic!() };
        let value = v.value.unwrap();
        let ExprKind::Binary { left, right, .. } = &value.kind else { panic!() };
        assert!(matches!(left.kind, ExprKind::Literal(Literal::Int(1))));
        assert!(matches!(right.kind, ExprKind::Binary { .. }));
    }

    #[test]
    fn parses_struct_decl() {
        let out = parse("package main;\nstruct Point { x: i32, y: i32 }\n");
        assert!(!out.diagnostics.has_errors());
        let DeclKind::Struct(s) = &out.unit.declarations[0].kind else { panic!() };
        assert_eq!(s.fields.len(), 2);
    }

    #[test]
    fn parses_if_else_and_while() {
        let out = parse(
            "package main;\nfn f() {\n  if x > 0 { y = 1; } else { y = 2; }\n  while x > 0 { x = x - 1; }\n}\n",
        );
        assert!(!out.diagnostics.has_errors());
    }

    #[test]
    fn parses_classic_for() {
        let out = parse("package main;\nfn f() {\n  var i = 0;\n  for i = 0; i < 10; i = i + 1 {}\n}\n");
        assert!(!out.diagnostics.has_errors());
    }

    #[test]
    fn parses_range_for_without_short_decl() {
        let out = parse("package main;\nfn f() {\n  for item in items { go item(); }\n}\n");
        assert!(!out.diagnostics.has_errors());
    }

    #[test]
    fn parses_channel_send_and_receive() {
        let out = parse(
            "package main;\nchannel ch: i32;\nfn f() {\n  ch <- 1;\n  var v = <-ch;\n}\n",
        );
        assert!(!out.diagnostics.has_errors());
    }

    #[test]
    fn parses_switch_statement() {
        let out = parse(
            "package main;\nfn f() {\n  switch x {\n  case 1: y = 1;\n  default: y = 0;\n  }\n}\n",
        );
        assert!(!out.diagnostics.has_errors());
    }

    #[test]
    fn parses_select_statement() {
        let out = parse(
            "package main;\nchannel a: i32;\nchannel b: i32;\nfn f() {\n  select {\n  case v = <-a: go v();\n  default: panic 1;\n  }\n}\n",
        );
        assert!(!out.diagnostics.has_errors());
    }

    #[test]
    fn parses_supervise_and_try_recover() {
        let out = parse(
            "package main;\nfn f() {\n  supervise { panic 1; } recover (e) {}\n  try { panic 1; } recover (e) {}\n}\n",
        );
        assert!(!out.diagnostics.has_errors());
    }

    #[test]
    fn parses_scope_alloc_free() {
        let out = parse(
            "package main;\nallocator a: arena;\nfn f() {\n  scope(a) {\n    var p = alloc(a) i32;\n    free(a) p;\n  }\n}\n",
        );
        assert!(!out.diagnostics.has_errors());
    }

    #[test]
    fn parses_interface_and_enum() {
        let out = parse(
            "package main;\ninterface Shape {\n  area() -> f64\n}\nenum Op {\n  Add(i32, i32),\n  Nop,\n}\n",
        );
        assert!(!out.diagnostics.has_errors());
        assert_eq!(out.unit.declarations.len(), 2);
    }

    #[test]
    fn recovers_from_malformed_declaration() {
        let out = parse("package main;\n@@@ garbage ;\nfn f() {}\n");
        assert!(out.diagnostics.has_errors());
        assert_eq!(out.unit.declarations.len(), 2);
        assert!(matches!(out.unit.declarations[1].kind, DeclKind::Function(_)));
    }

    #[test]
    fn method_decl_with_receiver() {
        let out = parse("package main;\nstruct Counter { n: i32 }\nfn (c Counter) get() -> i32 { return c.n; }\n");
        assert!(!out.diagnostics.has_errors());
        assert!(matches!(out.unit.declarations[1].kind, DeclKind::Method(_)));
    }

    #[test]
    fn capability_annotation_decl() {
        let out = parse("package main;\n@net(connect, listen);\n");
        assert!(!out.diagnostics.has_errors());
        let DeclKind::Capability(c) = &out.unit.declarations[0].kind else { panic!() };
        assert_eq!(c.grants.len(), 2);
    }
}
