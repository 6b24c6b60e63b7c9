use std::{mem, slice, sync::Arc};

use goflow_ast::{
    AssignStmt, Block, CaseClause, Decl, DeclTok, Expr, ExprKind, ForStmt, FuncDecl, GenDecl,
    Ident, IfStmt, RangeStmt, Span, Spec, Stmt, StmtKind, TypeSwitchStmt, ValueSpec,
};

use super::labels::{exits_loop, goto_targets, loop_body};
use crate::{build, ctx::SimplifyCtx, diag::OptionExt};

impl SimplifyCtx<'_> {
    /// Simplifies a top-level declaration.
    pub(crate) fn decl(&mut self, decl: &Decl) -> Decl {
        match decl {
            Decl::Func(func) => Decl::Func(FuncDecl {
                recv: func.recv.clone(),
                name: func.name.clone(),
                ty: func.ty.clone(),
                body: func.body.as_ref().map(|body| self.func_body(body)),
                span: func.span,
            }),
            Decl::Gen(decl) => Decl::Gen(self.package_decl(decl)),
        }
    }

    /// Package-level initializers have no statement list to
    /// receive temporaries, so they are simplified without
    /// hoisting. Function literals in them still hoist in their
    /// own bodies.
    fn package_decl(&mut self, decl: &GenDecl) -> GenDecl {
        let hoist_calls = mem::replace(&mut self.hoist_calls, false);
        let mut prefix = Vec::new();
        let decl = self.gen_decl(decl, &mut prefix);
        self.hoist_calls = hoist_calls;
        if let Some(stmt) = prefix.first() {
            self.dcx
                .emit_span_bug(stmt.span, "package-level initializer produced statements");
        }
        decl
    }

    fn gen_decl(&mut self, decl: &GenDecl, prefix: &mut Vec<Stmt>) -> GenDecl {
        if decl.tok != DeclTok::Var {
            return decl.clone();
        }
        let specs = decl
            .specs
            .iter()
            .map(|spec| match spec {
                Spec::Value(spec) => Spec::Value(ValueSpec {
                    names: spec.names.clone(),
                    ty: spec.ty.clone(),
                    values: self.values(&spec.values, prefix),
                }),
                Spec::Import(_) | Spec::Type(_) => spec.clone(),
            })
            .collect();
        GenDecl {
            tok: decl.tok,
            specs,
            span: decl.span,
        }
    }

    /// Simplifies the body of a function or function literal.
    /// Labels and the hoisting setting belong to the innermost
    /// function.
    pub(crate) fn func_body(&mut self, body: &Block) -> Block {
        let hoist_calls = mem::replace(&mut self.hoist_calls, self.hoist_requested);
        let gotos = mem::replace(&mut self.goto_targets, goto_targets(body));
        let body = self.block(body);
        self.hoist_calls = hoist_calls;
        self.goto_targets = gotos;
        body
    }

    pub(crate) fn block(&mut self, block: &Block) -> Block {
        Block::new(self.stmts(&block.stmts), block.span)
    }

    /// Simplifies a statement list.
    pub(crate) fn stmts(&mut self, stmts: &[Stmt]) -> Vec<Stmt> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            self.stmt(stmt, &mut out);
        }
        out
    }

    /// Appends the simplified form of `stmt` to `out`.
    pub(crate) fn stmt(&mut self, stmt: &Stmt, out: &mut Vec<Stmt>) {
        let span = stmt.span;
        let kind = match &stmt.kind {
            StmtKind::Empty | StmtKind::Branch(_) => stmt.kind.clone(),
            StmtKind::Decl(decl) => StmtKind::Decl(self.gen_decl(decl, out)),
            StmtKind::Labeled(label, inner) => return self.labeled(label, inner, span, out),
            StmtKind::Expr(x) => StmtKind::Expr(self.expr(x, out, true)),
            StmtKind::Send(chan, value) => {
                let chan = self.operand(chan, out);
                let value = self.operand(value, out);
                StmtKind::Send(chan, value)
            }
            StmtKind::IncDec(x, op) => StmtKind::IncDec(self.operand(x, out), *op),
            StmtKind::Assign(assign) => {
                let lhs = self.operands(&assign.lhs, out);
                let rhs = assign
                    .rhs
                    .iter()
                    .map(|x| self.expr(x, out, true))
                    .collect();
                StmtKind::Assign(AssignStmt {
                    lhs,
                    op: assign.op,
                    rhs,
                })
            }
            StmtKind::Go(call) => StmtKind::Go(self.launched_call(call, "go", out)),
            StmtKind::Defer(call) => StmtKind::Defer(self.launched_call(call, "defer", out)),
            StmtKind::Return(results) => StmtKind::Return(self.values(results, out)),
            StmtKind::Block(block) => StmtKind::Block(self.block(block)),
            StmtKind::If(s) => return self.if_stmt(s, span, out),
            StmtKind::Switch(s) => return self.switch(s, span, out),
            StmtKind::TypeSwitch(s) => return self.type_switch(s, span, out),
            StmtKind::Select(s) => return self.select(s, span, out),
            StmtKind::For(s) => StmtKind::For(self.for_stmt(s, out)),
            StmtKind::Range(s) => {
                let x = self.operand(&s.x, out);
                StmtKind::Range(RangeStmt {
                    key: s.key.clone(),
                    value: s.value.clone(),
                    define: s.define,
                    x,
                    body: self.block(&s.body),
                })
            }
        };
        out.push(Stmt::new(kind, span));
    }

    /// The operand of `go` and `defer` must stay a single call.
    fn launched_call(&mut self, x: &Arc<Expr>, keyword: &str, out: &mut Vec<Stmt>) -> Arc<Expr> {
        match &x.kind {
            ExprKind::Call(call) => {
                let call = self.call(call, out);
                Arc::new(x.rebuild(ExprKind::Call(call)))
            }
            _ => self
                .dcx
                .emit_span_bug(x.span, format!("`{keyword}` operand is not a call")),
        }
    }

    /// Runs `f` in the scope opened by an `init` statement.
    fn with_init_scope(
        &mut self,
        init: Option<&Stmt>,
        span: Span,
        out: &mut Vec<Stmt>,
        f: impl FnOnce(&mut Self, &mut Vec<Stmt>),
    ) {
        match init {
            None => f(self, out),
            Some(init) => {
                let mut scope = Vec::new();
                self.stmt(init, &mut scope);
                f(self, &mut scope);
                out.push(build::block(scope, span));
            }
        }
    }

    fn if_stmt(&mut self, s: &IfStmt, span: Span, out: &mut Vec<Stmt>) {
        self.with_init_scope(s.init.as_deref(), span, out, |this, out| {
            let cond = this.operand(&s.cond, out);
            let body = this.block(&s.body);
            let els = s.els.as_deref().and_then(|els| {
                let stmts = this.stmts(slice::from_ref(els));
                build::else_branch(stmts, els.span)
            });
            out.push(Stmt::new(
                StmtKind::If(IfStmt {
                    init: None,
                    cond,
                    body,
                    els,
                }),
                span,
            ));
        });
    }

    fn type_switch(&mut self, s: &TypeSwitchStmt, span: Span, out: &mut Vec<Stmt>) {
        self.with_init_scope(s.init.as_deref(), span, out, |this, out| {
            let guard = match &s.guard.kind {
                ExprKind::TypeAssert(x, None) => {
                    let x = this.operand(x, out);
                    Arc::new(s.guard.rebuild(ExprKind::TypeAssert(x, None)))
                }
                _ => this
                    .dcx
                    .emit_span_bug(s.guard.span, "type switch guard is not a `.(type)` assertion"),
            };
            let clauses = s
                .clauses
                .iter()
                .map(|clause| CaseClause {
                    list: clause.list.clone(),
                    body: this.stmts(&clause.body),
                    span: clause.span,
                })
                .collect();
            out.push(Stmt::new(
                StmtKind::TypeSwitch(TypeSwitchStmt {
                    init: None,
                    bind: s.bind.clone(),
                    guard,
                    clauses,
                }),
                span,
            ));
        });
    }

    /// Statements needed by `init` go before the loop, since
    /// `init` runs once. `post` is kept. A condition that needs
    /// statements moves into the body:
    ///
    /// ```text
    /// for init; ; post {
    ///     _1 := f()
    ///     if !_1 {
    ///         break
    ///     }
    ///     body
    /// }
    /// ```
    fn for_stmt(&mut self, s: &ForStmt, out: &mut Vec<Stmt>) -> ForStmt {
        let init = s.init.as_deref().map(|init| {
            let mut stmts = Vec::new();
            self.stmt(init, &mut stmts);
            let init = stmts
                .pop()
                .unwrap_or_bug(self.dcx, "`for` init statement simplified to nothing");
            out.extend(stmts);
            Box::new(init)
        });
        let mut head = Vec::new();
        let cond = s.cond.as_ref().map(|cond| self.operand(cond, &mut head));
        let body = self.block(&s.body);
        if head.is_empty() {
            return ForStmt {
                init,
                cond,
                post: s.post.clone(),
                body,
            };
        }
        if let Some(cond) = cond {
            let span = cond.span;
            head.push(build::if_(build::not(cond), vec![build::brk(span)], None, span));
        }
        head.extend(body.stmts);
        ForStmt {
            init,
            cond: None,
            post: s.post.clone(),
            body: Block::new(head, body.span),
        }
    }

    /// Re-attaches `label` to whatever `inner` simplified to.
    ///
    /// `break` and `continue` need the label on the loop or
    /// breakable statement itself. When statements precede a
    /// labeled `select` or type switch, everything moves into a
    /// labeled breakable wrapper so that `break label` and
    /// `goto label` both keep their meaning. A loop keeps the
    /// label if its body uses it, which moves a `goto` target past
    /// the loop's prefix statements, so that combination is an
    /// ICE. Anything else is only a `goto` target and the label
    /// goes on the first statement.
    fn labeled(&mut self, label: &Ident, inner: &Stmt, span: Span, out: &mut Vec<Stmt>) {
        let attach = |stmt: Stmt| Stmt::new(StmtKind::Labeled(label.clone(), Box::new(stmt)), span);

        let mut stmts = Vec::new();
        self.stmt(inner, &mut stmts);

        let breakable = matches!(inner.kind, StmtKind::TypeSwitch(_) | StmtKind::Select(_));
        let scoped = matches!(&inner.kind, StmtKind::TypeSwitch(s) if s.init.is_some());
        let loop_exit = loop_body(inner).is_some_and(|body| exits_loop(body, &label.name));
        match stmts.len() {
            0 => out.push(attach(Stmt::new(StmtKind::Empty, span))),
            1 if !scoped => out.extend(stmts.into_iter().map(&attach)),
            _ if breakable => {
                let body = if scoped { unscope(stmts) } else { stmts };
                out.push(attach(build::breakable(body, span)));
            }
            _ if loop_exit => {
                if self.goto_targets.contains(&label.name) {
                    self.dcx.emit_span_bug(
                        span,
                        format!(
                            "label `{}` is used by `goto` and by its loop, which needs statements before it",
                            label.name
                        ),
                    );
                }
                if let Some(last) = stmts.pop() {
                    out.extend(stmts);
                    out.push(attach(last));
                }
            }
            _ => {
                let mut stmts = stmts.into_iter();
                if let Some(first) = stmts.next() {
                    out.push(attach(first));
                }
                out.extend(stmts);
            }
        }
    }
}

/// Unwraps the block an `init` statement was scoped into. The
/// clause of a breakable wrapper is a scope of its own.
fn unscope(stmts: Vec<Stmt>) -> Vec<Stmt> {
    match <[Stmt; 1]>::try_from(stmts) {
        Ok(
            [
                Stmt {
                    kind: StmtKind::Block(block),
                    ..
                },
            ],
        ) => block.stmts,
        Ok([stmt]) => vec![stmt],
        Err(stmts) => stmts,
    }
}
