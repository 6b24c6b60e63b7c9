//! Helpers for building syntax trees without a parser.
//!
//! Every expression gets a fresh [`NodeId`][crate::NodeId] and
//! an empty span.
//!
//! ```
//! use goflow_ast::dsl::*;
//!
//! // if f() && g() { h() }
//! let stmt = if_(and(call("f", []), call("g", [])), [expr_stmt(call("h", []))], None);
//! assert_eq!(stmt.to_string(), "if f() && g() {\n\th()\n}");
//! ```

use alloc::{boxed::Box, format, string::String, sync::Arc, vec::Vec};

use crate::{
    AssignOp, AssignStmt, BinaryOp, Block, BranchStmt, BranchTok, CallExpr, CaseClause, Comm,
    CommClause, CompositeLit, Decl, DeclTok, Element, Expr, ExprKind, File, FuncDecl, FuncLit,
    FuncType, GenDecl, Ident, IfStmt, IncDecOp, Lit, LitKind, RangeStmt, RecvStmt, SelectStmt,
    SliceExpr, Span, Spec, Stmt, StmtKind, SwitchStmt, TypeSwitchStmt, UnaryOp, ValueSpec,
};

fn expr(kind: ExprKind) -> Arc<Expr> {
    Arc::new(Expr::new(kind, Span::empty()))
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::empty())
}

fn stmts(body: impl IntoIterator<Item = Stmt>) -> Vec<Stmt> {
    body.into_iter().collect()
}

/// An identifier.
pub fn name(name: &str) -> Ident {
    Ident::new(name, Span::empty())
}

/// An identifier expression.
pub fn ident(n: &str) -> Arc<Expr> {
    expr(ExprKind::Ident(name(n)))
}

/// An integer literal.
pub fn int(v: i64) -> Arc<Expr> {
    expr(ExprKind::BasicLit(Lit {
        kind: LitKind::Int,
        value: format!("{v}"),
    }))
}

/// An interpreted string literal.
pub fn string(s: &str) -> Arc<Expr> {
    expr(ExprKind::BasicLit(Lit {
        kind: LitKind::String,
        value: format!("{s:?}"),
    }))
}

/// `fun(args...)`
pub fn call_expr(fun: Arc<Expr>, args: impl IntoIterator<Item = Arc<Expr>>) -> Arc<Expr> {
    expr(ExprKind::Call(CallExpr {
        fun,
        args: args.into_iter().collect(),
        ellipsis: false,
    }))
}

/// `name(args...)`
pub fn call(fun: &str, args: impl IntoIterator<Item = Arc<Expr>>) -> Arc<Expr> {
    call_expr(ident(fun), args)
}

/// `op x`
pub fn unary(op: UnaryOp, x: Arc<Expr>) -> Arc<Expr> {
    expr(ExprKind::Unary(op, x))
}

/// `!x`
pub fn not(x: Arc<Expr>) -> Arc<Expr> {
    unary(UnaryOp::Not, x)
}

/// `<-ch`
pub fn recv(ch: Arc<Expr>) -> Arc<Expr> {
    unary(UnaryOp::Recv, ch)
}

/// `x op y`
pub fn binary(op: BinaryOp, x: Arc<Expr>, y: Arc<Expr>) -> Arc<Expr> {
    expr(ExprKind::Binary(op, x, y))
}

/// `x && y`
pub fn and(x: Arc<Expr>, y: Arc<Expr>) -> Arc<Expr> {
    binary(BinaryOp::LAnd, x, y)
}

/// `x || y`
pub fn or(x: Arc<Expr>, y: Arc<Expr>) -> Arc<Expr> {
    binary(BinaryOp::LOr, x, y)
}

/// `x == y`
pub fn eq(x: Arc<Expr>, y: Arc<Expr>) -> Arc<Expr> {
    binary(BinaryOp::Eql, x, y)
}

/// `(x)`
pub fn paren(x: Arc<Expr>) -> Arc<Expr> {
    expr(ExprKind::Paren(x))
}

/// `*x`
pub fn star(x: Arc<Expr>) -> Arc<Expr> {
    expr(ExprKind::Star(x))
}

/// `x.sel`
pub fn selector(x: Arc<Expr>, sel: &str) -> Arc<Expr> {
    expr(ExprKind::Selector(x, name(sel)))
}

/// `x[index]`
pub fn index(x: Arc<Expr>, index: Arc<Expr>) -> Arc<Expr> {
    expr(ExprKind::Index(x, index))
}

/// `x[low:high]`
pub fn slice(x: Arc<Expr>, low: Option<Arc<Expr>>, high: Option<Arc<Expr>>) -> Arc<Expr> {
    expr(ExprKind::Slice(SliceExpr {
        x,
        low,
        high,
        max: None,
        slice3: false,
    }))
}

/// `x.(ty)`, or `x.(type)` when `ty` is `None`
pub fn type_assert(x: Arc<Expr>, ty: Option<Arc<Expr>>) -> Arc<Expr> {
    expr(ExprKind::TypeAssert(x, ty))
}

/// A `value` or `key: value` composite literal element.
pub fn element(key: Option<Arc<Expr>>, value: Arc<Expr>) -> Element {
    Element { key, value }
}

/// `ty{elts...}`
pub fn composite(ty: Option<Arc<Expr>>, elts: impl IntoIterator<Item = Element>) -> Arc<Expr> {
    expr(ExprKind::CompositeLit(CompositeLit {
        ty,
        elts: elts.into_iter().collect(),
    }))
}

/// `func() { body }`
pub fn func_lit(body: impl IntoIterator<Item = Stmt>) -> Arc<Expr> {
    expr(ExprKind::FuncLit(FuncLit {
        ty: FuncType::default(),
        body: Block::new(stmts(body), Span::empty()),
    }))
}

/// An expression statement.
pub fn expr_stmt(x: Arc<Expr>) -> Stmt {
    stmt(StmtKind::Expr(x))
}

/// `lhs op rhs`
pub fn assign_op(
    lhs: impl IntoIterator<Item = Arc<Expr>>,
    op: AssignOp,
    rhs: impl IntoIterator<Item = Arc<Expr>>,
) -> Stmt {
    stmt(StmtKind::Assign(AssignStmt {
        lhs: lhs.into_iter().collect(),
        op,
        rhs: rhs.into_iter().collect(),
    }))
}

/// `lhs = rhs`
pub fn assign(
    lhs: impl IntoIterator<Item = Arc<Expr>>,
    rhs: impl IntoIterator<Item = Arc<Expr>>,
) -> Stmt {
    assign_op(lhs, AssignOp::Assign, rhs)
}

/// `lhs := rhs`
pub fn define(
    lhs: impl IntoIterator<Item = Arc<Expr>>,
    rhs: impl IntoIterator<Item = Arc<Expr>>,
) -> Stmt {
    assign_op(lhs, AssignOp::Define, rhs)
}

/// `x++`
pub fn inc(x: Arc<Expr>) -> Stmt {
    stmt(StmtKind::IncDec(x, IncDecOp::Inc))
}

/// `ch <- value`
pub fn send(ch: Arc<Expr>, value: Arc<Expr>) -> Stmt {
    stmt(StmtKind::Send(ch, value))
}

/// `go call`
pub fn go(call: Arc<Expr>) -> Stmt {
    stmt(StmtKind::Go(call))
}

/// `defer call`
pub fn defer(call: Arc<Expr>) -> Stmt {
    stmt(StmtKind::Defer(call))
}

/// `return results...`
pub fn ret(results: impl IntoIterator<Item = Arc<Expr>>) -> Stmt {
    stmt(StmtKind::Return(results.into_iter().collect()))
}

fn branch(tok: BranchTok, label: Option<&str>) -> Stmt {
    stmt(StmtKind::Branch(BranchStmt {
        tok,
        label: label.map(name),
    }))
}

/// `break` or `break label`
pub fn brk(label: Option<&str>) -> Stmt {
    branch(BranchTok::Break, label)
}

/// `continue` or `continue label`
pub fn cont(label: Option<&str>) -> Stmt {
    branch(BranchTok::Continue, label)
}

/// `goto label`
pub fn goto(label: &str) -> Stmt {
    branch(BranchTok::Goto, Some(label))
}

/// `fallthrough`
pub fn fallthrough() -> Stmt {
    branch(BranchTok::Fallthrough, None)
}

/// `label: inner`
pub fn labeled(label: &str, inner: Stmt) -> Stmt {
    stmt(StmtKind::Labeled(name(label), Box::new(inner)))
}

/// `{ body }`
pub fn block(body: impl IntoIterator<Item = Stmt>) -> Stmt {
    stmt(StmtKind::Block(Block::new(stmts(body), Span::empty())))
}

/// `if cond { body } else els`
pub fn if_(cond: Arc<Expr>, body: impl IntoIterator<Item = Stmt>, els: Option<Stmt>) -> Stmt {
    stmt(StmtKind::If(IfStmt {
        init: None,
        cond,
        body: Block::new(stmts(body), Span::empty()),
        els: els.map(Box::new),
    }))
}

/// `if init; cond { body } else els`
pub fn if_init(
    init: Stmt,
    cond: Arc<Expr>,
    body: impl IntoIterator<Item = Stmt>,
    els: Option<Stmt>,
) -> Stmt {
    let mut s = if_(cond, body, els);
    if let StmtKind::If(ref mut inner) = s.kind {
        inner.init = Some(Box::new(init));
    }
    s
}

/// `case list...: body`
pub fn case(
    list: impl IntoIterator<Item = Arc<Expr>>,
    body: impl IntoIterator<Item = Stmt>,
) -> CaseClause {
    CaseClause {
        list: list.into_iter().collect(),
        body: stmts(body),
        span: Span::empty(),
    }
}

/// `default: body`
pub fn default(body: impl IntoIterator<Item = Stmt>) -> CaseClause {
    case([], body)
}

/// `switch init; tag { clauses }`
pub fn switch_init(
    init: Option<Stmt>,
    tag: Option<Arc<Expr>>,
    clauses: impl IntoIterator<Item = CaseClause>,
) -> Stmt {
    stmt(StmtKind::Switch(SwitchStmt {
        init: init.map(Box::new),
        tag,
        clauses: clauses.into_iter().collect(),
    }))
}

/// `switch tag { clauses }`
pub fn switch(tag: Option<Arc<Expr>>, clauses: impl IntoIterator<Item = CaseClause>) -> Stmt {
    switch_init(None, tag, clauses)
}

/// `switch bind := x.(type) { clauses }`
pub fn type_switch(
    bind: Option<&str>,
    x: Arc<Expr>,
    clauses: impl IntoIterator<Item = CaseClause>,
) -> Stmt {
    stmt(StmtKind::TypeSwitch(TypeSwitchStmt {
        init: None,
        bind: bind.map(name),
        guard: type_assert(x, None),
        clauses: clauses.into_iter().collect(),
    }))
}

/// `case ch <- value: body`
pub fn send_clause(
    ch: Arc<Expr>,
    value: Arc<Expr>,
    body: impl IntoIterator<Item = Stmt>,
) -> CommClause {
    CommClause {
        comm: Some(Comm::Send { chan: ch, value }),
        body: stmts(body),
        span: Span::empty(),
    }
}

/// `case lhs = <-ch: body` (or `:=` when `define` is set)
pub fn recv_clause(
    lhs: impl IntoIterator<Item = Arc<Expr>>,
    define: bool,
    ch: Arc<Expr>,
    body: impl IntoIterator<Item = Stmt>,
) -> CommClause {
    CommClause {
        comm: Some(Comm::Recv(RecvStmt {
            lhs: lhs.into_iter().collect(),
            define,
            x: recv(ch),
        })),
        body: stmts(body),
        span: Span::empty(),
    }
}

/// `default: body` in a `select`
pub fn select_default(body: impl IntoIterator<Item = Stmt>) -> CommClause {
    CommClause {
        comm: None,
        body: stmts(body),
        span: Span::empty(),
    }
}

/// `select { clauses }`
pub fn select(clauses: impl IntoIterator<Item = CommClause>) -> Stmt {
    stmt(StmtKind::Select(SelectStmt {
        clauses: clauses.into_iter().collect(),
    }))
}

/// `for init; cond; post { body }`
pub fn for_(
    init: Option<Stmt>,
    cond: Option<Arc<Expr>>,
    post: Option<Stmt>,
    body: impl IntoIterator<Item = Stmt>,
) -> Stmt {
    stmt(StmtKind::For(crate::ForStmt {
        init: init.map(Box::new),
        cond,
        post: post.map(Box::new),
        body: Block::new(stmts(body), Span::empty()),
    }))
}

/// `for key, value := range x { body }`
pub fn range(
    key: Option<Arc<Expr>>,
    value: Option<Arc<Expr>>,
    x: Arc<Expr>,
    body: impl IntoIterator<Item = Stmt>,
) -> Stmt {
    stmt(StmtKind::Range(RangeStmt {
        key,
        value,
        define: true,
        x,
        body: Block::new(stmts(body), Span::empty()),
    }))
}

/// `var names = values`
pub fn var(names: &[&str], values: impl IntoIterator<Item = Arc<Expr>>) -> GenDecl {
    GenDecl {
        tok: DeclTok::Var,
        specs: alloc::vec![Spec::Value(ValueSpec {
            names: names.iter().map(|n| name(n)).collect(),
            ty: None,
            values: values.into_iter().collect(),
        })],
        span: Span::empty(),
    }
}

/// A declaration statement.
pub fn decl_stmt(decl: GenDecl) -> Stmt {
    stmt(StmtKind::Decl(decl))
}

/// `func name() { body }`
pub fn func(n: &str, body: impl IntoIterator<Item = Stmt>) -> Decl {
    Decl::Func(FuncDecl {
        recv: None,
        name: name(n),
        ty: FuncType::default(),
        body: Some(Block::new(stmts(body), Span::empty())),
        span: Span::empty(),
    })
}

/// `package name; decls...`
pub fn file(package: &str, decls: impl IntoIterator<Item = Decl>) -> File {
    File {
        package: name(package),
        decls: decls.into_iter().collect(),
        span: Span::empty(),
    }
}

/// Spells out a statement list for quick assertions.
pub fn render(body: &[Stmt]) -> String {
    crate::print::stmts_to_string(body)
}
