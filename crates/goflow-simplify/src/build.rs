//! Constructors for the nodes the pass synthesizes.
//!
//! Synthesized expressions carry [`NodeId::DUMMY`][goflow_ast::NodeId::DUMMY].

use std::sync::Arc;

use goflow_ast::{
    AssignOp, AssignStmt, BinaryOp, Block, BranchStmt, BranchTok, CaseClause, Expr, ExprKind,
    Ident, IfStmt, Span, Stmt, StmtKind, SwitchStmt, UnaryOp,
};

pub(crate) fn expr(kind: ExprKind, span: Span) -> Arc<Expr> {
    Arc::new(Expr::synthetic(kind, span))
}

pub(crate) fn blank(span: Span) -> Arc<Expr> {
    expr(ExprKind::Ident(Ident::new("_", span)), span)
}

pub(crate) fn paren(x: Arc<Expr>) -> Arc<Expr> {
    let span = x.span;
    expr(ExprKind::Paren(x), span)
}

/// `!x`, parenthesizing anything but an identifier.
pub(crate) fn not(x: Arc<Expr>) -> Arc<Expr> {
    let span = x.span;
    let x = if matches!(x.kind, ExprKind::Ident(_) | ExprKind::Paren(_)) {
        x
    } else {
        paren(x)
    };
    expr(ExprKind::Unary(UnaryOp::Not, x), span)
}

pub(crate) fn binary(op: BinaryOp, x: Arc<Expr>, y: Arc<Expr>) -> Arc<Expr> {
    let span = x.span.merge(y.span);
    expr(ExprKind::Binary(op, x, y), span)
}

fn assign_op(lhs: Vec<Arc<Expr>>, op: AssignOp, rhs: Vec<Arc<Expr>>, span: Span) -> Stmt {
    Stmt::new(StmtKind::Assign(AssignStmt { lhs, op, rhs }), span)
}

/// `lhs := rhs`
pub(crate) fn define(lhs: Vec<Arc<Expr>>, rhs: Vec<Arc<Expr>>, span: Span) -> Stmt {
    assign_op(lhs, AssignOp::Define, rhs, span)
}

/// `lhs = rhs`
pub(crate) fn assign(lhs: Arc<Expr>, rhs: Arc<Expr>, span: Span) -> Stmt {
    assign_op(vec![lhs], AssignOp::Assign, vec![rhs], span)
}

pub(crate) fn block(stmts: Vec<Stmt>, span: Span) -> Stmt {
    Stmt::new(StmtKind::Block(Block::new(stmts, span)), span)
}

pub(crate) fn if_(cond: Arc<Expr>, body: Vec<Stmt>, els: Option<Box<Stmt>>, span: Span) -> Stmt {
    Stmt::new(
        StmtKind::If(IfStmt {
            init: None,
            cond,
            body: Block::new(body, span),
            els,
        }),
        span,
    )
}

pub(crate) fn brk(span: Span) -> Stmt {
    Stmt::new(
        StmtKind::Branch(BranchStmt {
            tok: BranchTok::Break,
            label: None,
        }),
        span,
    )
}

/// `switch { default: stmts }`, a scope that an unlabeled `break`
/// exits.
pub(crate) fn breakable(stmts: Vec<Stmt>, span: Span) -> Stmt {
    Stmt::new(
        StmtKind::Switch(SwitchStmt {
            init: None,
            tag: None,
            clauses: vec![CaseClause {
                list: Vec::new(),
                body: stmts,
                span,
            }],
        }),
        span,
    )
}

/// Turns the statements an `else` branch simplified to into an
/// `else` branch.
pub(crate) fn else_branch(mut stmts: Vec<Stmt>, span: Span) -> Option<Box<Stmt>> {
    match stmts.len() {
        0 => None,
        1 if matches!(stmts[0].kind, StmtKind::If(_) | StmtKind::Block(_)) => {
            stmts.pop().map(Box::new)
        }
        _ => Some(Box::new(block(stmts, span))),
    }
}
