use std::sync::Arc;

use goflow_ast::{
    Comm, CommClause, Expr, ExprKind, RecvStmt, SelectStmt, Span, Stmt, StmtKind, UnaryOp,
};
use tracing::debug;

use crate::{build, calls::contains_call, ctx::SimplifyCtx};

impl SimplifyCtx<'_> {
    /// Simplifies a `select`. Operands of the communications are
    /// evaluated once on entry, so their statements go before the
    /// `select`.
    pub(crate) fn select(&mut self, s: &SelectStmt, span: Span, out: &mut Vec<Stmt>) {
        let clauses = s
            .clauses
            .iter()
            .map(|clause| self.comm_clause(clause, out))
            .collect();
        out.push(Stmt::new(StmtKind::Select(SelectStmt { clauses }), span));
    }

    fn comm_clause(&mut self, clause: &CommClause, out: &mut Vec<Stmt>) -> CommClause {
        let (comm, head) = match &clause.comm {
            None => (None, Vec::new()),
            Some(Comm::Send { chan, value }) => {
                let chan = self.operand(chan, out);
                let value = self.operand(value, out);
                (Some(Comm::Send { chan, value }), Vec::new())
            }
            Some(Comm::Recv(recv)) => {
                let (recv, head) = self.recv(recv, clause.span, out);
                (Some(Comm::Recv(recv)), head)
            }
        };
        let mut body = head;
        body.extend(self.stmts(&clause.body));
        CommClause {
            comm,
            body,
            span: clause.span,
        }
    }

    /// Returns the rewritten receive and the statements that must
    /// start the clause body.
    ///
    /// Targets whose addressing involves a call are evaluated
    /// before the `select` and assigned after the receive:
    ///
    /// ```text
    /// _1 := f()
    /// select {
    /// case _2 := <-ch:
    ///     xs[_1] = _2
    ///     body
    /// }
    /// ```
    fn recv(
        &mut self,
        recv: &RecvStmt,
        span: Span,
        out: &mut Vec<Stmt>,
    ) -> (RecvStmt, Vec<Stmt>) {
        let x = match &recv.x.kind {
            ExprKind::Unary(UnaryOp::Recv, chan) => {
                let chan = self.operand(chan, out);
                Arc::new(recv.x.rebuild(ExprKind::Unary(UnaryOp::Recv, chan)))
            }
            _ => self.dcx.emit_span_bug(span, "unexpected comm clause"),
        };

        if !self.hoist_calls || !recv.lhs.iter().any(|lhs| contains_call(lhs)) {
            let lhs = self.operands(&recv.lhs, out);
            let recv = RecvStmt {
                lhs,
                define: recv.define,
                x,
            };
            return (recv, Vec::new());
        }

        debug!(targets = recv.lhs.len(), "caching select targets");
        let targets = self.operands(&recv.lhs, out);
        let tmps: Vec<Arc<Expr>> = targets
            .iter()
            .map(|target| self.fresh_var(target.span))
            .collect();
        let head = targets
            .into_iter()
            .zip(&tmps)
            .map(|(target, tmp)| {
                let span = target.span;
                build::assign(target, Arc::clone(tmp), span)
            })
            .collect();
        let recv = RecvStmt {
            lhs: tmps,
            define: true,
            x,
        };
        (recv, head)
    }
}
