use std::sync::Arc;

use goflow_ast::{BinaryOp, CaseClause, Expr, Span, Stmt, SwitchStmt};
use tracing::debug;

use super::clauses::normalize_clauses;
use crate::{build, ctx::SimplifyCtx};

impl SimplifyCtx<'_> {
    /// Lowers a switch into an if/else chain:
    ///
    /// ```text
    /// switch init; tag {       switch {
    /// case a, b:               default:
    ///     A                        init
    /// default:           =>        _1 := tag
    ///     D                        if _1 == (a) || _1 == (b) {
    /// }                                A
    ///                              } else {
    ///                                  D
    ///                              }
    ///                          }
    /// ```
    ///
    /// The wrapper keeps `break` inside a clause from escaping
    /// the construct.
    pub(crate) fn switch(&mut self, s: &SwitchStmt, span: Span, out: &mut Vec<Stmt>) {
        if s.clauses.is_empty() && s.init.is_none() && s.tag.is_none() {
            return;
        }
        let clauses = normalize_clauses(&s.clauses, self.dcx);
        debug!(
            clauses = clauses.len(),
            tagged = s.tag.is_some(),
            "lowering switch"
        );

        let mut body = Vec::new();
        if let Some(init) = &s.init {
            self.stmt(init, &mut body);
        }
        let tag = match &s.tag {
            None => None,
            Some(tag) => {
                let value = self.expr(tag, &mut body, true);
                if clauses.iter().all(CaseClause::is_default) {
                    body.push(build::assign(build::blank(tag.span), value, tag.span));
                    None
                } else {
                    Some(self.new_var(value, &mut body))
                }
            }
        };
        let chain = self.if_else_chain(tag.as_ref(), &clauses, span);
        body.extend(chain);
        out.push(build::breakable(body, span));
    }

    /// Builds the if/else chain for normalized `clauses`, whose
    /// `default` (if any) is last.
    fn if_else_chain(
        &mut self,
        tag: Option<&Arc<Expr>>,
        clauses: &[CaseClause],
        span: Span,
    ) -> Vec<Stmt> {
        let Some((clause, rest)) = clauses.split_first() else {
            return Vec::new();
        };
        if clause.is_default() {
            return self.stmts(&clause.body);
        }

        let cond = disjunction(clause.list.iter().map(|x| match tag {
            Some(tag) => build::binary(BinaryOp::Eql, Arc::clone(tag), build::paren(Arc::clone(x))),
            None => Arc::clone(x),
        }));
        let mut stmts = Vec::new();
        let cond = match cond {
            Some(cond) => self.operand(&cond, &mut stmts),
            None => self.dcx.emit_span_bug(clause.span, "case clause without match list"),
        };
        let body = self.stmts(&clause.body);
        let els = self.if_else_chain(tag, rest, span);
        stmts.push(build::if_(
            cond,
            body,
            build::else_branch(els, span),
            clause.span,
        ));
        stmts
    }
}

/// `a || (b || (c ...))`
fn disjunction(conds: impl DoubleEndedIterator<Item = Arc<Expr>>) -> Option<Arc<Expr>> {
    conds
        .rev()
        .reduce(|rhs, lhs| build::binary(BinaryOp::LOr, lhs, rhs))
}
