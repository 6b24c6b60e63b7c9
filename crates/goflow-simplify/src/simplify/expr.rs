use std::sync::Arc;

use buggy::BugExt;
use goflow_ast::{
    BinaryOp, CallExpr, CompositeLit, Element, Expr, ExprKind, FuncLit, SliceExpr, Stmt,
};
use tracing::trace;

use crate::{
    build,
    calls::contains_call,
    ctx::SimplifyCtx,
    diag::ResultExt,
};

impl SimplifyCtx<'_> {
    /// Simplifies an operand, which is never a bare-call position.
    pub(crate) fn operand(&mut self, x: &Arc<Expr>, prefix: &mut Vec<Stmt>) -> Arc<Expr> {
        self.expr(x, prefix, false)
    }

    pub(crate) fn operands(&mut self, xs: &[Arc<Expr>], prefix: &mut Vec<Stmt>) -> Vec<Arc<Expr>> {
        xs.iter().map(|x| self.operand(x, prefix)).collect()
    }

    /// Simplifies `x`, appending to `prefix` whatever must run
    /// right before the result is evaluated.
    ///
    /// `call_ok` means a call may stay where it is, e.g. as an
    /// expression statement or the right side of an assignment.
    pub(crate) fn expr(
        &mut self,
        x: &Arc<Expr>,
        prefix: &mut Vec<Stmt>,
        call_ok: bool,
    ) -> Arc<Expr> {
        self.rewrite(x, prefix, call_ok)
            .unwrap_or_else(|| Arc::clone(x))
    }

    /// Like [`expr`][Self::expr] for a child of the node being
    /// rewritten. Sets `changed` if the child was replaced.
    fn sub(&mut self, x: &Arc<Expr>, prefix: &mut Vec<Stmt>, changed: &mut bool) -> Arc<Expr> {
        match self.rewrite(x, prefix, false) {
            Some(x) => {
                *changed = true;
                x
            }
            None => Arc::clone(x),
        }
    }

    fn opt_sub(
        &mut self,
        x: Option<&Arc<Expr>>,
        prefix: &mut Vec<Stmt>,
        changed: &mut bool,
    ) -> Option<Arc<Expr>> {
        x.map(|x| self.sub(x, prefix, changed))
    }

    /// Returns the replacement for `x`, or `None` if `x` stays as
    /// it is. `None` never leaves anything in `prefix`.
    fn rewrite(
        &mut self,
        x: &Arc<Expr>,
        prefix: &mut Vec<Stmt>,
        call_ok: bool,
    ) -> Option<Arc<Expr>> {
        let mut changed = false;
        let kind = match &x.kind {
            ExprKind::BasicLit(_) | ExprKind::Ident(_) | ExprKind::Type(_) => return None,
            ExprKind::FuncLit(lit) => {
                changed = true;
                ExprKind::FuncLit(FuncLit {
                    ty: lit.ty.clone(),
                    body: self.func_body(&lit.body),
                })
            }
            ExprKind::CompositeLit(lit) => ExprKind::CompositeLit(CompositeLit {
                ty: lit.ty.clone(),
                elts: lit
                    .elts
                    .iter()
                    .map(|elt| Element {
                        key: elt.key.clone(),
                        value: self.sub(&elt.value, prefix, &mut changed),
                    })
                    .collect(),
            }),
            ExprKind::Paren(inner) => ExprKind::Paren(self.sub(inner, prefix, &mut changed)),
            ExprKind::Selector(inner, sel) => {
                ExprKind::Selector(self.sub(inner, prefix, &mut changed), sel.clone())
            }
            ExprKind::Index(inner, index) => {
                let inner = self.sub(inner, prefix, &mut changed);
                let index = self.sub(index, prefix, &mut changed);
                ExprKind::Index(inner, index)
            }
            ExprKind::Slice(s) => {
                let inner = self.sub(&s.x, prefix, &mut changed);
                let low = self.opt_sub(s.low.as_ref(), prefix, &mut changed);
                let high = self.opt_sub(s.high.as_ref(), prefix, &mut changed);
                let max = self.opt_sub(s.max.as_ref(), prefix, &mut changed);
                ExprKind::Slice(SliceExpr {
                    x: inner,
                    low,
                    high,
                    max,
                    slice3: s.slice3,
                })
            }
            ExprKind::TypeAssert(inner, ty) => {
                ExprKind::TypeAssert(self.sub(inner, prefix, &mut changed), ty.clone())
            }
            ExprKind::Call(call) => {
                let new = self.call_parts(call, prefix, &mut changed);
                let call = if changed {
                    Arc::new(x.rebuild(ExprKind::Call(new)))
                } else {
                    Arc::clone(x)
                };
                if call_ok || !self.hoist_calls {
                    return changed.then_some(call);
                }
                trace!(span = ?x.span, "hoisting call");
                return Some(self.new_var(call, prefix));
            }
            ExprKind::Star(inner) => ExprKind::Star(self.sub(inner, prefix, &mut changed)),
            ExprKind::Unary(op, inner) => {
                ExprKind::Unary(*op, self.sub(inner, prefix, &mut changed))
            }
            ExprKind::Binary(op, lhs, rhs) => {
                if op.is_logical() && self.hoist_calls && contains_call(rhs) {
                    return Some(self.short_circuit(*op, lhs, rhs, prefix));
                }
                let lhs = self.sub(lhs, prefix, &mut changed);
                let rhs = self.sub(rhs, prefix, &mut changed);
                ExprKind::Binary(*op, lhs, rhs)
            }
        };
        changed.then(|| Arc::new(x.rebuild(kind)))
    }

    /// Rewrites `lhs && rhs` (or `lhs || rhs`) so that the
    /// statements `rhs` needs only run when `rhs` is evaluated:
    ///
    /// ```text
    /// _1 := lhs
    /// if _1 {        // `if !_1` for `||`
    ///     _1 = rhs
    /// }
    /// ```
    fn short_circuit(
        &mut self,
        op: BinaryOp,
        lhs: &Arc<Expr>,
        rhs: &Arc<Expr>,
        prefix: &mut Vec<Stmt>,
    ) -> Arc<Expr> {
        trace!(%op, span = ?lhs.span.merge(rhs.span), "hoisting short-circuit operator");
        let lhs = self.expr(lhs, prefix, true);
        let var = self.new_var(lhs, prefix);
        let cond = match op {
            BinaryOp::LOr => build::not(Arc::clone(&var)),
            _ => Arc::clone(&var),
        };
        let mut body = Vec::new();
        let rhs_span = rhs.span;
        let rhs = self.expr(rhs, &mut body, true);
        body.push(build::assign(Arc::clone(&var), rhs, rhs_span));
        prefix.push(build::if_(cond, body, None, rhs_span));
        var
    }

    /// Simplifies the callee and arguments of a call, leaving the
    /// call itself in place.
    pub(crate) fn call(&mut self, call: &CallExpr, prefix: &mut Vec<Stmt>) -> CallExpr {
        self.call_parts(call, prefix, &mut false)
    }

    fn call_parts(
        &mut self,
        call: &CallExpr,
        prefix: &mut Vec<Stmt>,
        changed: &mut bool,
    ) -> CallExpr {
        let fun = self.sub(&call.fun, prefix, changed);
        let args = self.args(&call.args, prefix, changed);
        CallExpr {
            fun,
            args,
            ellipsis: call.ellipsis,
        }
    }

    /// A lone multi-value argument, `f(g())`, is spread into
    /// temporaries when hoisting: `_1, _2 := g(); f(_1, _2)`.
    fn args(
        &mut self,
        args: &[Arc<Expr>],
        prefix: &mut Vec<Stmt>,
        changed: &mut bool,
    ) -> Vec<Arc<Expr>> {
        if let [arg] = args {
            if self.hoist_calls && self.types.is_tuple(arg) {
                let len = self
                    .types
                    .type_of(arg)
                    .and_then(|ty| ty.tuple_len())
                    .assume("tuple-typed argument has a tuple type")
                    .unwrap_or_bug(self.dcx);
                let value = self.expr(arg, prefix, true);
                let vars: Vec<_> = (0..len).map(|_| self.fresh_var(arg.span)).collect();
                prefix.push(build::define(vars.clone(), vec![value], arg.span));
                *changed = true;
                return vars;
            }
        }
        args.iter()
            .map(|arg| self.sub(arg, prefix, changed))
            .collect()
    }

    /// Simplifies a result or initializer list. A lone
    /// multi-value call keeps its place: `return f()`.
    pub(crate) fn values(&mut self, xs: &[Arc<Expr>], prefix: &mut Vec<Stmt>) -> Vec<Arc<Expr>> {
        if let [x] = xs {
            if self.types.is_tuple(x) {
                return vec![self.expr(x, prefix, true)];
            }
        }
        self.operands(xs, prefix)
    }
}
