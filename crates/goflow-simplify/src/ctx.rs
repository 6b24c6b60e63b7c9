//! Per-unit simplification state.

use std::sync::Arc;

use goflow_ast::{Expr, ExprKind, Span, Stmt};

use crate::{build, diag::DiagCtx, names::FreshNames, typeinfo::TypeInfo};

/// State threaded through one run of the pass.
///
/// One context exists per compilation unit; nothing in it is
/// shared between runs.
pub(crate) struct SimplifyCtx<'a> {
    /// Type queries for the input tree.
    pub types: &'a dyn TypeInfo,
    /// Where ICEs are reported.
    pub dcx: &'a DiagCtx,
    /// Whether calls in value positions become temporaries.
    pub hoist_calls: bool,
    /// The hoisting setting the pass was asked for. Function
    /// bodies always use it, even inside package-level
    /// initializers.
    pub hoist_requested: bool,
    /// The `goto` targets of the function being simplified.
    pub goto_targets: Vec<String>,
    names: FreshNames,
}

impl<'a> SimplifyCtx<'a> {
    pub fn new(
        types: &'a dyn TypeInfo,
        dcx: &'a DiagCtx,
        hoist_calls: bool,
        names: FreshNames,
    ) -> Self {
        Self {
            types,
            dcx,
            hoist_calls,
            hoist_requested: hoist_calls,
            goto_targets: Vec::new(),
            names,
        }
    }

    /// Returns a reference to a temporary that has not been
    /// used before.
    pub fn fresh_var(&mut self, span: Span) -> Arc<Expr> {
        let ident = self.names.next(self.dcx, span);
        Arc::new(Expr::synthetic(ExprKind::Ident(ident), span))
    }

    /// Stores `value` into a new temporary and returns the
    /// temporary.
    pub fn new_var(&mut self, value: Arc<Expr>, prefix: &mut Vec<Stmt>) -> Arc<Expr> {
        let span = value.span;
        let var = self.fresh_var(span);
        prefix.push(build::define(vec![Arc::clone(&var)], vec![value], span));
        var
    }
}
