use std::ops::ControlFlow;

use goflow_ast::{
    Expr, ExprKind,
    visit::{self, Visitor},
};

/// Reports whether evaluating `expr` runs a call.
///
/// The bodies of function literals are not evaluated by the
/// expression itself and are not searched.
pub fn contains_call(expr: &Expr) -> bool {
    struct FindCall;

    impl<'ast> Visitor<'ast> for FindCall {
        type Break = ();

        fn visit_expr(&mut self, expr: &'ast Expr) -> ControlFlow<()> {
            match &expr.kind {
                ExprKind::Call(_) => ControlFlow::Break(()),
                ExprKind::FuncLit(_) => ControlFlow::Continue(()),
                _ => visit::walk_expr(self, expr),
            }
        }
    }

    FindCall.visit_expr(expr).is_break()
}
