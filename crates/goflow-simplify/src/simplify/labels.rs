use std::ops::ControlFlow;

use goflow_ast::{
    Block, BranchStmt, BranchTok, Expr, ExprKind, Stmt, StmtKind,
    visit::{self, Visitor},
};

/// Collects the labeled branch statements of one function body.
/// Function literals have labels of their own and are skipped.
fn labeled_branches(body: &Block) -> Vec<(BranchTok, &str)> {
    struct Collect<'ast>(Vec<(BranchTok, &'ast str)>);

    impl<'ast> Visitor<'ast> for Collect<'ast> {
        type Break = ();

        fn visit_stmt(&mut self, stmt: &'ast Stmt) -> ControlFlow<()> {
            if let StmtKind::Branch(BranchStmt {
                tok,
                label: Some(label),
            }) = &stmt.kind
            {
                self.0.push((*tok, &label.name));
            }
            visit::walk_stmt(self, stmt)
        }

        fn visit_expr(&mut self, expr: &'ast Expr) -> ControlFlow<()> {
            match &expr.kind {
                ExprKind::FuncLit(_) => ControlFlow::Continue(()),
                _ => visit::walk_expr(self, expr),
            }
        }
    }

    let mut branches = Collect(Vec::new());
    let _ = visit::walk_block(&mut branches, body);
    branches.0
}

/// The labels that `goto` statements in `body` jump to.
pub(super) fn goto_targets(body: &Block) -> Vec<String> {
    labeled_branches(body)
        .into_iter()
        .filter(|(tok, _)| *tok == BranchTok::Goto)
        .map(|(_, label)| label.to_owned())
        .collect()
}

/// Reports whether a `break label` or `continue label` in `body`
/// needs `label` to stay on the enclosing loop.
pub(super) fn exits_loop(body: &Block, label: &str) -> bool {
    labeled_branches(body)
        .into_iter()
        .any(|(tok, target)| matches!(tok, BranchTok::Break | BranchTok::Continue) && target == label)
}

/// The body of a `for` or `range` statement.
pub(super) fn loop_body(stmt: &Stmt) -> Option<&Block> {
    match &stmt.kind {
        StmtKind::For(s) => Some(&s.body),
        StmtKind::Range(s) => Some(&s.body),
        _ => None,
    }
}
