use goflow_ast::CaseClause;

use crate::diag::{DiagCtx, MultiSpan};

/// Resolves `fallthrough` and moves `default` last.
///
/// Each clause's body becomes the statements a match on that
/// clause executes: its own body followed by the bodies it falls
/// through into, with the `fallthrough` markers removed. The
/// `default` clause accumulates the same way and comes out last.
/// Match lists are untouched.
pub(crate) fn normalize_clauses(clauses: &[CaseClause], dcx: &DiagCtx) -> Vec<CaseClause> {
    let mut merged: Vec<CaseClause> = Vec::with_capacity(clauses.len());
    // Clauses whose body is still accumulating.
    let mut open: Vec<usize> = Vec::new();
    let mut default: Option<usize> = None;

    for clause in clauses {
        let (body, falls_through) = match clause.body.split_last() {
            Some((last, rest)) if last.is_fallthrough() => (rest, true),
            _ => (clause.body.as_slice(), false),
        };

        let idx = merged.len();
        if clause.is_default() {
            if let Some(first) = default.and_then(|i| merged.get(i)) {
                let mut span = MultiSpan::from_span(clause.span);
                span.push_label(first.span, "first `default` here");
                dcx.emit_span_bug(span, "multiple `default` clauses in switch");
            }
            default = Some(idx);
        }
        merged.push(CaseClause {
            list: clause.list.clone(),
            body: Vec::new(),
            span: clause.span,
        });

        open.push(idx);
        for &i in &open {
            if let Some(open_clause) = merged.get_mut(i) {
                open_clause.body.extend_from_slice(body);
            }
        }
        if !falls_through {
            open.clear();
        }
    }

    if let Some(i) = default {
        let clause = merged.remove(i);
        merged.push(clause);
    }
    merged
}
