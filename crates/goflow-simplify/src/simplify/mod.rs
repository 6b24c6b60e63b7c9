//! Simplification pass: rewrite a type-checked syntax tree into an
//! equivalent tree that uses fewer control-flow constructs.
//!
//! Overview
//! --------
//! The pass runs between type checking and code emission. The
//! emitter targets a language without `switch` fallthrough, without
//! a place to put statements inside an expression, and (when
//! requested) without calls nested in arbitrary expression
//! positions. This pass removes those constructs from the tree so
//! that emission is mechanical.
//!
//! Non-goal: optimization. Nothing is folded, reordered, or
//! removed beyond what the rewrites below require.
//!
//! Assumptions and Error Policy
//! ----------------------------
//! - The input tree parsed and passed type checking.
//! - Any discrepancy is an internal compiler error (ICE). The pass
//!   emits a bug diagnostic through `diag::DiagCtx` and unwinds with
//!   an [`ExplicitBug`][crate::ExplicitBug] payload. It never
//!   returns a partial tree.
//!
//! Transformations
//! ---------------
//! - `switch` becomes an `if`/`else` chain inside a `switch { default:
//!   ... }` wrapper, so an unlabeled `break` still leaves the whole
//!   construct. `fallthrough` is resolved by concatenating bodies and
//!   the `default` clause moves last. The tag is evaluated once into
//!   a temporary.
//! - With hoisting, calls outside bare-call positions are stored into
//!   `_<n>` temporaries declared right before the statement that uses
//!   them, and `&&`/`||` whose right operand calls something become a
//!   temporary plus a guarded `if`.
//! - `select` operands are evaluated before the `select`. Receive
//!   targets whose addressing calls something are computed once up
//!   front and assigned at the top of the clause.
//! - `if`, type switch, and `for` conditions are split from their
//!   prefix statements without changing scoping.
//!
//! Invariants
//! ----------
//! - Sibling evaluation order is never changed. Prefix statements go
//!   immediately before the statement being lowered.
//! - The input is never mutated. Call-free subtrees are shared with
//!   the output; rebuilt nodes keep their [`NodeId`], so type queries
//!   answer the same for both trees.
//! - Temporaries are numbered above every `_<n>` already in the unit.
//!
//! [`NodeId`]: goflow_ast::NodeId

mod clauses;
mod expr;
mod labels;
mod select;
mod stmt;
mod switch;

use goflow_ast::File;
use tracing::instrument;

use crate::{ctx::SimplifyCtx, diag::DiagCtx, names::FreshNames, typeinfo::TypeInfo};

/// A builder for running the pass over a [`File`].
pub struct Simplifier<'a> {
    types: &'a dyn TypeInfo,
    hoist_calls: bool,
    source: Option<(&'a str, &'a str)>,
}

impl<'a> Simplifier<'a> {
    /// Creates a [`Simplifier`] that answers type queries with
    /// `types`.
    pub fn new(types: &'a dyn TypeInfo) -> Self {
        Self {
            types,
            hoist_calls: false,
            source: None,
        }
    }

    /// Enables or disables hoisting calls into temporaries.
    #[must_use]
    pub fn hoist_calls(mut self, hoist_calls: bool) -> Self {
        self.hoist_calls = hoist_calls;
        self
    }

    /// Sets the source text that spans point into, used to render
    /// internal compiler errors.
    #[must_use]
    pub fn source(mut self, path: &'a str, text: &'a str) -> Self {
        self.source = Some((path, text));
        self
    }

    /// Simplifies every declaration in `file`.
    ///
    /// # Panics
    ///
    /// Panics with an [`ExplicitBug`][crate::ExplicitBug] if `file`
    /// is not a well-formed, type-checked tree.
    #[instrument(skip_all, fields(hoist_calls = self.hoist_calls, decls = file.decls.len()))]
    pub fn simplify(&self, file: &File) -> File {
        let dcx = match self.source {
            Some((path, text)) => DiagCtx::new(path, text),
            None => DiagCtx::detached(),
        };
        let mut ctx = SimplifyCtx::new(self.types, &dcx, self.hoist_calls, FreshNames::above(file));
        File {
            package: file.package.clone(),
            decls: file.decls.iter().map(|decl| ctx.decl(decl)).collect(),
            span: file.span,
        }
    }
}

/// Simplifies `file`. Shorthand for [`Simplifier`].
pub fn simplify(file: &File, types: &dyn TypeInfo, hoist_calls: bool) -> File {
    Simplifier::new(types).hoist_calls(hoist_calls).simplify(file)
}
