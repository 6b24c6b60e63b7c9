//! Read-only traversal of the syntax tree.
//!
//! Every `visit_*` method defaults to the matching `walk_*`
//! function, which visits the node's children in source order.
//! Override a method to intercept a node and call the `walk_*`
//! function to keep descending. Returning [`ControlFlow::Break`]
//! stops the whole traversal.

use core::ops::ControlFlow;

use crate::{
    Block, CaseClause, Comm, CommClause, Decl, Element, Expr, ExprKind, Field, File, FuncType,
    Ident, Spec, Stmt, StmtKind, TypeExpr,
};

macro_rules! try_branch {
    ($e:expr) => {
        if let ControlFlow::Break(b) = $e {
            return ControlFlow::Break(b);
        }
    };
}

macro_rules! try_each {
    ($visitor:ident.$method:ident($iter:expr)) => {
        for item in $iter {
            try_branch!($visitor.$method(item));
        }
    };
}

/// A syntax tree visitor.
pub trait Visitor<'ast> {
    /// The value carried by [`ControlFlow::Break`].
    type Break;

    /// Visits a file.
    fn visit_file(&mut self, file: &'ast File) -> ControlFlow<Self::Break> {
        walk_file(self, file)
    }

    /// Visits a top-level declaration.
    fn visit_decl(&mut self, decl: &'ast Decl) -> ControlFlow<Self::Break> {
        walk_decl(self, decl)
    }

    /// Visits a statement.
    fn visit_stmt(&mut self, stmt: &'ast Stmt) -> ControlFlow<Self::Break> {
        walk_stmt(self, stmt)
    }

    /// Visits an expression.
    fn visit_expr(&mut self, expr: &'ast Expr) -> ControlFlow<Self::Break> {
        walk_expr(self, expr)
    }

    /// Visits an identifier, including declared names and labels.
    fn visit_ident(&mut self, _ident: &'ast Ident) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }
}

/// Walks every declaration in `file`.
pub fn walk_file<'ast, V>(v: &mut V, file: &'ast File) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    try_branch!(v.visit_ident(&file.package));
    try_each!(v.visit_decl(&file.decls));
    ControlFlow::Continue(())
}

/// Walks the children of `decl`.
pub fn walk_decl<'ast, V>(v: &mut V, decl: &'ast Decl) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    match decl {
        Decl::Gen(gen_decl) => walk_specs(v, &gen_decl.specs),
        Decl::Func(func) => {
            if let Some(recv) = &func.recv {
                try_branch!(walk_field(v, recv));
            }
            try_branch!(v.visit_ident(&func.name));
            try_branch!(walk_func_type(v, &func.ty));
            match &func.body {
                Some(body) => walk_block(v, body),
                None => ControlFlow::Continue(()),
            }
        }
    }
}

fn walk_specs<'ast, V>(v: &mut V, specs: &'ast [Spec]) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    for spec in specs {
        match spec {
            Spec::Import(import) => {
                if let Some(name) = &import.name {
                    try_branch!(v.visit_ident(name));
                }
            }
            Spec::Value(value) => {
                try_each!(v.visit_ident(&value.names));
                if let Some(ty) = &value.ty {
                    try_branch!(v.visit_expr(ty));
                }
                try_each!(v.visit_expr(&value.values));
            }
            Spec::Type(ty) => {
                try_branch!(v.visit_ident(&ty.name));
                try_branch!(v.visit_expr(&ty.ty));
            }
        }
    }
    ControlFlow::Continue(())
}

fn walk_field<'ast, V>(v: &mut V, field: &'ast Field) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    try_each!(v.visit_ident(&field.names));
    v.visit_expr(&field.ty)
}

fn walk_func_type<'ast, V>(v: &mut V, ty: &'ast FuncType) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    for field in ty.params.iter().chain(&ty.results) {
        try_branch!(walk_field(v, field));
    }
    ControlFlow::Continue(())
}

/// Walks the statements of `block`.
pub fn walk_block<'ast, V>(v: &mut V, block: &'ast Block) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    try_each!(v.visit_stmt(&block.stmts));
    ControlFlow::Continue(())
}

fn walk_opt_stmt<'ast, V>(v: &mut V, stmt: Option<&'ast Stmt>) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    match stmt {
        Some(stmt) => v.visit_stmt(stmt),
        None => ControlFlow::Continue(()),
    }
}

fn walk_opt_expr<'ast, V>(v: &mut V, expr: Option<&'ast Expr>) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    match expr {
        Some(expr) => v.visit_expr(expr),
        None => ControlFlow::Continue(()),
    }
}

fn walk_case_clauses<'ast, V>(v: &mut V, clauses: &'ast [CaseClause]) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    for clause in clauses {
        try_each!(v.visit_expr(&clause.list));
        try_each!(v.visit_stmt(&clause.body));
    }
    ControlFlow::Continue(())
}

fn walk_comm_clause<'ast, V>(v: &mut V, clause: &'ast CommClause) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    match &clause.comm {
        Some(Comm::Send { chan, value }) => {
            try_branch!(v.visit_expr(chan));
            try_branch!(v.visit_expr(value));
        }
        Some(Comm::Recv(recv)) => {
            try_each!(v.visit_expr(&recv.lhs));
            try_branch!(v.visit_expr(&recv.x));
        }
        None => {}
    }
    try_each!(v.visit_stmt(&clause.body));
    ControlFlow::Continue(())
}

/// Walks the children of `stmt`.
pub fn walk_stmt<'ast, V>(v: &mut V, stmt: &'ast Stmt) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    match &stmt.kind {
        StmtKind::Empty => ControlFlow::Continue(()),
        StmtKind::Decl(decl) => walk_specs(v, &decl.specs),
        StmtKind::Labeled(label, inner) => {
            try_branch!(v.visit_ident(label));
            v.visit_stmt(inner)
        }
        StmtKind::Expr(x) | StmtKind::Go(x) | StmtKind::Defer(x) | StmtKind::IncDec(x, _) => {
            v.visit_expr(x)
        }
        StmtKind::Send(chan, value) => {
            try_branch!(v.visit_expr(chan));
            v.visit_expr(value)
        }
        StmtKind::Assign(assign) => {
            try_each!(v.visit_expr(&assign.lhs));
            try_each!(v.visit_expr(&assign.rhs));
            ControlFlow::Continue(())
        }
        StmtKind::Return(results) => {
            try_each!(v.visit_expr(results));
            ControlFlow::Continue(())
        }
        StmtKind::Branch(branch) => match &branch.label {
            Some(label) => v.visit_ident(label),
            None => ControlFlow::Continue(()),
        },
        StmtKind::Block(block) => walk_block(v, block),
        StmtKind::If(s) => {
            try_branch!(walk_opt_stmt(v, s.init.as_deref()));
            try_branch!(v.visit_expr(&s.cond));
            try_branch!(walk_block(v, &s.body));
            walk_opt_stmt(v, s.els.as_deref())
        }
        StmtKind::Switch(s) => {
            try_branch!(walk_opt_stmt(v, s.init.as_deref()));
            try_branch!(walk_opt_expr(v, s.tag.as_deref()));
            walk_case_clauses(v, &s.clauses)
        }
        StmtKind::TypeSwitch(s) => {
            try_branch!(walk_opt_stmt(v, s.init.as_deref()));
            if let Some(bind) = &s.bind {
                try_branch!(v.visit_ident(bind));
            }
            try_branch!(v.visit_expr(&s.guard));
            walk_case_clauses(v, &s.clauses)
        }
        StmtKind::Select(s) => {
            for clause in &s.clauses {
                try_branch!(walk_comm_clause(v, clause));
            }
            ControlFlow::Continue(())
        }
        StmtKind::For(s) => {
            try_branch!(walk_opt_stmt(v, s.init.as_deref()));
            try_branch!(walk_opt_expr(v, s.cond.as_deref()));
            try_branch!(walk_opt_stmt(v, s.post.as_deref()));
            walk_block(v, &s.body)
        }
        StmtKind::Range(s) => {
            try_branch!(walk_opt_expr(v, s.key.as_deref()));
            try_branch!(walk_opt_expr(v, s.value.as_deref()));
            try_branch!(v.visit_expr(&s.x));
            walk_block(v, &s.body)
        }
    }
}

fn walk_elements<'ast, V>(v: &mut V, elts: &'ast [Element]) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    for elt in elts {
        try_branch!(walk_opt_expr(v, elt.key.as_deref()));
        try_branch!(v.visit_expr(&elt.value));
    }
    ControlFlow::Continue(())
}

/// Walks the children of `expr`.
pub fn walk_expr<'ast, V>(v: &mut V, expr: &'ast Expr) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    match &expr.kind {
        ExprKind::BasicLit(_) => ControlFlow::Continue(()),
        ExprKind::Ident(ident) => v.visit_ident(ident),
        ExprKind::CompositeLit(lit) => {
            try_branch!(walk_opt_expr(v, lit.ty.as_deref()));
            walk_elements(v, &lit.elts)
        }
        ExprKind::FuncLit(lit) => {
            try_branch!(walk_func_type(v, &lit.ty));
            walk_block(v, &lit.body)
        }
        ExprKind::Paren(x) | ExprKind::Star(x) | ExprKind::Unary(_, x) => v.visit_expr(x),
        ExprKind::Selector(x, sel) => {
            try_branch!(v.visit_expr(x));
            v.visit_ident(sel)
        }
        ExprKind::Index(x, index) => {
            try_branch!(v.visit_expr(x));
            v.visit_expr(index)
        }
        ExprKind::Slice(s) => {
            try_branch!(v.visit_expr(&s.x));
            try_branch!(walk_opt_expr(v, s.low.as_deref()));
            try_branch!(walk_opt_expr(v, s.high.as_deref()));
            walk_opt_expr(v, s.max.as_deref())
        }
        ExprKind::TypeAssert(x, ty) => {
            try_branch!(v.visit_expr(x));
            walk_opt_expr(v, ty.as_deref())
        }
        ExprKind::Call(call) => {
            try_branch!(v.visit_expr(&call.fun));
            try_each!(v.visit_expr(&call.args));
            ControlFlow::Continue(())
        }
        ExprKind::Binary(_, x, y) => {
            try_branch!(v.visit_expr(x));
            v.visit_expr(y)
        }
        ExprKind::Type(ty) => walk_type(v, ty),
    }
}

fn walk_type<'ast, V>(v: &mut V, ty: &'ast TypeExpr) -> ControlFlow<V::Break>
where
    V: Visitor<'ast> + ?Sized,
{
    match ty {
        TypeExpr::Array { len, elem } => {
            try_branch!(walk_opt_expr(v, len.as_deref()));
            v.visit_expr(elem)
        }
        TypeExpr::Map { key, value } => {
            try_branch!(v.visit_expr(key));
            v.visit_expr(value)
        }
        TypeExpr::Chan { elem, .. } => v.visit_expr(elem),
        TypeExpr::Func(func) => walk_func_type(v, func),
        TypeExpr::Struct(fields) | TypeExpr::Interface(fields) => {
            for field in fields {
                try_branch!(walk_field(v, field));
            }
            ControlFlow::Continue(())
        }
    }
}
