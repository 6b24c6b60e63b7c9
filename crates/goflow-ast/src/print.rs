//! Go-like rendering of the syntax tree.
//!
//! The output is meant for humans and tests. It does not insert
//! parentheses: a tree prints exactly as it is shaped, so
//! [`ExprKind::Paren`] nodes are the only source of parentheses.

use core::fmt::{self, Write};

use crate::{
    Block, CaseClause, ChanDir, Comm, CommClause, Decl, Element, Expr, ExprKind, Field, File,
    FuncType, GenDecl, IncDecOp, Spec, Stmt, StmtKind, TypeExpr,
};

struct Printer<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    indent: usize,
}

impl Printer<'_, '_> {
    fn newline(&mut self) -> fmt::Result {
        self.f.write_char('\n')?;
        for _ in 0..self.indent {
            self.f.write_char('\t')?;
        }
        Ok(())
    }

    fn list<T>(
        &mut self,
        items: &[T],
        mut each: impl FnMut(&mut Self, &T) -> fmt::Result,
    ) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.f.write_str(", ")?;
            }
            each(self, item)?;
        }
        Ok(())
    }

    fn exprs<E: AsRef<Expr>>(&mut self, exprs: &[E]) -> fmt::Result {
        self.list(exprs, |p, x| p.expr(x.as_ref()))
    }

    fn expr(&mut self, x: &Expr) -> fmt::Result {
        match &x.kind {
            ExprKind::BasicLit(lit) => self.f.write_str(&lit.value),
            ExprKind::Ident(ident) => self.f.write_str(&ident.name),
            ExprKind::CompositeLit(lit) => {
                if let Some(ty) = &lit.ty {
                    self.expr(ty)?;
                }
                self.f.write_char('{')?;
                self.list(&lit.elts, Self::element)?;
                self.f.write_char('}')
            }
            ExprKind::FuncLit(lit) => {
                self.f.write_str("func")?;
                self.signature(&lit.ty)?;
                self.f.write_char(' ')?;
                self.block(&lit.body)
            }
            ExprKind::Paren(inner) => {
                self.f.write_char('(')?;
                self.expr(inner)?;
                self.f.write_char(')')
            }
            ExprKind::Selector(inner, sel) => {
                self.expr(inner)?;
                write!(self.f, ".{sel}")
            }
            ExprKind::Index(inner, index) => {
                self.expr(inner)?;
                self.f.write_char('[')?;
                self.expr(index)?;
                self.f.write_char(']')
            }
            ExprKind::Slice(s) => {
                self.expr(&s.x)?;
                self.f.write_char('[')?;
                if let Some(low) = &s.low {
                    self.expr(low)?;
                }
                self.f.write_char(':')?;
                if let Some(high) = &s.high {
                    self.expr(high)?;
                }
                if s.slice3 {
                    self.f.write_char(':')?;
                    if let Some(max) = &s.max {
                        self.expr(max)?;
                    }
                }
                self.f.write_char(']')
            }
            ExprKind::TypeAssert(inner, ty) => {
                self.expr(inner)?;
                self.f.write_str(".(")?;
                match ty {
                    Some(ty) => self.expr(ty)?,
                    None => self.f.write_str("type")?,
                }
                self.f.write_char(')')
            }
            ExprKind::Call(call) => {
                self.expr(&call.fun)?;
                self.f.write_char('(')?;
                self.exprs(&call.args)?;
                if call.ellipsis {
                    self.f.write_str("...")?;
                }
                self.f.write_char(')')
            }
            ExprKind::Star(inner) => {
                self.f.write_char('*')?;
                self.expr(inner)
            }
            ExprKind::Unary(op, inner) => {
                self.f.write_str(op.as_str())?;
                self.expr(inner)
            }
            ExprKind::Binary(op, lhs, rhs) => {
                self.expr(lhs)?;
                write!(self.f, " {op} ")?;
                self.expr(rhs)
            }
            ExprKind::Type(ty) => self.type_expr(ty),
        }
    }

    fn element(&mut self, elt: &Element) -> fmt::Result {
        if let Some(key) = &elt.key {
            self.expr(key)?;
            self.f.write_str(": ")?;
        }
        self.expr(&elt.value)
    }

    fn type_expr(&mut self, ty: &TypeExpr) -> fmt::Result {
        match ty {
            TypeExpr::Array { len, elem } => {
                self.f.write_char('[')?;
                if let Some(len) = len {
                    self.expr(len)?;
                }
                self.f.write_char(']')?;
                self.expr(elem)
            }
            TypeExpr::Map { key, value } => {
                self.f.write_str("map[")?;
                self.expr(key)?;
                self.f.write_char(']')?;
                self.expr(value)
            }
            TypeExpr::Chan { dir, elem } => {
                self.f.write_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                })?;
                self.expr(elem)
            }
            TypeExpr::Func(func) => {
                self.f.write_str("func")?;
                self.signature(func)
            }
            TypeExpr::Struct(fields) => self.field_block("struct", fields),
            TypeExpr::Interface(fields) => self.field_block("interface", fields),
        }
    }

    fn field_block(&mut self, keyword: &str, fields: &[Field]) -> fmt::Result {
        self.f.write_str(keyword)?;
        self.f.write_char('{')?;
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.f.write_str("; ")?;
            }
            self.field(field)?;
        }
        self.f.write_char('}')
    }

    fn field(&mut self, field: &Field) -> fmt::Result {
        if !field.names.is_empty() {
            self.list(&field.names, |p, name| p.f.write_str(&name.name))?;
            self.f.write_char(' ')?;
        }
        self.expr(&field.ty)
    }

    fn signature(&mut self, ty: &FuncType) -> fmt::Result {
        self.f.write_char('(')?;
        self.list(&ty.params, Self::field)?;
        self.f.write_char(')')?;
        match ty.results.as_slice() {
            [] => Ok(()),
            [single] if single.names.is_empty() => {
                self.f.write_char(' ')?;
                self.expr(&single.ty)
            }
            results => {
                self.f.write_str(" (")?;
                self.list(results, Self::field)?;
                self.f.write_char(')')
            }
        }
    }

    fn block(&mut self, block: &Block) -> fmt::Result {
        self.braced(&block.stmts)
    }

    fn braced(&mut self, stmts: &[Stmt]) -> fmt::Result {
        if stmts.is_empty() {
            return self.f.write_str("{}");
        }
        self.f.write_char('{')?;
        self.indent += 1;
        self.stmt_lines(stmts)?;
        self.indent -= 1;
        self.newline()?;
        self.f.write_char('}')
    }

    fn stmt_lines(&mut self, stmts: &[Stmt]) -> fmt::Result {
        for stmt in stmts {
            self.newline()?;
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn header(&mut self, keyword: &str, init: Option<&Stmt>) -> fmt::Result {
        self.f.write_str(keyword)?;
        if let Some(init) = init {
            self.f.write_char(' ')?;
            self.stmt(init)?;
            self.f.write_char(';')?;
        }
        Ok(())
    }

    fn case_clauses(&mut self, clauses: &[CaseClause]) -> fmt::Result {
        self.f.write_char('{')?;
        for clause in clauses {
            self.newline()?;
            if clause.is_default() {
                self.f.write_str("default:")?;
            } else {
                self.f.write_str("case ")?;
                self.exprs(&clause.list)?;
                self.f.write_char(':')?;
            }
            self.indent += 1;
            self.stmt_lines(&clause.body)?;
            self.indent -= 1;
        }
        self.newline()?;
        self.f.write_char('}')
    }

    fn comm_clause(&mut self, clause: &CommClause) -> fmt::Result {
        self.newline()?;
        match &clause.comm {
            None => self.f.write_str("default:")?,
            Some(Comm::Send { chan, value }) => {
                self.f.write_str("case ")?;
                self.expr(chan)?;
                self.f.write_str(" <- ")?;
                self.expr(value)?;
                self.f.write_char(':')?;
            }
            Some(Comm::Recv(recv)) => {
                self.f.write_str("case ")?;
                if !recv.lhs.is_empty() {
                    self.exprs(&recv.lhs)?;
                    self.f.write_str(if recv.define { " := " } else { " = " })?;
                }
                self.expr(&recv.x)?;
                self.f.write_char(':')?;
            }
        }
        self.indent += 1;
        self.stmt_lines(&clause.body)?;
        self.indent -= 1;
        Ok(())
    }

    fn gen_decl(&mut self, decl: &GenDecl) -> fmt::Result {
        write!(self.f, "{} ", decl.tok)?;
        match decl.specs.as_slice() {
            [spec] => self.spec(spec),
            specs => {
                self.f.write_char('(')?;
                self.indent += 1;
                for spec in specs {
                    self.newline()?;
                    self.spec(spec)?;
                }
                self.indent -= 1;
                self.newline()?;
                self.f.write_char(')')
            }
        }
    }

    fn spec(&mut self, spec: &Spec) -> fmt::Result {
        match spec {
            Spec::Import(import) => {
                if let Some(name) = &import.name {
                    write!(self.f, "{name} ")?;
                }
                self.f.write_str(&import.path.value)
            }
            Spec::Value(value) => {
                self.list(&value.names, |p, name| p.f.write_str(&name.name))?;
                if let Some(ty) = &value.ty {
                    self.f.write_char(' ')?;
                    self.expr(ty)?;
                }
                if !value.values.is_empty() {
                    self.f.write_str(" = ")?;
                    self.exprs(&value.values)?;
                }
                Ok(())
            }
            Spec::Type(ty) => {
                write!(self.f, "{} ", ty.name)?;
                self.expr(&ty.ty)
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) -> fmt::Result {
        match &stmt.kind {
            StmtKind::Empty => Ok(()),
            StmtKind::Decl(decl) => self.gen_decl(decl),
            StmtKind::Labeled(label, inner) => {
                write!(self.f, "{label}: ")?;
                self.stmt(inner)
            }
            StmtKind::Expr(x) => self.expr(x),
            StmtKind::Send(chan, value) => {
                self.expr(chan)?;
                self.f.write_str(" <- ")?;
                self.expr(value)
            }
            StmtKind::IncDec(x, op) => {
                self.expr(x)?;
                self.f.write_str(match op {
                    IncDecOp::Inc => "++",
                    IncDecOp::Dec => "--",
                })
            }
            StmtKind::Assign(assign) => {
                self.exprs(&assign.lhs)?;
                write!(self.f, " {} ", assign.op)?;
                self.exprs(&assign.rhs)
            }
            StmtKind::Go(call) => {
                self.f.write_str("go ")?;
                self.expr(call)
            }
            StmtKind::Defer(call) => {
                self.f.write_str("defer ")?;
                self.expr(call)
            }
            StmtKind::Return(results) => {
                self.f.write_str("return")?;
                if !results.is_empty() {
                    self.f.write_char(' ')?;
                    self.exprs(results)?;
                }
                Ok(())
            }
            StmtKind::Branch(branch) => {
                self.f.write_str(match branch.tok {
                    crate::BranchTok::Break => "break",
                    crate::BranchTok::Continue => "continue",
                    crate::BranchTok::Goto => "goto",
                    crate::BranchTok::Fallthrough => "fallthrough",
                })?;
                if let Some(label) = &branch.label {
                    write!(self.f, " {label}")?;
                }
                Ok(())
            }
            StmtKind::Block(block) => self.block(block),
            StmtKind::If(s) => {
                self.header("if", s.init.as_deref())?;
                self.f.write_char(' ')?;
                self.expr(&s.cond)?;
                self.f.write_char(' ')?;
                self.block(&s.body)?;
                if let Some(els) = &s.els {
                    self.f.write_str(" else ")?;
                    self.stmt(els)?;
                }
                Ok(())
            }
            StmtKind::Switch(s) => {
                self.header("switch", s.init.as_deref())?;
                if let Some(tag) = &s.tag {
                    self.f.write_char(' ')?;
                    self.expr(tag)?;
                }
                self.f.write_char(' ')?;
                self.case_clauses(&s.clauses)
            }
            StmtKind::TypeSwitch(s) => {
                self.header("switch", s.init.as_deref())?;
                self.f.write_char(' ')?;
                if let Some(bind) = &s.bind {
                    write!(self.f, "{bind} := ")?;
                }
                self.expr(&s.guard)?;
                self.f.write_char(' ')?;
                self.case_clauses(&s.clauses)
            }
            StmtKind::Select(s) => {
                self.f.write_str("select {")?;
                for clause in &s.clauses {
                    self.comm_clause(clause)?;
                }
                self.newline()?;
                self.f.write_char('}')
            }
            StmtKind::For(s) => {
                self.f.write_str("for ")?;
                match (&s.init, &s.cond, &s.post) {
                    (None, None, None) => {}
                    (None, Some(cond), None) => {
                        self.expr(cond)?;
                        self.f.write_char(' ')?;
                    }
                    (init, cond, post) => {
                        if let Some(init) = init {
                            self.stmt(init)?;
                        }
                        self.f.write_str("; ")?;
                        if let Some(cond) = cond {
                            self.expr(cond)?;
                        }
                        self.f.write_str("; ")?;
                        if let Some(post) = post {
                            self.stmt(post)?;
                            self.f.write_char(' ')?;
                        }
                    }
                }
                self.block(&s.body)
            }
            StmtKind::Range(s) => {
                self.f.write_str("for ")?;
                if let Some(key) = &s.key {
                    self.expr(key)?;
                    if let Some(value) = &s.value {
                        self.f.write_str(", ")?;
                        self.expr(value)?;
                    }
                    self.f.write_str(if s.define { " := " } else { " = " })?;
                }
                self.f.write_str("range ")?;
                self.expr(&s.x)?;
                self.f.write_char(' ')?;
                self.block(&s.body)
            }
        }
    }

    fn decl(&mut self, decl: &Decl) -> fmt::Result {
        match decl {
            Decl::Gen(decl) => self.gen_decl(decl),
            Decl::Func(func) => {
                self.f.write_str("func ")?;
                if let Some(recv) = &func.recv {
                    self.f.write_char('(')?;
                    self.field(recv)?;
                    self.f.write_str(") ")?;
                }
                self.f.write_str(&func.name.name)?;
                self.signature(&func.ty)?;
                if let Some(body) = &func.body {
                    self.f.write_char(' ')?;
                    self.block(body)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! display_via {
    ($($ty:ty => $method:ident),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    Printer { f, indent: 0 }.$method(self)
                }
            }
        )+
    };
}

display_via! {
    Expr => expr,
    Stmt => stmt,
    Block => block,
    Decl => decl,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "package {}", self.package)?;
        let mut p = Printer { f, indent: 0 };
        for decl in &self.decls {
            p.f.write_str("\n\n")?;
            p.decl(decl)?;
        }
        p.f.write_char('\n')
    }
}

/// Renders a statement list the way it would appear inside a
/// block, one statement per line.
pub fn stmts_to_string(stmts: &[Stmt]) -> alloc::string::String {
    struct Lines<'a>(&'a [Stmt]);

    impl fmt::Display for Lines<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (i, stmt) in self.0.iter().enumerate() {
                if i > 0 {
                    f.write_char('\n')?;
                }
                Printer {
                    f: &mut *f,
                    indent: 0,
                }
                .stmt(stmt)?;
            }
            Ok(())
        }
    }

    alloc::format!("{}", Lines(stmts))
}
