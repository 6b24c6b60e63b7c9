#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::{
    ops::ControlFlow,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use goflow_ast::{
    Comm, Decl, Expr, ExprKind, File, NodeId, Stmt, StmtKind,
    dsl::*,
    visit::{self, Visitor},
};
use goflow_simplify::{ExplicitBug, Simplifier, Type, TypeMap, contains_call, simplify};
use test_log::test;

fn main_body(file: &File) -> &[Stmt] {
    for decl in &file.decls {
        if let Decl::Func(func) = decl {
            if func.name == "main" {
                return &func.body.as_ref().unwrap().stmts;
            }
        }
    }
    panic!("no `func main` in\n{file}")
}

fn simplified_with(body: impl IntoIterator<Item = Stmt>, types: &TypeMap, hoist: bool) -> String {
    let out = simplify(&file("main", [func("main", body)]), types, hoist);
    render(main_body(&out))
}

fn simplified(body: impl IntoIterator<Item = Stmt>, hoist: bool) -> String {
    simplified_with(body, &TypeMap::new(), hoist)
}

/// Converts four-space indentation to tabs.
fn tabs(src: &str) -> String {
    src.trim_matches('\n')
        .lines()
        .map(|line| {
            let code = line.trim_start_matches(' ');
            let depth = (line.len() - code.len()) / 4;
            format!("{}{code}", "\t".repeat(depth))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs the pass and returns the ICE message it raises.
fn ice(body: impl IntoIterator<Item = Stmt>) -> String {
    let f = file("main", [func("main", body)]);
    let types = TypeMap::new();
    let err = catch_unwind(AssertUnwindSafe(|| simplify(&f, &types, true)))
        .expect_err("the pass should have raised an ICE");
    err.downcast_ref::<ExplicitBug>()
        .expect("panic payload is an `ExplicitBug`")
        .message
        .clone()
}

fn call0(name: &str) -> Stmt {
    expr_stmt(call(name, []))
}

/// Counts the `&&` and `||` operators anywhere in `file` whose
/// right operand calls something.
fn logical_ops_with_calls(file: &File) -> usize {
    struct Count(usize);

    impl<'ast> Visitor<'ast> for Count {
        type Break = ();

        fn visit_expr(&mut self, expr: &'ast Expr) -> ControlFlow<()> {
            if let ExprKind::Binary(op, _, rhs) = &expr.kind {
                if op.is_logical() && contains_call(rhs) {
                    self.0 += 1;
                }
            }
            visit::walk_expr(self, expr)
        }
    }

    let mut count = Count(0);
    let _ = count.visit_file(file);
    count.0
}

#[test]
fn test_fallthrough_switch_shape() {
    let got = simplified(
        [switch(
            Some(ident("n")),
            [
                case([int(1)], [call0("one"), fallthrough()]),
                case([int(2)], [call0("two")]),
                default([call0("other")]),
            ],
        )],
        false,
    );
    let want = tabs(r#"
switch {
default:
    _1 := n
    if _1 == (1) {
        one()
        two()
    } else if _1 == (2) {
        two()
    } else {
        other()
    }
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_default_in_the_middle_goes_last() {
    let got = simplified(
        [switch(
            Some(ident("n")),
            [
                case([int(1), int(2)], [call0("low")]),
                default([call0("other")]),
                case([int(3)], [call0("high")]),
            ],
        )],
        false,
    );
    let want = tabs(r#"
switch {
default:
    _1 := n
    if _1 == (1) || _1 == (2) {
        low()
    } else if _1 == (3) {
        high()
    } else {
        other()
    }
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_and_with_call_on_the_right() {
    let body = || {
        [if_(
            and(call("f", []), call("g", [])),
            [call0("h")],
            None,
        )]
    };
    let want = tabs(r#"
_1 := f()
if _1 {
    _1 = g()
}
if _1 {
    h()
}
"#);
    assert_eq!(simplified(body(), true), want);
    assert_eq!(simplified(body(), false), "if f() && g() {\n\th()\n}");
}

#[test]
fn test_or_with_call_on_the_right() {
    let got = simplified(
        [if_(
            or(call("f", []), call("g", [])),
            [call0("h")],
            None,
        )],
        true,
    );
    let want = tabs(r#"
_1 := f()
if !_1 {
    _1 = g()
}
if _1 {
    h()
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_logical_operator_without_call_on_the_right() {
    let got = simplified(
        [if_(and(call("f", []), ident("ok")), [call0("h")], None)],
        true,
    );
    let want = tabs(r#"
_1 := f()
if _1 && ok {
    h()
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_tagless_switch() {
    let body = || {
        [switch(
            None,
            [
                case([call("a", [])], [call0("x")]),
                case([call("b", [])], [call0("y")]),
            ],
        )]
    };

    let want = tabs(r#"
switch {
default:
    if a() {
        x()
    } else if b() {
        y()
    }
}
"#);
    assert_eq!(simplified(body(), false), want);

    let want = tabs(r#"
switch {
default:
    _1 := a()
    if _1 {
        x()
    } else {
        _2 := b()
        if _2 {
            y()
        }
    }
}
"#);
    assert_eq!(simplified(body(), true), want);
}

#[test]
fn test_switch_with_only_default_evaluates_tag() {
    let got = simplified(
        [switch_init(
            Some(define([ident("x")], [call("f", [])])),
            Some(call("g", [ident("x")])),
            [default([call0("h")])],
        )],
        false,
    );
    let want = tabs(r#"
switch {
default:
    x := f()
    _ = g(x)
    h()
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_empty_switch_disappears() {
    assert_eq!(simplified([switch(None, []), call0("after")], true), "after()");
}

#[test]
fn test_select_target_cached() {
    let got = simplified(
        [select([
            recv_clause(
                [index(ident("xs"), call("idx", []))],
                false,
                ident("ch"),
                [call0("got")],
            ),
            send_clause(ident("out"), call("v", []), []),
        ])],
        true,
    );
    let want = tabs(r#"
_1 := idx()
_3 := v()
select {
case _2 := <-ch:
    xs[_1] = _2
    got()
case out <- _3:
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_select_without_hoisting_is_structural() {
    let got = simplified(
        [select([
            recv_clause(
                [index(ident("xs"), call("idx", []))],
                false,
                ident("ch"),
                [],
            ),
            select_default([call0("idle")]),
        ])],
        false,
    );
    let want = tabs(r#"
select {
case xs[idx()] = <-ch:
default:
    idle()
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_for_condition_moves_into_body() {
    let got = simplified(
        [for_(
            Some(define([ident("i")], [int(0)])),
            Some(call("more", [ident("i")])),
            Some(inc(ident("i"))),
            [call0("work")],
        )],
        true,
    );
    let want = tabs(r#"
for i := 0; ; i++ {
    _1 := more(i)
    if !_1 {
        break
    }
    work()
}
"#);
    assert_eq!(got, want);

    let got = simplified(
        [for_(None, Some(call("more", [])), None, [call0("work")])],
        false,
    );
    assert_eq!(got, "for more() {\n\twork()\n}");
}

#[test]
fn test_for_init_statements_go_before_the_loop() {
    let got = simplified(
        [for_(
            Some(define([ident("x")], [and(call("a", []), call("b", []))])),
            Some(ident("x")),
            None,
            [brk(None)],
        )],
        true,
    );
    let want = tabs(r#"
_1 := a()
if _1 {
    _1 = b()
}
for x := _1; x; {
    break
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_labeled_statements() {
    assert_eq!(simplified([labeled("L", switch(None, []))], true), "L: ");

    let got = simplified(
        [labeled(
            "L",
            for_(None, Some(call("more", [])), None, [brk(Some("L"))]),
        )],
        true,
    );
    let want = tabs(r#"
L: for {
    _1 := more()
    if !_1 {
        break
    }
    break L
}
"#);
    assert_eq!(got, want);

    let got = simplified(
        [labeled("L", expr_stmt(call("print", [call("f", [])])))],
        true,
    );
    assert_eq!(got, "L: _1 := f()\nprint(_1)");

    let got = simplified(
        [labeled(
            "L",
            select([recv_clause([], false, call("ch", []), [brk(Some("L"))])]),
        )],
        true,
    );
    let want = tabs(r#"
L: switch {
default:
    _1 := ch()
    select {
    case <-_1:
        break L
    }
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_labeled_range_keeps_label_on_loop() {
    let got = simplified(
        [labeled(
            "L",
            range(Some(ident("i")), None, call("items", []), [cont(Some("L"))]),
        )],
        true,
    );
    let want = tabs(r#"
_1 := items()
L: for i := range _1 {
    continue L
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_labeled_range_used_by_goto_labels_its_prefix() {
    let got = simplified(
        [labeled(
            "L",
            range(Some(ident("i")), None, call("n", []), [goto("L")]),
        )],
        true,
    );
    let want = tabs(r#"
L: _1 := n()
for i := range _1 {
    goto L
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_loop_label_used_by_goto_and_continue() {
    let msg = ice([
        labeled(
            "L",
            range(Some(ident("i")), None, call("items", []), [cont(Some("L"))]),
        ),
        goto("L"),
    ]);
    assert_eq!(
        msg,
        "label `L` is used by `goto` and by its loop, which needs statements before it"
    );
}

#[test]
fn test_type_switch_with_init() {
    let mut stmt = type_switch(
        Some("v"),
        call("get", []),
        [case([ident("int")], [call0("int")]), default([])],
    );
    if let StmtKind::TypeSwitch(s) = &mut stmt.kind {
        s.init = Some(Box::new(define([ident("x")], [int(1)])));
    }
    let want = tabs(r#"
{
    x := 1
    _1 := get()
    switch v := _1.(type) {
    case int:
        int()
    default:
    }
}
"#);
    assert_eq!(simplified([stmt], true), want);
}

#[test]
fn test_if_with_init() {
    let got = simplified(
        [if_init(
            define([ident("x")], [call("f", [])]),
            eq(ident("x"), call("g", [])),
            [call0("h")],
            Some(if_(call("k", []), [], None)),
        )],
        true,
    );
    let want = tabs(r#"
{
    x := f()
    _1 := g()
    if x == _1 {
        h()
    } else {
        _2 := k()
        if _2 {}
    }
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_tuple_values() {
    let pair = || call("pair", []);
    let (a, b, c) = (pair(), pair(), pair());
    let tuple = Type::Tuple(vec![Type::named("int"), Type::named("error")]);
    let mut types = TypeMap::new();
    for x in [&a, &b, &c] {
        types.insert(x, tuple.clone());
    }
    assert_eq!(types.len(), 3);

    let got = simplified_with(
        [
            expr_stmt(call("f", [a])),
            define([ident("x"), ident("err")], [b]),
            ret([c]),
        ],
        &types,
        true,
    );
    let want = tabs(r#"
_1, _2 := pair()
f(_1, _2)
x, err := pair()
return pair()
"#);
    assert_eq!(got, want);
}

#[test]
fn test_go_and_defer_keep_their_call() {
    let got = simplified(
        [
            go(call("work", [call("arg", [])])),
            defer(call_expr(call("cleanup", []), [])),
        ],
        true,
    );
    let want = tabs(r#"
_1 := arg()
go work(_1)
_2 := cleanup()
defer _2()
"#);
    assert_eq!(got, want);
}

#[test]
fn test_assignment_sides() {
    let got = simplified(
        [assign(
            [index(ident("xs"), call("i", []))],
            [call("f", [call("g", [])])],
        )],
        true,
    );
    let want = tabs(r#"
_1 := i()
_2 := g()
xs[_1] = f(_2)
"#);
    assert_eq!(got, want);
}

#[test]
fn test_func_literal_body_is_simplified() {
    let got = simplified(
        [define(
            [ident("f")],
            [func_lit([switch(
                Some(ident("x")),
                [case([int(1)], [call0("a")])],
            )])],
        )],
        false,
    );
    let want = tabs(r#"
f := func() {
    switch {
    default:
        _1 := x
        if _1 == (1) {
            a()
        }
    }
}
"#);
    assert_eq!(got, want);
}

#[test]
fn test_fresh_names_avoid_source_names() {
    let got = simplified(
        [
            define([ident("_1")], [int(5)]),
            define([ident("_7")], [int(6)]),
            expr_stmt(call("print", [call("f", [ident("_1")])])),
        ],
        true,
    );
    let want = tabs(r#"
_1 := 5
_7 := 6
_8 := f(_1)
print(_8)
"#);
    assert_eq!(got, want);
}

#[test]
fn test_package_vars_are_not_hoisted() {
    let f = file(
        "main",
        [
            Decl::Gen(var(&["a"], [call("f", [call("g", [])])])),
            func("main", []),
        ],
    );
    let out = Simplifier::new(&TypeMap::new()).hoist_calls(true).simplify(&f);
    assert_eq!(out, f);
    assert_eq!(out.to_string(), "package main\n\nvar a = f(g())\n\nfunc main() {}\n");
}

#[test]
fn test_package_func_literal_hoists_in_its_body() {
    let f = file(
        "main",
        [
            Decl::Gen(var(
                &["h"],
                [func_lit([if_(
                    and(call("a", []), call("b", [])),
                    [call0("c")],
                    None,
                )])],
            )),
            func("main", []),
        ],
    );
    assert_eq!(logical_ops_with_calls(&f), 1);

    let out = Simplifier::new(&TypeMap::new()).hoist_calls(true).simplify(&f);
    assert_eq!(logical_ops_with_calls(&out), 0, "{out}");
    assert!(out.to_string().contains("\t_1 := a()\n"), "{out}");

    let out = Simplifier::new(&TypeMap::new()).simplify(&f);
    assert_eq!(out, f);
}

#[test]
fn test_unchanged_subtrees_are_shared() {
    let sum = binary(goflow_ast::BinaryOp::Add, ident("a"), index(ident("b"), ident("i")));
    let arg = paren(ident("y"));
    let f_call = call("f", [Arc::clone(&arg)]);
    let f = file(
        "main",
        [func(
            "main",
            [
                define([ident("x")], [Arc::clone(&sum)]),
                expr_stmt(Arc::clone(&f_call)),
            ],
        )],
    );
    let out = simplify(&f, &TypeMap::new(), true);
    let body = main_body(&out);

    let StmtKind::Assign(assign) = &body[0].kind else {
        panic!("expected an assignment")
    };
    assert!(Arc::ptr_eq(&assign.rhs[0], &sum));

    let StmtKind::Expr(x) = &body[1].kind else {
        panic!("expected an expression statement")
    };
    // Calls with nothing to rewrite are shared too.
    assert!(Arc::ptr_eq(x, &f_call));
    assert_eq!(x.id, f_call.id);
    let ExprKind::Call(call) = &x.kind else {
        panic!("expected a call")
    };
    assert!(Arc::ptr_eq(&call.args[0], &arg));
}

#[test]
fn test_synthesized_nodes_have_no_type() {
    let out = simplify(
        &file("main", [func("main", [expr_stmt(call("print", [call("f", [])]))])]),
        &TypeMap::new(),
        true,
    );
    let StmtKind::Assign(assign) = &main_body(&out)[0].kind else {
        panic!("expected an assignment")
    };
    assert_eq!(assign.lhs[0].id, NodeId::DUMMY);
    assert_ne!(assign.rhs[0].id, NodeId::DUMMY);
}

#[test]
fn test_output_has_no_calls_in_conditions() {
    let out = simplify(
        &file(
            "main",
            [func(
                "main",
                [switch(
                    Some(call("tag", [])),
                    [
                        case([call("a", []), call("b", [])], [call0("x")]),
                        default([call0("y")]),
                    ],
                )],
            )],
        ),
        &TypeMap::new(),
        true,
    );

    fn conds(stmts: &[Stmt], out: &mut Vec<Arc<Expr>>) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::If(s) => {
                    out.push(Arc::clone(&s.cond));
                    conds(&s.body.stmts, out);
                    if let Some(els) = &s.els {
                        conds(std::slice::from_ref(els), out);
                    }
                }
                StmtKind::Block(b) => conds(&b.stmts, out),
                StmtKind::Switch(s) => {
                    for clause in &s.clauses {
                        conds(&clause.body, out);
                    }
                }
                _ => {}
            }
        }
    }

    let mut found = Vec::new();
    conds(main_body(&out), &mut found);
    assert!(!found.is_empty());
    assert!(found.iter().all(|x| !contains_call(x)), "{out}");
}

#[test]
fn test_go_operand_must_be_a_call() {
    assert_eq!(ice([go(ident("f"))]), "`go` operand is not a call");
    assert_eq!(ice([defer(ident("f"))]), "`defer` operand is not a call");
}

#[test]
fn test_bad_type_switch_guard() {
    let mut stmt = type_switch(None, ident("x"), []);
    if let StmtKind::TypeSwitch(s) = &mut stmt.kind {
        s.guard = ident("x");
    }
    assert_eq!(
        ice([stmt]),
        "type switch guard is not a `.(type)` assertion"
    );
}

#[test]
fn test_bad_comm_clause() {
    let mut clause = recv_clause([ident("v")], true, ident("ch"), []);
    if let Some(Comm::Recv(recv)) = &mut clause.comm {
        recv.x = ident("ch");
    }
    assert_eq!(ice([select([clause])]), "unexpected comm clause");
}

#[test]
fn test_two_defaults() {
    let stmt = switch(Some(ident("x")), [default([]), default([])]);
    assert_eq!(ice([stmt]), "multiple `default` clauses in switch");
}

#[test]
fn test_source_is_used_for_diagnostics() {
    let src = "package main\n\nfunc main() { go f }\n";
    let f = file("main", [func("main", [go(ident("f"))])]);
    let types = TypeMap::new();
    let err = catch_unwind(AssertUnwindSafe(|| {
        Simplifier::new(&types)
            .source("main.go", src)
            .simplify(&f)
    }))
    .expect_err("the pass should have raised an ICE");
    let bug = err.downcast_ref::<ExplicitBug>().unwrap();
    assert_eq!(
        bug.to_string(),
        "internal compiler error: `go` operand is not a call"
    );
}
