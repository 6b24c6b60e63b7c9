//! Runs programs before and after simplification and compares
//! what they do.

#![allow(clippy::panic)]


use std::sync::Arc;

use goflow_ast::{Decl, Expr, File, Stmt, StmtKind, dsl::*};
use test_log::test;

use self::interp::{Trace, Value, World};
use crate::{Type, TypeMap, simplify};

/// Runs `file` as is and simplified both ways, and checks that all
/// three runs make the same calls.
fn check(file: &File, types: &TypeMap, world: World) -> Trace {
    let want = interp::run(file, world.clone());
    for hoist_calls in [false, true] {
        let simplified = simplify(file, types, hoist_calls);
        let got = interp::run(&simplified, world.clone());
        assert_eq!(got, want, "hoist_calls = {hoist_calls}:\n{simplified}");
    }
    want
}

fn check_main(body: impl IntoIterator<Item = Stmt>, world: World) -> Vec<String> {
    check(&file("main", [func("main", body)]), &TypeMap::new(), world).calls
}

fn say(what: &str) -> Stmt {
    expr_stmt(call("print", [string(what)]))
}

fn print(x: Arc<Expr>) -> Stmt {
    expr_stmt(call("print", [x]))
}

#[test]
fn test_fallthrough_runs_next_clause() {
    let body = || {
        [switch(
            Some(ident("n")),
            [
                case([int(1)], [say("one"), fallthrough()]),
                case([int(2)], [say("two")]),
                default([say("other")]),
            ],
        )]
    };
    let calls = check_main(body(), World::new().with("n", Value::Int(1)));
    assert_eq!(calls, [r#"print("one")"#, r#"print("two")"#]);

    let calls = check_main(body(), World::new().with("n", Value::Int(3)));
    assert_eq!(calls, [r#"print("other")"#]);
}

#[test]
fn test_and_short_circuits() {
    let calls = check_main(
        [if_(
            and(call("f", []), call("g", [])),
            [expr_stmt(call("h", []))],
            None,
        )],
        World::new().returning("f", [Value::Bool(false)]),
    );
    assert_eq!(calls, ["f()"]);
}

#[test]
fn test_or_short_circuits() {
    let calls = check_main(
        [if_(
            or(call("f", []), call("g", [])),
            [expr_stmt(call("h", []))],
            None,
        )],
        World::new().returning("f", [Value::Bool(true)]),
    );
    assert_eq!(calls, ["f()", "h()"]);
}

#[test]
fn test_tagless_switch_calls_each_condition_once() {
    let body = || {
        [switch(
            None,
            [
                case([call("a", [])], [expr_stmt(call("x", []))]),
                case([call("b", [])], [expr_stmt(call("y", []))]),
            ],
        )]
    };

    let world = World::new()
        .returning("a", [Value::Bool(false)])
        .returning("b", [Value::Bool(true)]);
    assert_eq!(check_main(body(), world), ["a()", "b()", "y()"]);

    let world = World::new().returning("a", [Value::Bool(true)]);
    assert_eq!(check_main(body(), world), ["a()", "x()"]);
}

#[test]
fn test_tag_is_evaluated_once() {
    let calls = check_main(
        [switch(
            Some(call("tag", [])),
            [
                case([int(1)], [expr_stmt(call("a", []))]),
                case([int(2), int(3)], [expr_stmt(call("b", []))]),
                default([expr_stmt(call("c", []))]),
            ],
        )],
        World::new().returning("tag", [Value::Int(3)]),
    );
    assert_eq!(calls, ["tag()", "b()"]);
}

#[test]
fn test_break_leaves_only_the_switch() {
    let calls = check_main(
        [range(
            Some(ident("i")),
            None,
            int(3),
            [
                switch(
                    Some(ident("i")),
                    [
                        case([int(1)], [say("skip"), brk(None), say("never")]),
                        default([print(ident("i"))]),
                    ],
                ),
                say("end"),
            ],
        )],
        World::new(),
    );
    assert_eq!(
        calls,
        [
            "print(0)",
            r#"print("end")"#,
            r#"print("skip")"#,
            r#"print("end")"#,
            "print(2)",
            r#"print("end")"#,
        ]
    );
}

#[test]
fn test_labeled_break_leaves_the_loop() {
    let calls = check_main(
        [
            labeled(
                "outer",
                range(
                    Some(ident("i")),
                    None,
                    int(3),
                    [
                        switch(
                            Some(call("id", [ident("i")])),
                            [case([int(1)], [brk(Some("outer"))])],
                        ),
                        print(ident("i")),
                    ],
                ),
            ),
            say("done"),
        ],
        World::new(),
    );
    assert_eq!(
        calls,
        ["id(0)", "print(0)", "id(1)", r#"print("done")"#]
    );
}

#[test]
fn test_select_target_is_addressed_once() {
    let trace = check(
        &file(
            "main",
            [func(
                "main",
                [select([recv_clause(
                    [index(ident("xs"), call("idx", []))],
                    false,
                    ident("ch"),
                    [print(ident("xs"))],
                )])],
            )],
        ),
        &TypeMap::new(),
        World::new()
            .with("xs", Value::slice([Value::Int(0), Value::Int(0), Value::Int(0)]))
            .with("ch", Value::chan([Value::Int(7)]))
            .returning("idx", [Value::Int(1)]),
    );
    assert_eq!(trace.calls, ["idx()", "print([0 7 0])"]);
}

#[test]
fn test_labeled_select_with_hoisted_channel() {
    let calls = check_main(
        [
            labeled(
                "L",
                select([recv_clause(
                    [ident("v")],
                    true,
                    call("mk", []),
                    [
                        if_(eq(ident("v"), int(1)), [brk(Some("L"))], None),
                        print(ident("v")),
                    ],
                )]),
            ),
            say("after"),
        ],
        World::new().returning("mk", [Value::chan([Value::Int(1)])]),
    );
    assert_eq!(calls, ["mk()", r#"print("after")"#]);
}

#[test]
fn test_labeled_type_switch_with_init() {
    let mut stmt = type_switch(
        Some("v"),
        ident("x"),
        [
            case(
                [ident("int")],
                [print(ident("v")), brk(Some("L")), say("never")],
            ),
            case([ident("string")], [say("string")]),
        ],
    );
    if let StmtKind::TypeSwitch(s) = &mut stmt.kind {
        s.init = Some(Box::new(define([ident("x")], [call("id", [int(3)])])));
    }
    let calls = check_main([labeled("L", stmt), say("after")], World::new());
    assert_eq!(calls, ["id(3)", "print(3)", r#"print("after")"#]);
}

#[test]
fn test_for_condition_with_call() {
    let calls = check_main(
        [for_(
            Some(define([ident("i")], [int(0)])),
            Some(call("more", [ident("i")])),
            Some(inc(ident("i"))),
            [
                if_(eq(ident("i"), int(0)), [cont(None)], None),
                print(ident("i")),
            ],
        )],
        World::new().returning(
            "more",
            [Value::Bool(true), Value::Bool(true), Value::Bool(false)],
        ),
    );
    assert_eq!(calls, ["more(0)", "more(1)", "print(1)", "more(2)"]);
}

#[test]
fn test_for_init_runs_once() {
    let calls = check_main(
        [for_(
            Some(define([ident("ok")], [and(call("a", []), call("b", []))])),
            Some(ident("ok")),
            Some(assign([ident("ok")], [call("c", [])])),
            [print(ident("ok"))],
        )],
        World::new()
            .returning("a", [Value::Bool(true)])
            .returning("b", [Value::Bool(true)])
            .returning("c", [Value::Bool(false)]),
    );
    assert_eq!(calls, ["a()", "b()", "print(true)", "c()"]);
}

#[test]
fn test_tuple_argument_is_spread() {
    let pair = call("pair", []);
    let mut types = TypeMap::new();
    types.insert(
        &pair,
        Type::Tuple(vec![Type::named("int"), Type::named("int")]),
    );
    let trace = check(
        &file(
            "main",
            [func("main", [expr_stmt(call("f", [pair]))])],
        ),
        &types,
        World::new().returning("pair", [Value::Tuple(vec![Value::Int(1), Value::Int(2)])]),
    );
    assert_eq!(trace.calls, ["pair()", "f(1, 2)"]);
}

#[test]
fn test_defer_and_go_arguments() {
    let calls = check_main(
        [
            defer(call("log", [call("id", [int(1)])])),
            go(call("work", [call("id", [int(2)])])),
            say("body"),
        ],
        World::new(),
    );
    assert_eq!(
        calls,
        ["id(1)", "id(2)", "work(2)", r#"print("body")"#, "log(1)"]
    );
}

#[test]
fn test_package_var_initializer() {
    let trace = check(
        &file(
            "main",
            [
                Decl::Gen(var(&["a"], [call("id", [int(1)])])),
                func("main", [print(ident("a"))]),
            ],
        ),
        &TypeMap::new(),
        World::new(),
    );
    assert_eq!(trace.calls, ["id(1)", "print(1)"]);
}

mod props {
    use proptest::prelude::*;

    use super::*;
    use super::test;

    #[derive(Clone, Debug)]
    enum Ending {
        Plain,
        Fallthrough,
        Break,
    }

    #[derive(Clone, Debug)]
    struct Clause {
        /// Match values; `true` means the value is computed by a
        /// call.
        matches: Vec<(i64, bool)>,
        ending: Ending,
    }

    fn ending() -> impl Strategy<Value = Ending> {
        prop_oneof![
            Just(Ending::Plain),
            Just(Ending::Fallthrough),
            Just(Ending::Break),
        ]
    }

    fn clause() -> impl Strategy<Value = Clause> {
        (prop::collection::vec((0i64..4, any::<bool>()), 1..3), ending())
            .prop_map(|(matches, ending)| Clause { matches, ending })
    }

    /// Clauses, where to put `default` (if anywhere), how `default`
    /// ends, and the tag value.
    fn switch_shape() -> impl Strategy<Value = (Vec<Clause>, Option<usize>, Ending, i64)> {
        prop::collection::vec(clause(), 0..5).prop_flat_map(|clauses| {
            let n = clauses.len();
            (
                Just(clauses),
                prop::option::of(0..=n),
                ending(),
                0i64..4,
            )
        })
    }

    fn body(what: Stmt, ending: &Ending, last: bool) -> Vec<Stmt> {
        match ending {
            Ending::Plain => vec![what],
            Ending::Fallthrough if last => vec![what],
            Ending::Fallthrough => vec![what, fallthrough()],
            Ending::Break => vec![what, brk(None), say("unreachable")],
        }
    }

    fn build_switch(
        clauses: &[Clause],
        default_at: Option<usize>,
        default_ending: &Ending,
    ) -> Stmt {
        let total = clauses.len() + usize::from(default_at.is_some());
        let mut out = Vec::with_capacity(total);
        let mut shapes = clauses.iter().enumerate();
        for pos in 0..total {
            let last = pos + 1 == total;
            if default_at == Some(pos) {
                out.push(default(body(say("default"), default_ending, last)));
                continue;
            }
            let Some((i, shape)) = shapes.next() else {
                break;
            };
            let list = shape.matches.iter().map(|&(k, computed)| {
                if computed {
                    call("id", [int(k)])
                } else {
                    int(k)
                }
            });
            let i = i64::try_from(i).unwrap_or(0);
            out.push(case(list, body(print(int(i)), &shape.ending, last)));
        }
        switch(Some(call("tag", [])), out)
    }

    #[derive(Clone, Debug)]
    enum Cond {
        Call(usize),
        Lit(bool),
        Not(Box<Cond>),
        And(Box<Cond>, Box<Cond>),
        Or(Box<Cond>, Box<Cond>),
    }

    impl Cond {
        fn to_expr(&self) -> Arc<Expr> {
            match self {
                Self::Call(i) => call(&format!("b{i}"), []),
                Self::Lit(b) => ident(if *b { "true" } else { "false" }),
                Self::Not(x) => not(paren(x.to_expr())),
                Self::And(x, y) => and(paren(x.to_expr()), paren(y.to_expr())),
                Self::Or(x, y) => or(paren(x.to_expr()), paren(y.to_expr())),
            }
        }
    }

    fn cond() -> impl Strategy<Value = Cond> {
        let leaf = prop_oneof![
            (0usize..4).prop_map(Cond::Call),
            any::<bool>().prop_map(Cond::Lit),
        ];
        leaf.prop_recursive(4, 24, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|x| Cond::Not(Box::new(x))),
                (inner.clone(), inner.clone())
                    .prop_map(|(x, y)| Cond::And(Box::new(x), Box::new(y))),
                (inner.clone(), inner).prop_map(|(x, y)| Cond::Or(Box::new(x), Box::new(y))),
            ]
        })
    }

    proptest! {
        #[test]
        fn proptest_switch_lowering((clauses, default_at, default_ending, tag) in switch_shape()) {
            let stmt = build_switch(&clauses, default_at, &default_ending);
            check_main(
                [stmt, say("end")],
                World::new().returning("tag", [Value::Int(tag)]),
            );
        }

        #[test]
        fn proptest_short_circuit(
            cond in cond(),
            results in prop::array::uniform4(prop::collection::vec(any::<bool>(), 1..4)),
        ) {
            let x = cond.to_expr();
            let mut world = World::new();
            for (i, results) in results.into_iter().enumerate() {
                world = world.returning(&format!("b{i}"), results.into_iter().map(Value::Bool));
            }
            check_main(
                [
                    if_(
                        Arc::clone(&x),
                        [say("yes")],
                        Some(block([say("no")])),
                    ),
                    define([ident("x")], [x]),
                    print(ident("x")),
                ],
                world,
            );
        }
    }
}
