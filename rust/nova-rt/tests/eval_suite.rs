//! End-to-end language semantics: programs in, values and output out.

use nova_compiler::diagnostics::{Diagnostic, DiagnosticKind};
use nova_rt::value::Value;
use nova_rt::Interpreter;

fn run(src: &str) -> (Result<Value, Diagnostic>, String) {
    let mut interp = Interpreter::with_capture();
    let result = interp.evaluate(src);
    let output = interp.captured_output().unwrap_or_default();
    (result, output)
}

fn run_output(src: &str) -> String {
    let (result, output) = run(src);
    result.expect("program should evaluate");
    output
}

fn run_value(src: &str) -> Value {
    run(src).0.expect("program should evaluate")
}

fn run_err(src: &str) -> Diagnostic {
    run(src).0.expect_err("program should fail")
}

// ── Literal scenarios ──

#[test]
fn arithmetic_precedence() {
    assert_eq!(run_output("let x = 1 + 2 * 3; console.log(x);"), "7\n");
}

#[test]
fn arrow_function_call() {
    assert_eq!(
        run_output("const add = (a, b) => a + b; console.log(add(2, 3));"),
        "5\n"
    );
}

#[test]
fn closures_capture_by_reference() {
    let src = "function mk() { let n = 0; return () => { n = n + 1; return n; }; } \
               const c = mk(); console.log(c()); console.log(c()); console.log(c());";
    assert_eq!(run_output(src), "1\n2\n3\n");
}

#[test]
fn array_destructuring_with_rest() {
    let src = "let [a, b, ...r] = [1,2,3,4]; console.log(a); console.log(b); console.log(r);";
    assert_eq!(run_output(src), "1\n2\n[3, 4]\n");
}

#[test]
fn try_catch_finally_ordering() {
    let src = r#"try { throw "oops"; } catch (e) { console.log(e); } finally { console.log("done"); }"#;
    assert_eq!(run_output(src), "oops\ndone\n");
}

#[test]
fn assignment_to_constant_is_a_runtime_error() {
    let err = run_err("const x = 1; x = 2;");
    assert_eq!(err.kind, DiagnosticKind::RuntimeError);
    assert_eq!(err.message, "assignment to constant 'x'");
    // Range pins the second `x`.
    assert_eq!(err.span.start.line, 1);
    assert_eq!(err.span.start.col, 14);
}

// ── Boundary cases ──

#[test]
fn ieee_division_specials() {
    assert_eq!(
        run_output("console.log(1/0); console.log(-1/0); console.log(0/0);"),
        "Infinity\n-Infinity\nNaN\n"
    );
    assert_eq!(run_output("console.log(0/0 === 0/0);"), "false\n");
}

#[test]
fn compound_plus_uses_bracketed_forms() {
    // `+` stringifies arrays and objects through their display form.
    assert_eq!(run_output("console.log([] + []);"), "[][]\n");
    assert_eq!(run_output("console.log([] + {});"), "[]{}\n");
    assert_eq!(run_output("console.log([1, 2] + {a: 1});"), "[1, 2]{a: 1}\n");
}

#[test]
fn empty_program_produces_nothing() {
    let (result, output) = run("");
    assert_eq!(result.unwrap(), Value::Undefined);
    assert_eq!(output, "");
}

#[test]
fn deeply_nested_expressions_evaluate() {
    let mut src = String::new();
    for _ in 0..500 {
        src.push('(');
    }
    src.push('1');
    for _ in 0..500 {
        src.push_str(" + 1)");
    }
    src.push(';');
    assert_eq!(run_value(&src), Value::Number(501.0));
}

// ── Invariants ──

#[test]
fn const_assignment_fails_before_any_effect() {
    let src = r#"
        const x = 1;
        function probe() { console.log("side effect"); return 2; }
        x = probe();
    "#;
    let (result, output) = run(src);
    assert!(result.is_err());
    assert_eq!(output, "", "right-hand side must not run");
}

#[test]
fn short_circuit_skips_the_probe() {
    let src = r#"
        let calls = 0;
        function probe() { calls += 1; return true; }
        false && probe();
        true || probe();
        0 ?? probe();
        console.log(calls);
    "#;
    assert_eq!(run_output(src), "0\n");
}

#[test]
fn primitive_literals_round_trip() {
    for literal in ["1.5", "42", "true", "false", "null"] {
        let direct = run_value(&format!("{};", literal));
        let round_tripped = run_value(&format!("{};", direct.as_string()));
        assert_eq!(direct, round_tripped, "round-trip failed for {}", literal);
    }
}

// ── Operators & coercion ──

#[test]
fn loose_and_strict_equality() {
    assert_eq!(
        run_output(
            r#"console.log(1 == "1", 1 === "1", null == undefined, null === undefined, true == 1);"#
        ),
        "true false true false true\n"
    );
}

#[test]
fn reference_identity_for_compounds() {
    let src = "let a = [1]; let b = a; console.log(a === b, a === [1], {} === {});";
    assert_eq!(run_output(src), "true false false\n");
}

#[test]
fn string_concatenation_rules() {
    assert_eq!(
        run_output(r#"console.log("a" + 1, 1 + 2 + "3", "1" + 2 + 3, true + "!");"#),
        "a1 33 123 true!\n"
    );
}

#[test]
fn numeric_coercion_in_arithmetic() {
    assert_eq!(
        run_output(r#"console.log(true + true, null + 1, "3" * "4", "x" * 2);"#),
        "2 1 12 NaN\n"
    );
}

#[test]
fn relational_operators() {
    assert_eq!(
        run_output(r#"console.log("apple" < "banana", "10" < "9", 10 < 9, "10" < 9);"#),
        "true true false false\n"
    );
}

#[test]
fn logical_operators_return_operands() {
    assert_eq!(
        run_output(r#"console.log(null ?? "d", 0 ?? "d", false || "x", "" || "y", 1 && 2);"#),
        "d 0 x y 2\n"
    );
}

#[test]
fn exponentiation_and_modulo() {
    assert_eq!(
        run_output("console.log(2 ** 10, 2 ** 3 ** 2, 7 % 3, 7 % 0);"),
        "1024 512 1 NaN\n"
    );
}

#[test]
fn unary_operators() {
    assert_eq!(
        run_output(r#"console.log(!0, !"", ![], -"5", +true, -2 ** 2);"#),
        "true true false -5 1 4\n"
    );
}

// ── Control flow ──

#[test]
fn loops_break_continue() {
    let src = r#"
        let sum = 0;
        for (let i = 0; i < 10; i += 1) {
            if (i == 3) { continue; }
            if (i == 6) { break; }
            sum += i;
        }
        console.log(sum);
    "#;
    // 0 + 1 + 2 + 4 + 5
    assert_eq!(run_output(src), "12\n");
}

#[test]
fn while_and_do_while() {
    assert_eq!(
        run_output("let n = 0; while (n < 3) { n += 1; } console.log(n);"),
        "3\n"
    );
    // A do-while body runs at least once.
    assert_eq!(
        run_output("let n = 10; do { n += 1; } while (n < 5); console.log(n);"),
        "11\n"
    );
}

#[test]
fn switch_falls_through_until_break() {
    let src = r#"
        switch (2) {
            case 1: console.log("one");
            case 2: console.log("two");
            case 3: console.log("three"); break;
            default: console.log("other");
        }
    "#;
    assert_eq!(run_output(src), "two\nthree\n");
}

#[test]
fn switch_matches_strictly_and_defaults() {
    let src = r#"
        switch ("2") {
            case 2: console.log("number");  break;
            default: console.log("other");
        }
    "#;
    assert_eq!(run_output(src), "other\n");
}

#[test]
fn finally_overrides_inflight_return() {
    let src = "function f() { try { return 1; } finally { return 2; } } console.log(f());";
    assert_eq!(run_output(src), "2\n");
}

#[test]
fn finally_runs_on_the_throw_path() {
    let src = r#"
        try {
            try { throw "x"; } finally { console.log("fin"); }
        } catch (e) { console.log("caught", e); }
    "#;
    assert_eq!(run_output(src), "fin\ncaught x\n");
}

#[test]
fn uncaught_throw_surfaces_as_runtime_error() {
    let err = run_err(r#"throw "boom";"#);
    assert_eq!(err.kind, DiagnosticKind::RuntimeError);
    assert_eq!(err.message, "boom");
}

#[test]
fn illegal_control_flow_outside_consumers() {
    assert_eq!(run_err("break;").message, "illegal break outside loop");
    assert_eq!(
        run_err("continue;").message,
        "illegal continue outside loop"
    );
    assert_eq!(
        run_err("return 1;").message,
        "illegal return outside function"
    );
}

// ── Bindings & scope ──

#[test]
fn function_declarations_hoist() {
    assert_eq!(
        run_output("console.log(f()); function f() { return 42; }"),
        "42\n"
    );
}

#[test]
fn let_before_declaration_is_undefined_variable() {
    let err = run_err("console.log(y); let y = 1;");
    assert_eq!(err.message, "undefined variable 'y'");
}

#[test]
fn redeclaration_in_same_frame_fails() {
    let err = run_err("let x = 1; let x = 2;");
    assert_eq!(err.message, "redeclaration of 'x'");
}

#[test]
fn blocks_shadow_outer_bindings() {
    assert_eq!(
        run_output("let x = 1; { let x = 2; console.log(x); } console.log(x);"),
        "2\n1\n"
    );
}

#[test]
fn const_array_contents_stay_mutable() {
    assert_eq!(
        run_output("const a = []; a[0] = 1; console.log(a.length);"),
        "1\n"
    );
}

#[test]
fn for_header_scope_is_contained() {
    let err = run_err("for (let i = 0; i < 1; i += 1) {} console.log(i);");
    assert_eq!(err.message, "undefined variable 'i'");
}

// ── Functions ──

#[test]
fn parameter_defaults_and_rest() {
    let src = "function f(a, b = 10, ...r) { return a + b + r.length; } \
               console.log(f(1), f(1, 2, 3, 4));";
    assert_eq!(run_output(src), "11 5\n");
}

#[test]
fn missing_arguments_become_undefined() {
    assert_eq!(
        run_output("function f(a, b) { return b; } console.log(f(1));"),
        "undefined\n"
    );
}

#[test]
fn function_without_return_yields_undefined() {
    assert_eq!(run_output("function f() { 1; } console.log(f());"), "undefined\n");
}

#[test]
fn spread_expands_call_arguments() {
    let src = "function add3(a, b, c) { return a + b + c; } console.log(add3(...[1, 2, 3]));";
    assert_eq!(run_output(src), "6\n");
}

#[test]
fn calling_a_non_function_fails() {
    assert_eq!(run_err("let x = 1; x();").message, "number is not callable");
}

#[test]
fn runaway_recursion_is_reported_not_fatal() {
    let err = run_err("function f(n) { return f(n + 1); } f(0);");
    assert_eq!(err.message, "maximum call depth exceeded");
}

// ── Destructuring ──

#[test]
fn object_destructuring_shorthand_rename_default_rest() {
    let src = "let {a, b: bb, c = 5, ...rest} = {a: 1, b: 2, d: 4}; \
               console.log(a, bb, c, rest);";
    assert_eq!(run_output(src), "1 2 5 {d: 4}\n");
}

#[test]
fn array_destructuring_holes_and_defaults() {
    assert_eq!(
        run_output("let [, a, b = 7] = [1, 2]; console.log(a, b);"),
        "2 7\n"
    );
}

#[test]
fn destructuring_assignment_to_existing_bindings() {
    assert_eq!(
        run_output("let a = 0; let b = 0; [a, b] = [3, 4]; console.log(a, b);"),
        "3 4\n"
    );
}

#[test]
fn destructuring_non_array_fails() {
    let err = run_err("let [a] = 5;");
    assert!(err.message.contains("cannot destructure"), "{}", err.message);
}

// ── Arrays & objects ──

#[test]
fn arrays_are_shared_by_reference() {
    assert_eq!(
        run_output("let a = [1]; let b = a; b[0] = 9; console.log(a[0]);"),
        "9\n"
    );
}

#[test]
fn array_growth_fills_holes_with_undefined() {
    let src = "let a = [1]; a[3] = 9; console.log(a.length); console.log(a);";
    assert_eq!(run_output(src), "4\n[1, undefined, undefined, 9]\n");
}

#[test]
fn out_of_range_reads_are_undefined() {
    assert_eq!(
        run_output("let a = [1]; console.log(a[5], a[-1], a[0.5]);"),
        "undefined undefined undefined\n"
    );
}

#[test]
fn object_member_access_and_update() {
    let src = r#"
        let o = {a: 1};
        o.b = 2;
        o["c"] = 3;
        console.log(o.a, o.b, o.c, o.missing);
        console.log(o);
    "#;
    assert_eq!(run_output(src), "1 2 3 undefined\n{a: 1, b: 2, c: 3}\n");
}

#[test]
fn object_spread_copies_enumerable_properties() {
    assert_eq!(
        run_output("let o = {a: 1, b: 2}; let p = {...o, b: 9}; console.log(p);"),
        "{a: 1, b: 9}\n"
    );
}

#[test]
fn array_spread_in_literals() {
    assert_eq!(run_output("console.log([0, ...[1, 2], 3]);"), "[0, 1, 2, 3]\n");
}

#[test]
fn named_property_assignment_on_array_fails() {
    let err = run_err("let a = []; a.x = 1;");
    assert_eq!(err.message, "cannot set property 'x' on array");
}

#[test]
fn member_access_on_primitives_fails() {
    let err = run_err("null.x;");
    assert_eq!(err.message, "cannot read property 'x' of null");
    assert_eq!(run_err("true[0];").message, "boolean is not indexable");
}

// ── Built-ins ──

#[test]
fn console_log_joins_with_spaces() {
    assert_eq!(
        run_output(r#"console.log(1, "two", [3], {x: 4}, null);"#),
        "1 two [3] {x: 4} null\n"
    );
}

#[test]
fn math_builtins() {
    assert_eq!(
        run_output(
            "console.log(Math.abs(-3), Math.floor(1.7), Math.ceil(1.2), Math.sqrt(9), Math.pow(2, 10));"
        ),
        "3 1 2 3 1024\n"
    );
    assert_eq!(
        run_output("console.log(Math.max(1, 5, 3), Math.min(), Math.round(2.5), Math.round(-0.5));"),
        "5 Infinity 3 0\n"
    );
    assert_eq!(run_output("console.log(Math.PI > 3.14 && Math.PI < 3.15);"), "true\n");
}

#[test]
fn array_introspection_and_construction() {
    assert_eq!(
        run_output("console.log(Array.isArray([]), Array.isArray({}));"),
        "true false\n"
    );
    assert_eq!(run_output(r#"console.log(Array.from("ab"));"#), "[\"a\", \"b\"]\n");
    assert_eq!(
        run_output("let a = [1]; let b = Array.from(a); b[0] = 2; console.log(a[0], b[0]);"),
        "1 2\n"
    );
}

#[test]
fn array_from_rejects_non_iterables_catchably() {
    assert_eq!(
        run_output("try { Array.from(1); } catch (e) { console.log(e); }"),
        "Array.from: number is not iterable\n"
    );
}

#[test]
fn typeof_names() {
    let src = r#"console.log(typeof(1), typeof("s"), typeof(true), typeof(null),
                             typeof(undefined), typeof([]), typeof({}), typeof(typeof));"#;
    assert_eq!(
        run_output(src),
        "number string boolean null undefined array object function\n"
    );
}

// ── Templates (interpolation deferred) ──

#[test]
fn template_literal_is_its_raw_text() {
    assert_eq!(
        run_output(r#"let name = "x"; console.log(`hello ${name}`);"#),
        "hello ${name}\n"
    );
}
