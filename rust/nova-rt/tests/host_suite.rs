//! Host embedding surface: output capture, native registration, engine
//! isolation, and diagnostic rendering.

use nova_compiler::diagnostics::DiagnosticKind;
use nova_rt::value::{to_number, Value};
use nova_rt::Interpreter;

#[test]
fn captured_output_accumulates_in_order() {
    let mut interp = Interpreter::with_capture();
    interp.evaluate("console.log(1); console.log(2);").unwrap();
    interp.evaluate("console.log(3);").unwrap();
    assert_eq!(interp.captured_output().as_deref(), Some("1\n2\n3\n"));
}

#[test]
fn evaluate_returns_the_final_statement_value() {
    let mut interp = Interpreter::with_capture();
    assert_eq!(interp.evaluate("1 + 2;").unwrap(), Value::Number(3.0));
    assert_eq!(interp.evaluate("let x = 5;").unwrap(), Value::Undefined);
    assert_eq!(interp.evaluate("x * 2;").unwrap(), Value::Number(10.0));
}

#[test]
fn bindings_persist_across_evaluate_calls() {
    let mut interp = Interpreter::with_capture();
    interp.evaluate("let counter = 0;").unwrap();
    interp.evaluate("counter += 1; counter += 1;").unwrap();
    assert_eq!(interp.evaluate("counter;").unwrap(), Value::Number(2.0));
}

#[test]
fn engines_are_isolated() {
    let mut a = Interpreter::with_capture();
    let mut b = Interpreter::with_capture();
    a.evaluate("let x = 1;").unwrap();
    let err = b.evaluate("x;").unwrap_err();
    assert_eq!(err.message, "undefined variable 'x'");
}

#[test]
fn registered_natives_are_callable() {
    let mut interp = Interpreter::with_capture();
    interp.register_native("twice", |args, _| {
        Ok(Value::Number(to_number(args.first().unwrap_or(&Value::Undefined)) * 2.0))
    });
    assert_eq!(interp.evaluate("twice(21);").unwrap(), Value::Number(42.0));
}

#[test]
fn native_errors_are_catchable_throws() {
    let mut interp = Interpreter::with_capture();
    interp.register_native("fail", |_, _| Err("host refused".to_string()));
    interp
        .evaluate("try { fail(); } catch (e) { console.log(e); }")
        .unwrap();
    assert_eq!(interp.captured_output().as_deref(), Some("host refused\n"));
}

#[test]
fn natives_can_read_the_environment() {
    use nova_rt::env::Frame;
    let mut interp = Interpreter::with_capture();
    interp.register_native("peek", |args, env| {
        let name = match args.first() {
            Some(Value::Str(s)) => s.as_ref().clone(),
            _ => return Err("peek: expected a name".to_string()),
        };
        Ok(Frame::lookup(env, &name).unwrap_or(Value::Undefined))
    });
    assert_eq!(
        interp.evaluate(r#"let secret = 7; peek("secret");"#).unwrap(),
        Value::Number(7.0)
    );
}

#[test]
fn global_names_include_builtins_and_user_bindings() {
    let mut interp = Interpreter::with_capture();
    interp.evaluate("let mine = 1;").unwrap();
    let names = interp.global_names();
    for expected in ["console", "Math", "Array", "typeof", "mine"] {
        assert!(names.iter().any(|n| n == expected), "missing {}", expected);
    }
}

#[test]
fn diagnostics_render_with_coordinates() {
    let mut interp = Interpreter::with_capture();
    let err = interp.evaluate("const x = 1;\nx = 2;").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::RuntimeError);
    assert_eq!(
        err.render("script.nova"),
        "script.nova:2:1: RuntimeError: assignment to constant 'x'"
    );
}

#[test]
fn syntax_diagnostics_carry_their_stage() {
    let mut interp = Interpreter::with_capture();
    assert_eq!(
        interp.evaluate("\"unterminated").unwrap_err().kind,
        DiagnosticKind::LexError
    );
    assert_eq!(
        interp.evaluate("let = 1;").unwrap_err().kind,
        DiagnosticKind::ParseError
    );
}

#[test]
fn one_shot_evaluate_is_isolated() {
    assert_eq!(nova_rt::evaluate("2 ** 8;").unwrap(), Value::Number(256.0));
    let err = nova_rt::evaluate("leftover;").unwrap_err();
    assert_eq!(err.message, "undefined variable 'leftover'");
}
