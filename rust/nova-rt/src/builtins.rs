//! Built-in globals: `console`, `Math`, `Array`, and `typeof`.
//!
//! Built-ins are ordinary bindings injected into a fresh global frame
//! before evaluation begins; hosts add their own with
//! [`crate::Interpreter::register_native`].

use crate::env::{EnvRef, Frame};
use crate::value::{to_number, NativeFunction, Value};
use crate::OutputSink;
use indexmap::IndexMap;
use std::rc::Rc;

pub fn install_globals(env: &EnvRef, sink: &OutputSink) {
    Frame::define(env, "console", console_object(sink), false);
    Frame::define(env, "Math", math_object(), false);
    Frame::define(env, "Array", array_object(), false);
    Frame::define(
        env,
        "typeof",
        native("typeof", |args, _| {
            let name = args.first().map(|v| v.type_name()).unwrap_or("undefined");
            Ok(Value::string(name))
        }),
        false,
    );
}

fn native(
    name: &str,
    func: impl Fn(&[Value], &EnvRef) -> Result<Value, String> + 'static,
) -> Value {
    Value::Native(Rc::new(NativeFunction {
        name: name.to_string(),
        func: Box::new(func),
    }))
}

fn object(entries: Vec<(&str, Value)>) -> Value {
    let mut map = IndexMap::new();
    for (key, value) in entries {
        map.insert(key.to_string(), value);
    }
    Value::new_object(map)
}

fn console_object(sink: &OutputSink) -> Value {
    let sink = sink.clone();
    object(vec![(
        "log",
        native("log", move |args, _| {
            let line = args
                .iter()
                .map(|v| v.as_string())
                .collect::<Vec<_>>()
                .join(" ");
            sink.write_line(&line);
            Ok(Value::Undefined)
        }),
    )])
}

fn arg_number(args: &[Value], i: usize) -> f64 {
    to_number(args.get(i).unwrap_or(&Value::Undefined))
}

fn math_object() -> Value {
    object(vec![
        ("PI", Value::Number(std::f64::consts::PI)),
        ("E", Value::Number(std::f64::consts::E)),
        (
            "abs",
            native("abs", |args, _| Ok(Value::Number(arg_number(args, 0).abs()))),
        ),
        (
            "floor",
            native("floor", |args, _| {
                Ok(Value::Number(arg_number(args, 0).floor()))
            }),
        ),
        (
            "ceil",
            native("ceil", |args, _| {
                Ok(Value::Number(arg_number(args, 0).ceil()))
            }),
        ),
        (
            "round",
            native("round", |args, _| {
                // Halves round toward positive infinity.
                Ok(Value::Number((arg_number(args, 0) + 0.5).floor()))
            }),
        ),
        (
            "sqrt",
            native("sqrt", |args, _| {
                Ok(Value::Number(arg_number(args, 0).sqrt()))
            }),
        ),
        (
            "pow",
            native("pow", |args, _| {
                Ok(Value::Number(arg_number(args, 0).powf(arg_number(args, 1))))
            }),
        ),
        (
            "min",
            native("min", |args, _| {
                let mut best = f64::INFINITY;
                for arg in args {
                    let n = to_number(arg);
                    if n.is_nan() {
                        return Ok(Value::Number(f64::NAN));
                    }
                    if n < best {
                        best = n;
                    }
                }
                Ok(Value::Number(best))
            }),
        ),
        (
            "max",
            native("max", |args, _| {
                let mut best = f64::NEG_INFINITY;
                for arg in args {
                    let n = to_number(arg);
                    if n.is_nan() {
                        return Ok(Value::Number(f64::NAN));
                    }
                    if n > best {
                        best = n;
                    }
                }
                Ok(Value::Number(best))
            }),
        ),
    ])
}

fn array_object() -> Value {
    object(vec![
        (
            "isArray",
            native("isArray", |args, _| {
                Ok(Value::Bool(matches!(args.first(), Some(Value::Array(_)))))
            }),
        ),
        (
            "from",
            native("from", |args, _| match args.first() {
                Some(Value::Array(items)) => Ok(Value::new_array(items.borrow().clone())),
                Some(Value::Str(s)) => Ok(Value::new_array(
                    s.chars().map(|c| Value::string(c.to_string())).collect(),
                )),
                Some(other) => Err(format!("Array.from: {} is not iterable", other.type_name())),
                None => Err("Array.from: undefined is not iterable".to_string()),
            }),
        ),
    ])
}
