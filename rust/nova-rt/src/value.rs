//! Runtime value model for the NovaLang interpreter.
//!
//! Compound values (Array, Object) are shared by reference: binding one to
//! several names aliases the same `Rc<RefCell<_>>` cell, so mutations are
//! visible through every reference. Strict equality on compounds is
//! therefore pointer identity.

use crate::env::EnvRef;
use indexmap::IndexMap;
use nova_compiler::compiler::ast::{Expr, ParamList, Stmt};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub enum Value {
    Number(f64),
    Str(Rc<String>),
    Bool(bool),
    Null,
    Undefined,
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<IndexMap<String, Value>>>),
    Function(Rc<FunctionValue>),
    Native(Rc<NativeFunction>),
}

/// A user function or arrow paired with its capture frame.
pub struct FunctionValue {
    pub name: Option<String>,
    pub params: ParamList,
    pub body: FunctionBody,
    pub env: EnvRef,
}

pub enum FunctionBody {
    /// `function f() { ... }` and block-bodied arrows.
    Block(Vec<Stmt>),
    /// Expression-bodied arrows: the expression is the implicit return.
    Expr(Box<Expr>),
}

/// Host-provided callable: `(args, env) -> value`. A `String` error becomes
/// a runtime throw at the call site.
pub struct NativeFunction {
    pub name: String,
    #[allow(clippy::type_complexity)]
    pub func: Box<dyn Fn(&[Value], &EnvRef) -> Result<Value, String>>,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Rc::new(s.into()))
    }

    pub fn new_array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn new_object(map: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(map)))
    }

    /// Conditional-context conversion: false for `0`, `NaN`, the empty
    /// string, `null`, and `undefined`; true for everything else, including
    /// empty arrays and objects.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Null | Value::Undefined => false,
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Native(_) => true,
        }
    }

    /// The `typeof` name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) | Value::Native(_) => "function",
        }
    }

    /// The string form shared by `+` coercion, `console.log`, and the REPL
    /// echo. Top-level strings print verbatim; strings nested in arrays and
    /// objects print quoted.
    pub fn as_string(&self) -> String {
        self.render(0, false)
    }

    fn render(&self, depth: usize, quote_strings: bool) -> String {
        // Self-referential containers would recurse forever.
        const MAX_RENDER_DEPTH: usize = 16;
        if depth > MAX_RENDER_DEPTH {
            return "...".to_string();
        }
        match self {
            Value::Number(n) => format_number(*n),
            Value::Str(s) => {
                if quote_strings {
                    format!("\"{}\"", s)
                } else {
                    s.as_ref().clone()
                }
            }
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Array(items) => format!(
                "[{}]",
                items
                    .borrow()
                    .iter()
                    .map(|v| v.render(depth + 1, true))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Value::Object(map) => format!(
                "{{{}}}",
                map.borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.render(depth + 1, true)))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Value::Function(func) => match &func.name {
                Some(name) => format!("<function {}>", name),
                None => "<function>".to_string(),
            },
            Value::Native(_) => "<native fn>".to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.render(0, true))
    }
}

/// Strict equality for tests and assertions; see [`strict_eq`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        strict_eq(self, other)
    }
}

/// Shortest round-trip decimal, with the IEEE specials spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        format!("{}", n)
    }
}

/// Numeric coercion for arithmetic and relational operators. Booleans map to
/// 0/1, `null` to 0, `undefined` and non-numeric strings to NaN; compound
/// values do not coerce and yield NaN.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        Value::Null => 0.0,
        Value::Undefined => f64::NAN,
        Value::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Native(_) => f64::NAN,
    }
}

/// `===`: same kind and value-equal payload; reference identity for arrays,
/// objects, and functions. `NaN === NaN` is false.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        (Value::Undefined, Value::Undefined) => true,
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Native(x), Value::Native(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// `==`: restricted coercing equality. Number/string pairs compare after
/// numeric coercion of the string, booleans coerce to number, and
/// `null == undefined`; everything else falls back to `===`.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
        (Value::Number(x), Value::Str(_)) => *x == to_number(b),
        (Value::Str(_), Value::Number(y)) => to_number(a) == *y,
        (Value::Bool(_), _) => loose_eq(&Value::Number(to_number(a)), b),
        (_, Value::Bool(_)) => loose_eq(a, &Value::Number(to_number(b))),
        _ => strict_eq(a, b),
    }
}

/// Relational comparison: lexicographic when both operands are strings,
/// numeric otherwise. `None` (NaN involved) makes every comparison false.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Value::Str(x), Value::Str(y)) = (a, b) {
        return Some(x.cmp(y));
    }
    to_number(a).partial_cmp(&to_number(b))
}
