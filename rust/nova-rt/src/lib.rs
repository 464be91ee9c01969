//! NovaLang Runtime
//!
//! Tree-walking evaluator over the `nova-compiler` AST: the runtime value
//! model, the lexical environment chain, built-in globals, and the host
//! embedding surface.

pub mod builtins;
pub mod env;
pub mod interp;
pub mod value;

use env::{EnvRef, Frame};
use interp::Evaluator;
use nova_compiler::diagnostics::{Diagnostic, DiagnosticKind};
use std::cell::RefCell;
use std::rc::Rc;
use value::{NativeFunction, Value};

/// Where `console.log` lines go. `Capture` collects them for tests, the
/// REPL, and embedders that want the effect list instead of stdout.
#[derive(Clone)]
pub enum OutputSink {
    Stdout,
    Capture(Rc<RefCell<String>>),
}

impl OutputSink {
    pub fn write_line(&self, line: &str) {
        match self {
            OutputSink::Stdout => println!("{}", line),
            OutputSink::Capture(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.push_str(line);
                buffer.push('\n');
            }
        }
    }
}

/// An isolated NovaLang engine: its own global frame, its own output sink.
/// Separate instances never share state, so hosts can isolate scripts.
pub struct Interpreter {
    globals: EnvRef,
    sink: OutputSink,
}

impl Interpreter {
    /// Engine whose `console.log` writes to stdout.
    pub fn new() -> Self {
        Self::with_sink(OutputSink::Stdout)
    }

    /// Engine that collects output; read it back with
    /// [`Interpreter::captured_output`].
    pub fn with_capture() -> Self {
        Self::with_sink(OutputSink::Capture(Rc::new(RefCell::new(String::new()))))
    }

    fn with_sink(sink: OutputSink) -> Self {
        let globals = Frame::root();
        builtins::install_globals(&globals, &sink);
        Interpreter { globals, sink }
    }

    /// Inject a host function into the global frame before evaluation.
    /// Natives receive the argument list and the current environment; a
    /// `String` error surfaces as a catchable runtime throw.
    pub fn register_native<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&[Value], &EnvRef) -> Result<Value, String> + 'static,
    {
        let value = Value::Native(Rc::new(NativeFunction {
            name: name.to_string(),
            func: Box::new(func),
        }));
        Frame::define(&self.globals, name, value, false);
    }

    /// Tokenize, parse, and evaluate; returns the value of the final
    /// statement. Bindings persist across calls on the same instance,
    /// which is what a REPL wants.
    pub fn evaluate(&mut self, source: &str) -> Result<Value, Diagnostic> {
        let program = nova_compiler::parse(source)?;
        let mut evaluator = Evaluator::new();
        evaluator
            .run_program(&program, &self.globals)
            .map_err(|thrown| {
                Diagnostic::new(
                    DiagnosticKind::RuntimeError,
                    thrown.value.as_string(),
                    thrown.span,
                )
            })
    }

    /// Everything `console.log` has written so far, or `None` for a
    /// stdout-backed engine.
    pub fn captured_output(&self) -> Option<String> {
        match &self.sink {
            OutputSink::Stdout => None,
            OutputSink::Capture(buffer) => Some(buffer.borrow().clone()),
        }
    }

    /// Names bound in the global frame, in declaration order.
    pub fn global_names(&self) -> Vec<String> {
        Frame::local_names(&self.globals)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot evaluation in a fresh, isolated engine.
pub fn evaluate(source: &str) -> Result<Value, Diagnostic> {
    Interpreter::new().evaluate(source)
}
