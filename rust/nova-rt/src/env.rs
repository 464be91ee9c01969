//! Lexical environment chain: frames of name → (value, mutability).

use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

pub type EnvRef = Rc<RefCell<Frame>>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvError {
    #[error("redeclaration of '{0}'")]
    Redeclared(String),
    #[error("assignment to constant '{0}'")]
    AssignToConst(String),
    #[error("undefined variable '{0}'")]
    Undefined(String),
}

#[derive(Clone)]
struct Binding {
    value: Value,
    mutable: bool,
}

/// One lexical scope record. Frames are created on function entry, block
/// entry, and for `for` loop headers; closures keep their capture frame
/// alive through the `Rc`.
pub struct Frame {
    bindings: IndexMap<String, Binding>,
    parent: Option<EnvRef>,
}

impl Frame {
    pub fn root() -> EnvRef {
        Rc::new(RefCell::new(Frame {
            bindings: IndexMap::new(),
            parent: None,
        }))
    }

    pub fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Frame {
            bindings: IndexMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Introduce a binding in `env`'s own frame. Declaring a name twice in
    /// the same frame is an error.
    pub fn declare(
        env: &EnvRef,
        name: &str,
        value: Value,
        mutable: bool,
    ) -> Result<(), EnvError> {
        let mut frame = env.borrow_mut();
        if frame.bindings.contains_key(name) {
            return Err(EnvError::Redeclared(name.to_string()));
        }
        frame
            .bindings
            .insert(name.to_string(), Binding { value, mutable });
        Ok(())
    }

    /// Insert or replace unconditionally; used for built-ins and host
    /// natives injected into the global frame.
    pub fn define(env: &EnvRef, name: &str, value: Value, mutable: bool) {
        env.borrow_mut()
            .bindings
            .insert(name.to_string(), Binding { value, mutable });
    }

    /// Assign to the nearest enclosing binding of `name`.
    pub fn assign(env: &EnvRef, name: &str, value: Value) -> Result<(), EnvError> {
        let Some(owner) = Frame::resolve(env, name) else {
            return Err(EnvError::Undefined(name.to_string()));
        };
        let mut frame = owner.borrow_mut();
        match frame.bindings.get_mut(name) {
            Some(binding) if !binding.mutable => Err(EnvError::AssignToConst(name.to_string())),
            Some(binding) => {
                binding.value = value;
                Ok(())
            }
            None => Err(EnvError::Undefined(name.to_string())),
        }
    }

    /// Check that `name` resolves to a mutable binding without writing to
    /// it. Lets assignment reject constant targets before the right-hand
    /// side is evaluated.
    pub fn check_assignable(env: &EnvRef, name: &str) -> Result<(), EnvError> {
        let Some(owner) = Frame::resolve(env, name) else {
            return Err(EnvError::Undefined(name.to_string()));
        };
        let frame = owner.borrow();
        match frame.bindings.get(name) {
            Some(binding) if !binding.mutable => Err(EnvError::AssignToConst(name.to_string())),
            Some(_) => Ok(()),
            None => Err(EnvError::Undefined(name.to_string())),
        }
    }

    /// Walk parents until `name` is found.
    pub fn lookup(env: &EnvRef, name: &str) -> Option<Value> {
        let owner = Frame::resolve(env, name)?;
        let frame = owner.borrow();
        frame.bindings.get(name).map(|b| b.value.clone())
    }

    /// Names bound in `env`'s own frame, in declaration order.
    pub fn local_names(env: &EnvRef) -> Vec<String> {
        env.borrow().bindings.keys().cloned().collect()
    }

    fn resolve(env: &EnvRef, name: &str) -> Option<EnvRef> {
        let mut current = Rc::clone(env);
        loop {
            if current.borrow().bindings.contains_key(name) {
                return Some(current);
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(p) => current = p,
                None => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_lookup() {
        let env = Frame::root();
        Frame::declare(&env, "x", Value::Number(1.0), true).unwrap();
        assert_eq!(Frame::lookup(&env, "x"), Some(Value::Number(1.0)));
        assert_eq!(Frame::lookup(&env, "y"), None);
    }

    #[test]
    fn redeclaration_in_same_frame_is_an_error() {
        let env = Frame::root();
        Frame::declare(&env, "x", Value::Number(1.0), true).unwrap();
        assert_eq!(
            Frame::declare(&env, "x", Value::Number(2.0), true),
            Err(EnvError::Redeclared("x".to_string()))
        );
    }

    #[test]
    fn shadowing_in_a_child_frame_is_allowed() {
        let outer = Frame::root();
        Frame::declare(&outer, "x", Value::Number(1.0), true).unwrap();
        let inner = Frame::child(&outer);
        Frame::declare(&inner, "x", Value::Number(2.0), true).unwrap();
        assert_eq!(Frame::lookup(&inner, "x"), Some(Value::Number(2.0)));
        assert_eq!(Frame::lookup(&outer, "x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn assignment_walks_to_the_nearest_binding() {
        let outer = Frame::root();
        Frame::declare(&outer, "n", Value::Number(0.0), true).unwrap();
        let inner = Frame::child(&outer);
        Frame::assign(&inner, "n", Value::Number(5.0)).unwrap();
        assert_eq!(Frame::lookup(&outer, "n"), Some(Value::Number(5.0)));
    }

    #[test]
    fn const_bindings_reject_assignment() {
        let env = Frame::root();
        Frame::declare(&env, "k", Value::Number(1.0), false).unwrap();
        assert_eq!(
            Frame::assign(&env, "k", Value::Number(2.0)),
            Err(EnvError::AssignToConst("k".to_string()))
        );
    }

    #[test]
    fn assignment_to_missing_name_is_undefined_variable() {
        let env = Frame::root();
        assert_eq!(
            Frame::assign(&env, "ghost", Value::Null),
            Err(EnvError::Undefined("ghost".to_string()))
        );
    }
}
