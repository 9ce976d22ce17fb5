use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A scope's bindings plus an optional link to its enclosing scope.
/// Extended with `ancestor`/`get_at`/`assign_at` so the interpreter can
/// use the resolver's precomputed scope distances instead of walking
/// up until a name is found.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(parent) = &self.parent {
            return parent.get(name);
        }
        Err(RuntimeError::new(
            name.clone(),
            format!("Undefined variable '{}'.", name.lexeme),
        ))
    }

    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&name.lexeme) {
            self.bindings.borrow_mut().insert(name.lexeme.clone(), value);
            return Ok(());
        }
        if let Some(parent) = &self.parent {
            return parent.assign(name, value);
        }
        Err(RuntimeError::new(
            name.clone(),
            format!("Undefined variable '{}'.", name.lexeme),
        ))
    }

    /// Walks exactly `distance` parent links up from `self`. Panics if
    /// the chain is shorter than `distance`, which the resolver
    /// guarantees never happens for any expression it annotated.
    fn ancestor(self: &Rc<Self>, distance: usize) -> Rc<Environment> {
        let mut env = self.clone();
        for _ in 0..distance {
            env = env
                .parent
                .clone()
                .expect("resolver distance exceeds environment chain length");
        }
        env
    }

    pub fn get_at(self: &Rc<Self>, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        let env = self.ancestor(distance);
        let value = env.bindings.borrow().get(&name.lexeme).cloned();
        value.ok_or_else(|| {
            RuntimeError::new(
                name.clone(),
                format!("Undefined variable '{}'.", name.lexeme),
            )
        })
    }

    pub fn assign_at(self: &Rc<Self>, distance: usize, name: &Token, value: Value) {
        let env = self.ancestor(distance);
        env.bindings.borrow_mut().insert(name.lexeme.clone(), value);
    }
}
