use crate::interpreter::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// One lexical scope. Clones share the same bindings; a child only
/// looks through its `enclosing` link, it never writes into it except
/// via `assign`.
#[derive(Clone, Debug)]
pub struct Environment {
    data: Rc<RefCell<EnvironmentImpl>>,
}

#[derive(Debug)]
struct EnvironmentImpl {
    values: BTreeMap<String, Value>,
    enclosing: Option<Environment>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            data: Rc::new(RefCell::new(EnvironmentImpl {
                values: BTreeMap::new(),
                enclosing: None,
            })),
        }
    }
    pub fn new_child(&self) -> Environment {
        Environment {
            data: Rc::new(RefCell::new(EnvironmentImpl {
                values: BTreeMap::new(),
                enclosing: Some(self.clone()),
            })),
        }
    }
    pub fn enclosing(&self) -> Option<Environment> {
        self.data.borrow().enclosing.clone()
    }
    pub fn define(&mut self, name: &str, value: Value) {
        self.data
            .borrow_mut()
            .values
            .insert(name.to_string(), value);
    }
    pub fn get(&self, token: &Token) -> Result<Value, RuntimeError> {
        let data = self.data.borrow();
        match data.values.get(token.lexeme) {
            Some(x) => Ok(x.clone()),
            None => match &data.enclosing {
                Some(enclosing) => enclosing.get(token),
                None => Err(undefined(token)),
            },
        }
    }
    pub fn assign(&mut self, token: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut data = self.data.borrow_mut();
        if let Some(x) = data.values.get_mut(token.lexeme) {
            *x = value;
            return Ok(());
        }
        match &mut data.enclosing {
            Some(enclosing) => enclosing.assign(token, value),
            None => Err(undefined(token)),
        }
    }
    pub fn equals(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::new()
    }
}

fn undefined(token: &Token) -> RuntimeError {
    RuntimeError::new(
        format!("Undefined variable '{}'.", token.lexeme).as_str(),
        token,
    )
}
