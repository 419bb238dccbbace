use std::collections::HashMap;

use log::debug;

use crate::{builtin::builtin_bindings, error::LispError, value::Value};


/// The one flat, global scope of a run. Every `define`, `set` and `function` lands here,
/// including the ones performed from inside a procedure body.
#[derive(Debug, Clone)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    /// An environment without constants or primitives
    pub fn empty() -> Self {
        Self { bindings: HashMap::new() }
    }

    pub fn get(&self, name: &str) -> Result<Value, LispError> {
        self.bindings.get(name)
            .cloned()
            .ok_or_else(|| LispError::UndefinedSymbol(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn define(&mut self, name: &str, value: Value) {
        debug!("binding {} to {}", name, value);
        self.bindings.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self { bindings: builtin_bindings() }
    }
}
