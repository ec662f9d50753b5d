//! Native Registry
//!
//! Table of host-registered callables. A native receives a single value
//! (multi-argument calls arrive bundled as a list, zero-argument calls as
//! null) and returns a single value; failures surface as raised error
//! kinds.

use std::collections::HashMap;
use std::rc::Rc;

use crate::interpreter::errors::Flow;
use crate::program::Program;
use crate::value::Value;

/// A native callable.
pub type NativeFn = Rc<dyn Fn(&mut Program, Value) -> Result<Value, Flow>>;

pub struct NativeRegistry {
    table: HashMap<String, NativeFn>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self { table: HashMap::new() }
    }

    pub fn register(
        &mut self,
        name: &str,
        f: impl Fn(&mut Program, Value) -> Result<Value, Flow> + 'static,
    ) {
        self.table.insert(name.to_string(), Rc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.table.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.table.keys().map(String::as_str).collect()
    }
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
