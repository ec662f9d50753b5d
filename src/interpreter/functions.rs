//! Function System
//!
//! Declaration (body collection happens in the dispatcher), invocation with
//! and without frame isolation, and method calls with a `this` binding.
//! `mem` and `rmem` exist from startup as empty functions; together with
//! `eval` and `import` they are always invoked without frame isolation.

use std::collections::HashMap;

use crate::interpreter::errors::{kind, Exec, Flow, RunError};
use crate::interpreter::namespaces::is_valid_name;
use crate::lexer::Command;
use crate::program::Program;
use crate::value::{Instance, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Functions that run in a frame sharing the caller's vars, used
/// namespaces and imported modules.
pub const NON_ISOLATED_FUNCTIONS: &[&str] = &["mem", "rmem", "eval", "import"];

/// A user-defined function (or method).
#[derive(Debug, Clone, Default)]
pub struct Function {
    /// Real (namespaced) name; plain name for methods.
    pub name: String,
    pub namespace: String,
    pub body: Vec<Command>,
    pub docstring: String,
}

impl Function {
    pub fn empty(name: &str) -> Self {
        Self { name: name.to_string(), ..Default::default() }
    }
}

impl Program {
    /// `func name`: open a function (or method, inside a class body) and
    /// start collecting its body.
    pub(crate) fn run_func(&mut self, op: &Command) -> Exec {
        let name = op
            .args
            .first()
            .ok_or_else(|| RunError::new(kind::SYNTAX, "func requires a name"))?
            .clone();
        if !is_valid_name(&name) {
            return Err(RunError::new(
                kind::SYNTAX,
                format!("invalid function name \"{}\"", name),
            )
            .into());
        }
        let docstring = std::mem::take(&mut self.last_docstring);

        if let Some(class_name) = self.current_class.last().cloned() {
            let class = self.classes.get_mut(&class_name).ok_or_else(|| {
                RunError::new(kind::NAME, format!("undefined class \"{}\"", class_name))
            })?;
            class.methods.insert(
                name.clone(),
                Function { name: name.clone(), docstring, ..Default::default() },
            );
            self.current_func.push(name);
        } else {
            let namespace = self.current_namespace();
            let real = format!("{}{}", namespace, name);
            self.functions.insert(
                real.clone(),
                Function { name: real.clone(), namespace, body: Vec::new(), docstring },
            );
            self.current_func.push(real);
        }
        Ok(())
    }

    pub(crate) fn run_endfunc(&mut self, _op: &Command) -> Exec {
        self.current_func
            .pop()
            .map(|_| ())
            .ok_or_else(|| RunError::new(kind::SYNTAX, "endfunc outside of a function").into())
    }

    /// `return`: leave the evaluated argument in the memory slot and pop
    /// the current frame immediately.
    pub(crate) fn run_return(&mut self, op: &Command) -> Exec {
        self.mem = if op.args_text.is_empty() {
            Value::Null
        } else {
            crate::expr::eval_text(self, &op.args_text, true)?
        };
        Err(Flow::Return)
    }

    /// Call a user function by real name. The argument travels through the
    /// memory slot; the return value is whatever the callee leaves there.
    pub fn call_function(
        &mut self,
        real_name: &str,
        arg: Value,
        default_vars: Option<HashMap<String, Value>>,
    ) -> Result<Value, Flow> {
        let func = self.functions.get(real_name).cloned().ok_or_else(|| {
            Flow::Raise(RunError::new(
                kind::NAME,
                format!("undefined function \"{}\"", real_name),
            ))
        })?;
        let isolate = !NON_ISOLATED_FUNCTIONS.contains(&real_name);
        self.mem = arg;
        self.exec_func(&func.body, isolate, default_vars)?;
        Ok(self.take_mem())
    }

    /// Call a method on an instance; `this` is passed as a default binding
    /// into the isolated frame.
    pub fn call_method(
        &mut self,
        instance: Rc<RefCell<Instance>>,
        method: &str,
        arg: Value,
    ) -> Result<Value, Flow> {
        let class_name = instance.borrow().class_name.clone();
        let func = self
            .classes
            .get(&class_name)
            .and_then(|c| c.methods.get(method))
            .cloned()
            .ok_or_else(|| {
                Flow::Raise(RunError::new(
                    kind::METHOD,
                    format!("undefined method \"{}\" on \"{}\"", method, class_name),
                ))
            })?;
        let mut defaults = HashMap::new();
        defaults.insert("this".to_string(), Value::Instance(instance));
        self.mem = arg;
        self.exec_func(&func.body, true, Some(defaults))?;
        Ok(self.take_mem())
    }

    /// Call a registered native with an already-bundled argument.
    pub fn call_native(&mut self, name: &str, arg: Value) -> Result<Value, Flow> {
        let native = self.natives.get(name).ok_or_else(|| {
            Flow::Raise(RunError::new(
                kind::NAME,
                format!("undefined function \"{}\"", name),
            ))
        })?;
        native(self, arg)
    }
}
