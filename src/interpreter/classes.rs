//! Class System
//!
//! Classes collect properties (`$name = expr` inside the body) and methods
//! (`func` inside the body). Instantiation deep-copies the property table,
//! stamps the `type` attribute and invokes `init` when defined. Instances
//! are reference-like: their property map is shared through the value.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::interpreter::errors::{kind, Exec, Flow, RunError};
use crate::interpreter::functions::Function;
use crate::interpreter::namespaces::is_valid_name;
use crate::lexer::Command;
use crate::program::Program;
use crate::value::{Instance, Value};

/// A user-defined class.
#[derive(Debug, Clone, Default)]
pub struct Class {
    /// Real (namespaced) name.
    pub name: String,
    pub namespace: String,
    pub props: IndexMap<String, Value>,
    pub methods: IndexMap<String, Function>,
    pub docstring: String,
}

/// The well-known error class name.
pub const ERROR_CLASS: &str = "Error";

/// The built-in `Error` class registered at startup.
pub fn builtin_error_class() -> Class {
    let props: IndexMap<String, Value> = [
        ("type".to_string(), Value::Null),
        ("message".to_string(), Value::Null),
        ("file_path".to_string(), Value::Null),
        ("line_number".to_string(), Value::Null),
    ]
    .into_iter()
    .collect();
    Class { name: ERROR_CLASS.to_string(), props, ..Default::default() }
}

impl Program {
    /// `class Name`: open a class body.
    pub(crate) fn run_class(&mut self, op: &Command) -> Exec {
        let name = op
            .args
            .first()
            .ok_or_else(|| RunError::new(kind::SYNTAX, "class requires a name"))?
            .clone();
        if !is_valid_name(&name) {
            return Err(RunError::new(
                kind::SYNTAX,
                format!("invalid class name \"{}\"", name),
            )
            .into());
        }
        let namespace = self.current_namespace();
        let real = format!("{}{}", namespace, name);
        let docstring = std::mem::take(&mut self.last_docstring);
        self.classes.insert(
            real.clone(),
            Class { name: real.clone(), namespace, docstring, ..Default::default() },
        );
        self.current_class.push(real);
        Ok(())
    }

    pub(crate) fn run_endclass(&mut self, _op: &Command) -> Exec {
        self.current_class
            .pop()
            .map(|_| ())
            .ok_or_else(|| RunError::new(kind::SYNTAX, "endclass outside of a class").into())
    }

    /// Declare or initialize a property on the innermost open class.
    pub(crate) fn set_class_prop(&mut self, name: &str, value: Value) -> Exec {
        let class_name = self.current_class.last().cloned().ok_or_else(|| {
            RunError::new(kind::SYNTAX, "property declaration outside of a class")
        })?;
        let class = self.classes.get_mut(&class_name).ok_or_else(|| {
            RunError::new(kind::NAME, format!("undefined class \"{}\"", class_name))
        })?;
        class.props.insert(name.to_string(), value);
        Ok(())
    }

    /// Construct an instance of a class by real name, invoking `init` with
    /// the construction argument when the class defines it.
    pub fn instantiate(&mut self, real_name: &str, arg: Value) -> Result<Value, Flow> {
        let class = self.classes.get(real_name).cloned().ok_or_else(|| {
            Flow::Raise(RunError::new(
                kind::NAME,
                format!("undefined class \"{}\"", real_name),
            ))
        })?;
        let mut props: IndexMap<String, Value> = class
            .props
            .iter()
            .map(|(k, v)| (k.clone(), v.deep_copy()))
            .collect();
        props.insert("type".to_string(), Value::Str(class.name.clone()));
        let instance = Rc::new(RefCell::new(Instance {
            class_name: class.name.clone(),
            props,
        }));
        if class.methods.contains_key("init") {
            self.call_method(Rc::clone(&instance), "init", arg)?;
        }
        Ok(Value::Instance(instance))
    }

    /// `new Class(args)` in command position: the instance lands in the
    /// memory slot.
    pub(crate) fn run_new(&mut self, op: &Command) -> Exec {
        if op.args_text.is_empty() {
            return Err(RunError::new(kind::SYNTAX, "new requires a class").into());
        }
        let text = format!("new {}", op.args_text);
        self.mem = crate::expr::eval_text(self, &text, true)?;
        Ok(())
    }
}
