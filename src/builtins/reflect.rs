//! Program-level natives: `eval` and `import`.
//!
//! Both run against the caller's frame (no isolation), so declarations and
//! variable writes they produce stay visible to the caller.

use crate::interpreter::errors::{kind, Flow, RunError};
use crate::lexer;
use crate::program::Program;
use crate::value::Value;

/// `eval(code)`: parse and execute a code string without frame isolation;
/// returns whatever the code leaves in the memory slot.
pub fn eval(prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    let Value::Str(code) = arg else {
        return Err(Flow::Raise(RunError::new(
            kind::ARGUMENT,
            format!("eval requires a string, got {}", arg.type_name()),
        )));
    };
    let body = lexer::parse(&code, "<eval>")
        .map_err(|e| Flow::Raise(RunError::new(kind::SYNTAX, e.to_string())))?;
    prog.exec_func(&body, false, None)?;
    Ok(prog.take_mem())
}

/// `import(path)` / `import([path, ...])`: load modules by logical name
/// (`@mod`) or filesystem path.
pub fn import(prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    let paths = match arg {
        Value::Str(path) => vec![path],
        Value::List(items) => {
            let mut paths = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Str(path) => paths.push(path),
                    other => {
                        return Err(Flow::Raise(RunError::new(
                            kind::ARGUMENT,
                            format!("invalid argument type: {}", other.type_name()),
                        )))
                    }
                }
            }
            paths
        }
        other => {
            return Err(Flow::Raise(RunError::new(
                kind::ARGUMENT,
                format!("invalid argument type: {}", other.type_name()),
            )))
        }
    };
    prog.import_script(&paths, false, false)?;
    Ok(Value::Null)
}
