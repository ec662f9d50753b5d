//! Output and process natives.

use crate::interpreter::errors::{kind, Flow, RunError};
use crate::program::Program;
use crate::value::Value;

/// `print(value)`: write the display form plus a newline.
pub fn print(prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    prog.output_write(&format!("{}\n", arg));
    Ok(Value::Null)
}

/// `exit()` / `exit(code)`: terminate the program.
pub fn exit(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    match arg {
        Value::Null => Err(Flow::Exit(0)),
        Value::Int(code) => Err(Flow::Exit(code as i32)),
        other => Err(Flow::Raise(RunError::new(
            kind::ARGUMENT,
            format!("exit requires an int, got {}", other.type_name()),
        ))),
    }
}
