//! Randomness natives.

use rand::Rng;

use crate::interpreter::errors::{kind, Flow, RunError};
use crate::program::Program;
use crate::value::Value;

/// `random()`: a float in `[0, 1)`; `random([a, b])`: an int in `[a, b]`.
pub fn random(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    let mut rng = rand::thread_rng();
    match arg {
        Value::Null => Ok(Value::Float(rng.gen::<f64>())),
        Value::List(items) => match items.as_slice() {
            [Value::Int(a), Value::Int(b)] if a <= b => {
                Ok(Value::Int(rng.gen_range(*a..=*b)))
            }
            _ => Err(Flow::Raise(RunError::new(
                kind::ARGUMENT,
                "random requires a [low, high] int pair",
            ))),
        },
        other => Err(Flow::Raise(RunError::new(
            kind::ARGUMENT,
            format!("random requires no argument or an int pair, got {}", other.type_name()),
        ))),
    }
}
