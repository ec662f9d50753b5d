//! Clock natives.

use std::fmt::Write;

use chrono::{Local, Utc};

use crate::interpreter::errors::{kind, Flow, RunError};
use crate::program::Program;
use crate::value::Value;

/// `time()`: seconds since the Unix epoch, as a float.
pub fn time(_prog: &mut Program, _arg: Value) -> Result<Value, Flow> {
    let now = Utc::now();
    Ok(Value::Float(now.timestamp_millis() as f64 / 1000.0))
}

/// `date()` / `date(format)`: local time, formatted with chrono's strftime
/// specifiers.
pub fn date(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    let format = match arg {
        Value::Null => "%Y-%m-%d %H:%M:%S".to_string(),
        Value::Str(fmt) => fmt,
        other => {
            return Err(Flow::Raise(RunError::new(
                kind::ARGUMENT,
                format!("date requires a format string, got {}", other.type_name()),
            )))
        }
    };
    let mut out = String::new();
    if write!(out, "{}", Local::now().format(&format)).is_err() {
        return Err(Flow::Raise(RunError::new(
            kind::ARGUMENT,
            format!("invalid date format \"{}\"", format),
        )));
    }
    Ok(Value::Str(out))
}
