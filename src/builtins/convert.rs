//! Type inspection and conversion natives.

use crate::interpreter::errors::{kind, Flow, RunError};
use crate::program::Program;
use crate::value::Value;

fn raise(kind_: &str, message: String) -> Flow {
    Flow::Raise(RunError::new(kind_, message))
}

/// `typeof(value)`: the value's type name.
pub fn type_of(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    Ok(Value::Str(arg.type_name().to_string()))
}

/// `len(value)`: length of a string, list or map.
pub fn len(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    match arg {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(items) => Ok(Value::Int(items.len() as i64)),
        Value::Map(map) => Ok(Value::Int(map.len() as i64)),
        other => Err(raise(
            kind::TYPE,
            format!("{} has no length", other.type_name()),
        )),
    }
}

/// `str(value)`: the display form.
pub fn to_str(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    Ok(Value::Str(arg.to_string()))
}

/// `int(value)`: integer conversion.
pub fn to_int(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    match arg {
        Value::Int(n) => Ok(Value::Int(n)),
        Value::Float(f) => Ok(Value::Int(f.trunc() as i64)),
        Value::Bool(b) => Ok(Value::Int(b as i64)),
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            raise(kind::ARGUMENT, format!("invalid int literal \"{}\"", s))
        }),
        other => Err(raise(
            kind::ARGUMENT,
            format!("cannot convert {} to int", other.type_name()),
        )),
    }
}

/// `float(value)`: float conversion.
pub fn to_float(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    match arg {
        Value::Int(n) => Ok(Value::Float(n as f64)),
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Bool(b) => Ok(Value::Float(b as i64 as f64)),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            raise(kind::ARGUMENT, format!("invalid float literal \"{}\"", s))
        }),
        other => Err(raise(
            kind::ARGUMENT,
            format!("cannot convert {} to float", other.type_name()),
        )),
    }
}

/// `range(stop)` / `range([start, stop])` / `range([start, stop, step])`.
pub fn range(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    let (start, stop, step) = match arg {
        Value::Int(stop) => (0, stop, 1),
        Value::List(items) => {
            let ints: Option<Vec<i64>> = items
                .iter()
                .map(|v| match v {
                    Value::Int(n) => Some(*n),
                    _ => None,
                })
                .collect();
            match ints.as_deref() {
                Some([start, stop]) => (*start, *stop, 1),
                Some([start, stop, step]) => (*start, *stop, *step),
                _ => {
                    return Err(raise(
                        kind::ARGUMENT,
                        "range requires an int or a list of 2-3 ints".to_string(),
                    ))
                }
            }
        }
        other => {
            return Err(raise(
                kind::ARGUMENT,
                format!("range requires an int, got {}", other.type_name()),
            ))
        }
    };
    if step == 0 {
        return Err(raise(kind::ARGUMENT, "range step must not be zero".to_string()));
    }
    let mut items = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        items.push(Value::Int(i));
        i += step;
    }
    Ok(Value::List(items))
}

/// `doc(function_or_class)`: the attached docstring.
pub fn doc(prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    let text = match &arg {
        Value::Function(real) => prog.functions.get(real).map(|f| f.docstring.clone()),
        Value::Class(real) => prog.classes.get(real).map(|c| c.docstring.clone()),
        Value::BoundMethod(instance, method) => {
            let class_name = instance.borrow().class_name.clone();
            prog.classes
                .get(&class_name)
                .and_then(|c| c.methods.get(method))
                .map(|m| m.docstring.clone())
        }
        other => {
            return Err(raise(
                kind::ARGUMENT,
                format!("doc requires a function or class, got {}", other.type_name()),
            ))
        }
    };
    Ok(Value::Str(text.unwrap_or_default()))
}
