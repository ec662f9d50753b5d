//! JSON and base64 natives.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;

use crate::interpreter::errors::{kind, Flow, RunError};
use crate::program::Program;
use crate::value::Value;

fn raise(kind_: &str, message: String) -> Flow {
    Flow::Raise(RunError::new(kind_, message))
}

fn to_json(value: &Value) -> Result<serde_json::Value, Flow> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(n) => Ok(serde_json::Value::from(*n)),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                raise(kind::ARGUMENT, "non-finite float is not JSON-serializable".to_string())
            }),
        Value::Str(s) => Ok(serde_json::Value::String(s.clone())),
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(to_json(item)?);
            }
            Ok(serde_json::Value::Array(out))
        }
        Value::Map(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), to_json(v)?);
            }
            Ok(serde_json::Value::Object(out))
        }
        Value::Instance(rc) => {
            let instance = rc.borrow();
            let mut out = serde_json::Map::new();
            for (k, v) in &instance.props {
                out.insert(k.clone(), to_json(v)?);
            }
            Ok(serde_json::Value::Object(out))
        }
        other => Err(raise(
            kind::TYPE,
            format!("{} is not JSON-serializable", other.type_name()),
        )),
    }
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => {
            let mut out = IndexMap::new();
            for (k, v) in map {
                out.insert(k, from_json(v));
            }
            Value::Map(out)
        }
    }
}

/// `json_encode(value)`: serialize to a JSON string.
pub fn json_encode(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    let json = to_json(&arg)?;
    serde_json::to_string(&json)
        .map(Value::Str)
        .map_err(|e| raise(kind::ARGUMENT, format!("JSON encoding failed: {}", e)))
}

/// `json_decode(text)`: parse a JSON string.
pub fn json_decode(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    let Value::Str(text) = arg else {
        return Err(raise(
            kind::ARGUMENT,
            format!("json_decode requires a string, got {}", arg.type_name()),
        ));
    };
    serde_json::from_str::<serde_json::Value>(&text)
        .map(from_json)
        .map_err(|e| raise(kind::ARGUMENT, format!("invalid JSON: {}", e)))
}

/// `base64_encode(text)`.
pub fn base64_encode(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    match arg {
        Value::Str(s) => Ok(Value::Str(STANDARD.encode(s.as_bytes()))),
        other => Err(raise(
            kind::ARGUMENT,
            format!("base64_encode requires a string, got {}", other.type_name()),
        )),
    }
}

/// `base64_decode(text)`.
pub fn base64_decode(_prog: &mut Program, arg: Value) -> Result<Value, Flow> {
    let Value::Str(text) = arg else {
        return Err(raise(
            kind::ARGUMENT,
            format!("base64_decode requires a string, got {}", arg.type_name()),
        ));
    };
    let bytes = STANDARD
        .decode(text.as_bytes())
        .map_err(|e| raise(kind::ARGUMENT, format!("invalid base64: {}", e)))?;
    String::from_utf8(bytes)
        .map(Value::Str)
        .map_err(|_| raise(kind::ARGUMENT, "base64 payload is not valid UTF-8".to_string()))
}
