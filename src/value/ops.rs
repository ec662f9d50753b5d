//! Operator Semantics
//!
//! Pure application of binary/unary operators and indexing over values.
//! Short-circuit of `&&`/`||` is the evaluator's job; everything here takes
//! already-evaluated operands.

use indexmap::IndexMap;

use super::types::Value;
use crate::interpreter::errors::{kind, RunError};

/// Binary operators of the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    Xor,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::Xor => "^^",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Pos,
    Not,
}

fn type_error(op: BinOp, a: &Value, b: &Value) -> RunError {
    RunError::new(
        kind::TYPE,
        format!(
            "unsupported operand types for {}: {} and {}",
            op.symbol(),
            a.type_name(),
            b.type_name()
        ),
    )
}

fn as_float(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Apply a non-short-circuit binary operator.
pub fn binary(op: BinOp, a: &Value, b: &Value) -> Result<Value, RunError> {
    match op {
        BinOp::Add => add(a, b),
        BinOp::Sub => arith(op, a, b),
        BinOp::Mul => mul(a, b),
        BinOp::Div => div(a, b),
        BinOp::Mod => modulo(a, b),
        BinOp::Eq => Ok(Value::Bool(a == b)),
        BinOp::Ne => Ok(Value::Bool(a != b)),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => compare(op, a, b),
        BinOp::BitAnd | BinOp::BitOr | BinOp::Xor => bitwise(op, a, b),
        BinOp::And | BinOp::Or => {
            // short-circuit forms never reach here
            Ok(Value::Bool(if op == BinOp::And {
                a.is_truthy() && b.is_truthy()
            } else {
                a.is_truthy() || b.is_truthy()
            }))
        }
    }
}

fn add(a: &Value, b: &Value) -> Result<Value, RunError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x + y)),
        (Value::Str(x), Value::Str(y)) => Ok(Value::Str(format!("{}{}", x, y))),
        (Value::List(x), Value::List(y)) => {
            let mut out = x.clone();
            out.extend(y.iter().cloned());
            Ok(Value::List(out))
        }
        _ => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => Ok(Value::Float(x + y)),
            _ => Err(type_error(BinOp::Add, a, b)),
        },
    }
}

fn arith(op: BinOp, a: &Value, b: &Value) -> Result<Value, RunError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(match op {
            BinOp::Sub => x - y,
            _ => x * y,
        })),
        _ => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => Ok(Value::Float(match op {
                BinOp::Sub => x - y,
                _ => x * y,
            })),
            _ => Err(type_error(op, a, b)),
        },
    }
}

fn mul(a: &Value, b: &Value) -> Result<Value, RunError> {
    match (a, b) {
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
            Ok(Value::Str(s.repeat((*n).max(0) as usize)))
        }
        (Value::List(l), Value::Int(n)) | (Value::Int(n), Value::List(l)) => {
            let mut out = Vec::new();
            for _ in 0..(*n).max(0) {
                out.extend(l.iter().cloned());
            }
            Ok(Value::List(out))
        }
        _ => arith(BinOp::Mul, a, b),
    }
}

fn div(a: &Value, b: &Value) -> Result<Value, RunError> {
    match (as_float(a), as_float(b)) {
        (Some(x), Some(y)) => {
            if y == 0.0 {
                Err(RunError::new(kind::ZERO_DIVISION, "division by zero"))
            } else {
                Ok(Value::Float(x / y))
            }
        }
        _ => Err(type_error(BinOp::Div, a, b)),
    }
}

fn modulo(a: &Value, b: &Value) -> Result<Value, RunError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            if *y == 0 {
                Err(RunError::new(kind::ZERO_DIVISION, "modulo by zero"))
            } else {
                Ok(Value::Int(x.rem_euclid(*y)))
            }
        }
        _ => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => {
                if y == 0.0 {
                    Err(RunError::new(kind::ZERO_DIVISION, "modulo by zero"))
                } else {
                    Ok(Value::Float(x.rem_euclid(y)))
                }
            }
            _ => Err(type_error(BinOp::Mod, a, b)),
        },
    }
}

fn compare(op: BinOp, a: &Value, b: &Value) -> Result<Value, RunError> {
    let ordering = match (a, b) {
        (Value::Str(x), Value::Str(y)) => x.partial_cmp(y),
        _ => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => return Err(type_error(op, a, b)),
        },
    };
    let ord = match ordering {
        Some(o) => o,
        None => return Err(type_error(op, a, b)),
    };
    let result = match op {
        BinOp::Lt => ord.is_lt(),
        BinOp::Le => ord.is_le(),
        BinOp::Gt => ord.is_gt(),
        _ => ord.is_ge(),
    };
    Ok(Value::Bool(result))
}

fn bitwise(op: BinOp, a: &Value, b: &Value) -> Result<Value, RunError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(match op {
            BinOp::BitAnd => x & y,
            BinOp::BitOr => x | y,
            _ => x ^ y,
        })),
        (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(match op {
            BinOp::BitAnd => x & y,
            BinOp::BitOr => x | y,
            _ => x ^ y,
        })),
        _ => Err(type_error(op, a, b)),
    }
}

/// Apply a unary operator.
pub fn unary(op: UnOp, v: &Value) -> Result<Value, RunError> {
    match op {
        UnOp::Not => Ok(Value::Bool(!v.is_truthy())),
        UnOp::Pos => match v {
            Value::Int(_) | Value::Float(_) => Ok(v.clone()),
            _ => Err(RunError::new(
                kind::TYPE,
                format!("bad operand type for unary +: {}", v.type_name()),
            )),
        },
        UnOp::Neg => match v {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Float(f) => Ok(Value::Float(-f)),
            _ => Err(RunError::new(
                kind::TYPE,
                format!("bad operand type for unary -: {}", v.type_name()),
            )),
        },
    }
}

fn normalize_index(idx: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let i = if idx < 0 { idx + len } else { idx };
    if i < 0 || i >= len {
        None
    } else {
        Some(i as usize)
    }
}

/// Index into a list, string or map.
pub fn index_get(container: &Value, index: &Value) -> Result<Value, RunError> {
    match container {
        Value::List(items) => match index {
            Value::Int(n) => normalize_index(*n, items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| RunError::new(kind::INDEX, "list index out of range")),
            _ => Err(RunError::new(
                kind::TYPE,
                format!("list indices must be int, not {}", index.type_name()),
            )),
        },
        Value::Str(s) => match index {
            Value::Int(n) => {
                let chars: Vec<char> = s.chars().collect();
                normalize_index(*n, chars.len())
                    .map(|i| Value::Str(chars[i].to_string()))
                    .ok_or_else(|| RunError::new(kind::INDEX, "string index out of range"))
            }
            _ => Err(RunError::new(
                kind::TYPE,
                format!("string indices must be int, not {}", index.type_name()),
            )),
        },
        Value::Map(map) => {
            let key = index.as_key();
            map.get(&key)
                .cloned()
                .ok_or_else(|| RunError::new(kind::KEY, format!("undefined key \"{}\"", key)))
        }
        _ => Err(RunError::new(
            kind::TYPE,
            format!("{} is not indexable", container.type_name()),
        )),
    }
}

/// Build a map value from evaluated key/value pairs.
pub fn make_map(pairs: Vec<(Value, Value)>) -> Value {
    let mut map = IndexMap::new();
    for (k, v) in pairs {
        map.insert(k.as_key(), v);
    }
    Value::Map(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(binary(BinOp::Add, &Value::Int(2), &Value::Int(3)).unwrap(), Value::Int(5));
        assert_eq!(binary(BinOp::Sub, &Value::Int(2), &Value::Int(3)).unwrap(), Value::Int(-1));
        assert_eq!(binary(BinOp::Mul, &Value::Int(4), &Value::Int(3)).unwrap(), Value::Int(12));
    }

    #[test]
    fn test_int_division_yields_float() {
        assert_eq!(binary(BinOp::Div, &Value::Int(1), &Value::Int(2)).unwrap(), Value::Float(0.5));
    }

    #[test]
    fn test_division_by_zero() {
        let err = binary(BinOp::Div, &Value::Int(1), &Value::Int(0)).unwrap_err();
        assert_eq!(err.kind, kind::ZERO_DIVISION);
        let err = binary(BinOp::Mod, &Value::Int(1), &Value::Int(0)).unwrap_err();
        assert_eq!(err.kind, kind::ZERO_DIVISION);
    }

    #[test]
    fn test_string_concat_and_repeat() {
        assert_eq!(
            binary(BinOp::Add, &Value::Str("ab".into()), &Value::Str("cd".into())).unwrap(),
            Value::Str("abcd".into())
        );
        assert_eq!(
            binary(BinOp::Mul, &Value::Str("ab".into()), &Value::Int(2)).unwrap(),
            Value::Str("abab".into())
        );
    }

    #[test]
    fn test_mixed_add_is_type_error() {
        let err = binary(BinOp::Add, &Value::Int(1), &Value::Str("a".into())).unwrap_err();
        assert_eq!(err.kind, kind::TYPE);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(binary(BinOp::Lt, &Value::Int(1), &Value::Float(1.5)).unwrap(), Value::Bool(true));
        assert_eq!(
            binary(BinOp::Ge, &Value::Str("b".into()), &Value::Str("a".into())).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_list_index() {
        let list = Value::List(vec![Value::Int(10), Value::Int(20)]);
        assert_eq!(index_get(&list, &Value::Int(1)).unwrap(), Value::Int(20));
        assert_eq!(index_get(&list, &Value::Int(-1)).unwrap(), Value::Int(20));
        assert_eq!(index_get(&list, &Value::Int(2)).unwrap_err().kind, kind::INDEX);
        assert_eq!(index_get(&list, &Value::Str("x".into())).unwrap_err().kind, kind::TYPE);
    }

    #[test]
    fn test_map_index() {
        let map = make_map(vec![(Value::Str("a".into()), Value::Int(1))]);
        assert_eq!(index_get(&map, &Value::Str("a".into())).unwrap(), Value::Int(1));
        assert_eq!(index_get(&map, &Value::Str("b".into())).unwrap_err().kind, kind::KEY);
    }

    #[test]
    fn test_xor() {
        assert_eq!(
            binary(BinOp::Xor, &Value::Bool(true), &Value::Bool(false)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(binary(BinOp::Xor, &Value::Int(6), &Value::Int(3)).unwrap(), Value::Int(5));
    }
}
