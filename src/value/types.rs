//! Runtime Values
//!
//! The tagged value variants the interpreter operates on. Lists, maps and
//! strings behave as values; class instances are reference-like and share a
//! mutable property map through `Rc<RefCell<..>>`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// A class instance: deep-copied properties plus the name of the class
/// whose method table serves it.
#[derive(Debug, Clone)]
pub struct Instance {
    pub class_name: String,
    pub props: IndexMap<String, Value>,
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    /// A user function reference by its real (namespaced) name.
    Function(String),
    /// A class reference by its real (namespaced) name.
    Class(String),
    Instance(Rc<RefCell<Instance>>),
    /// A method looked up on an instance, not yet called.
    BoundMethod(Rc<RefCell<Instance>>, String),
    /// A host-registered native callable.
    Native(String),
}

impl Value {
    /// Truthiness: null, false, zero, empty string/list/map are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            _ => true,
        }
    }

    /// User-visible type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "object",
            Value::BoundMethod(_, _) => "method",
            Value::Native(_) => "function",
        }
    }

    /// Recursive copy. Instances get a fresh property map; everything else
    /// is cloned structurally.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::List(items) => Value::List(items.iter().map(Value::deep_copy).collect()),
            Value::Map(map) => Value::Map(
                map.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect(),
            ),
            Value::Instance(rc) => {
                let inst = rc.borrow();
                Value::Instance(Rc::new(RefCell::new(Instance {
                    class_name: inst.class_name.clone(),
                    props: inst
                        .props
                        .iter()
                        .map(|(k, v)| (k.clone(), v.deep_copy()))
                        .collect(),
                })))
            }
            other => other.clone(),
        }
    }

    /// String form used when a value is indexed into a map.
    pub fn as_key(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::BoundMethod(a, m), Value::BoundMethod(b, n)) => Rc::ptr_eq(a, b) && m == n,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": ", k)?;
                    v.fmt_nested(f)?;
                }
                write!(f, "}}")
            }
            Value::Function(name) => write!(f, "<function {}>", name),
            Value::Class(name) => write!(f, "<class {}>", name),
            Value::Instance(rc) => write!(f, "<{} instance>", rc.borrow().class_name),
            Value::BoundMethod(rc, name) => {
                write!(f, "<method {} of {}>", name, rc.borrow().class_name)
            }
            Value::Native(name) => write!(f, "<function {}>", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::Str("x".to_string()).is_truthy());
    }

    #[test]
    fn test_numeric_cross_equality() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::Int(2), Value::Float(2.5));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Float(4.0).to_string(), "4.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        let list = Value::List(vec![Value::Int(1), Value::Str("a".to_string())]);
        assert_eq!(list.to_string(), "[1, \"a\"]");
    }

    #[test]
    fn test_deep_copy_instance_is_detached() {
        let rc = Rc::new(RefCell::new(Instance {
            class_name: "C".to_string(),
            props: [("x".to_string(), Value::Int(1))].into_iter().collect(),
        }));
        let original = Value::Instance(rc.clone());
        let copy = original.deep_copy();
        rc.borrow_mut().props.insert("x".to_string(), Value::Int(9));
        if let Value::Instance(copy_rc) = copy {
            assert_eq!(copy_rc.borrow().props.get("x"), Some(&Value::Int(1)));
        } else {
            panic!("expected instance");
        }
    }

    #[test]
    fn test_instance_identity_equality() {
        let rc = Rc::new(RefCell::new(Instance {
            class_name: "C".to_string(),
            props: IndexMap::new(),
        }));
        let a = Value::Instance(rc.clone());
        let b = Value::Instance(rc);
        assert_eq!(a, b);
        assert_ne!(a, a.deep_copy());
    }
}
