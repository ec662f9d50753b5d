//! Namespaces
//!
//! `namespace X` pushes a segment, `endnamespace` pops. Declarations of
//! functions and classes register under the dotted join of the open
//! segments. `use X` activates a namespace for lookup in the current frame.
//! Resolution precedence: current namespace, then each `use`d namespace in
//! order, then global.

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::interpreter::errors::{kind, Exec, RunError};
use crate::lexer::Command;
use crate::program::Program;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
    static ref DOTTED_NAME_RE: Regex =
        Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*$").unwrap();
}

/// Plain identifier check for function/class/variable/define names.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Dotted name check for `use` targets.
pub fn is_valid_dotted_name(name: &str) -> bool {
    DOTTED_NAME_RE.is_match(name)
}

impl Program {
    /// The dotted join of the open namespace segments plus a trailing `.`,
    /// or the empty string when none is open.
    pub fn current_namespace(&self) -> String {
        if self.namespaces_tree.is_empty() {
            String::new()
        } else {
            format!("{}.", self.namespaces_tree.join("."))
        }
    }

    pub(crate) fn run_namespace(&mut self, op: &Command) -> Exec {
        let name = op
            .args
            .first()
            .ok_or_else(|| RunError::new(kind::SYNTAX, "namespace requires a name"))?
            .clone();
        if name.contains('.') {
            return Err(RunError::new(
                kind::NAMESPACE_DOT,
                format!("name \"{}\" for namespace contains `.` character", name),
            )
            .into());
        }
        if !is_valid_name(&name) {
            return Err(RunError::new(
                kind::SYNTAX,
                format!("invalid namespace name \"{}\"", name),
            )
            .into());
        }
        self.namespaces_tree.push(name);
        Ok(())
    }

    pub(crate) fn run_endnamespace(&mut self, _op: &Command) -> Exec {
        self.namespaces_tree
            .pop()
            .map(|_| ())
            .ok_or_else(|| {
                RunError::new(kind::INDEX, "endnamespace without an open namespace").into()
            })
    }

    pub(crate) fn run_use(&mut self, op: &Command) -> Exec {
        let name = op
            .args
            .first()
            .ok_or_else(|| RunError::new(kind::SYNTAX, "use requires a namespace"))?
            .clone();
        if !is_valid_dotted_name(&name) {
            return Err(RunError::new(
                kind::SYNTAX,
                format!("invalid namespace name \"{}\"", name),
            )
            .into());
        }
        self.current_frame().used_namespaces.borrow_mut().push(name);
        Ok(())
    }

    /// Resolve a function bareword to its real name.
    pub fn resolve_function(&self, name: &str) -> Option<String> {
        self.resolve_in(name, |real| self.functions.contains_key(real))
    }

    /// Resolve a class bareword to its real name.
    pub fn resolve_class(&self, name: &str) -> Option<String> {
        self.resolve_in(name, |real| self.classes.contains_key(real))
    }

    fn resolve_in(&self, name: &str, exists: impl Fn(&str) -> bool) -> Option<String> {
        let qualified = format!("{}{}", self.current_namespace(), name);
        if exists(&qualified) {
            return Some(qualified);
        }
        for used in self.current_frame().used_namespaces.borrow().iter() {
            let candidate = format!("{}.{}", used, name);
            if exists(&candidate) {
                return Some(candidate);
            }
        }
        if exists(name) {
            return Some(name.to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("foo"));
        assert!(is_valid_name("_bar9"));
        assert!(!is_valid_name("9foo"));
        assert!(!is_valid_name("a.b"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_is_valid_dotted_name() {
        assert!(is_valid_dotted_name("a"));
        assert!(is_valid_dotted_name("a.b.c"));
        assert!(!is_valid_dotted_name("a..b"));
        assert!(!is_valid_dotted_name(".a"));
    }
}
