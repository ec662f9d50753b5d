//! Runtime Errors and Control Flow
//!
//! Runtime failures and non-local control flow both travel through `Result`:
//! - a raw `RunError` is raised by evaluation and routed by the active
//!   frame loop (into a `try` rescue section, the test-mode recorder, or an
//!   uncaught-error trace),
//! - `Flow` carries the routed outcomes plus function return and exit.

use std::fmt;

/// Error kinds surfaced on `Error` instances.
pub mod kind {
    pub const SYNTAX: &str = "SyntaxError";
    pub const VARIABLE: &str = "VariableError";
    pub const TYPE: &str = "TypeError";
    pub const ARGUMENT: &str = "ArgumentError";
    pub const MODULE: &str = "ModuleError";
    pub const FILE: &str = "FileError";
    pub const NAME: &str = "NameError";
    pub const METHOD: &str = "MethodError";
    pub const NAMESPACE_DOT: &str = "NamespaceContainsDotError";
    pub const ZERO_DIVISION: &str = "ZeroDivisionError";
    pub const INDEX: &str = "IndexError";
    pub const KEY: &str = "KeyError";
    pub const NATIVE: &str = "NativeError";
}

/// A runtime failure: a string-typed kind plus a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    pub kind: String,
    pub message: String,
}

impl RunError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), message: message.into() }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RunError {}

/// Non-local control flow, carried as the `Err` side of execution results.
#[derive(Debug, Clone)]
pub enum Flow {
    /// A runtime error not yet routed through the rescue machinery.
    Raise(RunError),
    /// Unwinding toward the frame at `depth` whose commands contain the
    /// rescue section; execution resumes at `step`. The `Error` instance is
    /// already in the memory slot.
    Rescue { depth: usize, step: usize },
    /// `return`: pop the current frame immediately.
    Return,
    /// Terminate the program with an exit code.
    Exit(i32),
    /// Test mode: stop every frame; the error is already recorded.
    Abort,
}

impl From<RunError> for Flow {
    fn from(e: RunError) -> Self {
        Flow::Raise(e)
    }
}

/// Result of executing one command.
pub type Exec = Result<(), Flow>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_error_display() {
        let e = RunError::new(kind::TYPE, "bad operand");
        assert_eq!(e.to_string(), "TypeError: bad operand");
    }

    #[test]
    fn test_run_error_into_flow() {
        let flow: Flow = RunError::new(kind::KEY, "missing").into();
        assert!(matches!(flow, Flow::Raise(e) if e.kind == kind::KEY));
    }
}
