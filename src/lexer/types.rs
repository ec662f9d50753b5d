//! Lexer Types and Constants
//!
//! Shared types used across the lexer and the expression scanner.

use std::fmt;
use thiserror::Error;

/// Characters that delimit barewords in expression text.
pub const LITERALS: &[char] = &[
    '(', ')', '+', '-', '*', '/', '%', '=', '{', '}', '<', '>', ' ', '[', ']', ',',
];

/// One parsed logical line of source, the unit of execution.
///
/// `head` is the first whitespace-delimited token, `args_text` the remainder
/// verbatim (inner quotes and brackets preserved), `args` a shallow split of
/// `args_text` honoring string literals and balanced brackets.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub file_path: String,
    pub line_number: usize,
    pub source: String,
    pub head: String,
    pub args_text: String,
    pub args: Vec<String>,
    pub index: usize,
}

impl Command {
    /// A synthetic `pass` command, used when rewriting section directives.
    pub fn pass(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            line_number: 0,
            source: "pass".to_string(),
            head: "pass".to_string(),
            args_text: String::new(),
            args: Vec::new(),
            index: 0,
        }
    }
}

/// A code/string segment produced by [`crate::lexer::parse_string`].
/// `is_string` marks segments that were quoted in the source; the evaluator
/// never substitutes names inside them.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub is_string: bool,
    pub text: String,
}

impl Segment {
    pub fn code(text: impl Into<String>) -> Self {
        Self { is_string: false, text: text.into() }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self { is_string: true, text: text.into() }
    }
}

/// Lexical error: unterminated string or bracket, carrying the location.
#[derive(Debug, Clone, Error)]
pub struct SyntaxError {
    pub message: String,
    pub file_path: String,
    pub line_number: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, file_path: &str, line_number: usize) -> Self {
        Self {
            message: message.into(),
            file_path: file_path.to_string(),
            line_number,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}:{}", self.message, self.file_path, self.line_number)
    }
}
