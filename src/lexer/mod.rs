//! Lexer module
//!
//! Splits Pashmak source text into a flat list of commands (one per logical
//! line) and provides the string-aware helpers the expression evaluator
//! builds on.

pub mod lexer;
pub mod types;

pub use lexer::{parse, parse_string, split_args, split_by_equals};
pub use types::{Command, Segment, SyntaxError, LITERALS};
