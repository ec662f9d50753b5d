//! Expression engine
//!
//! Scanner, parser and tree-walking evaluator for the embedded expression
//! language (`$vars`, barewords, `->` member access, `^` memory reads,
//! `%{..}%` inline calls).

pub mod eval;
pub mod parser;
pub mod scanner;
pub mod types;

pub use eval::{bundle_args, eval_text};
pub use types::Expr;
