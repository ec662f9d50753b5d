//! Expression AST
//!
//! The reduced form an expression string is parsed into before evaluation.
//! Barewords stay symbolic (`Name`) and are resolved against functions,
//! classes and defines at evaluation time, which preserves short-circuit
//! behavior for names that are never reached.

use crate::value::{BinOp, UnOp};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// `$name`: a frame-variable lookup.
    Var(String),
    /// A bareword, resolved to a function/native/class/define at eval time.
    Name(String),
    /// `^`: consume-and-return the memory slot.
    MemRead,
    /// `%{ ... }%`: inline sub-program, executed without frame isolation.
    Inline(String),
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    /// Member access, written `->` in source.
    Attr(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    /// `new Class(args)` instantiation.
    New(Box<Expr>, Vec<Expr>),
}
