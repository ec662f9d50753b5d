//! Expression Evaluation
//!
//! Tree-walks a parsed expression against the current frame. Name
//! resolution order for barewords: user functions (current namespace, then
//! `use`d namespaces in order, then global), native callables, classes,
//! defines. A `$name` always resolves in the frame variables and is
//! checked eagerly before evaluation starts, so a missing variable fails
//! even on a branch that short-circuit evaluation would skip.

use std::collections::HashSet;

use super::parser::parse;
use super::scanner::scan;
use super::types::Expr;
use crate::interpreter::errors::{kind, Flow, RunError};
use crate::lexer;
use crate::program::Program;
use crate::value::{binary, ops, unary, BinOp, Value};

/// Per-expression evaluation state: the last value consumed from the
/// memory slot, so repeated `^` within one expression observe it again
/// instead of null.
#[derive(Default)]
pub struct EvalCtx {
    mem_cache: Option<Value>,
}

/// Evaluate an expression string against the current frame.
pub fn eval_text(prog: &mut Program, text: &str, check_vars: bool) -> Result<Value, Flow> {
    let toks = scan(text)?;
    let ast = parse(&toks)?;
    if check_vars {
        require_vars(prog, &ast)?;
    }
    let mut ctx = EvalCtx::default();
    eval_expr(prog, &mut ctx, &ast)
}

/// Eager required-variable check over every `$name` in the expression.
fn require_vars(prog: &Program, expr: &Expr) -> Result<(), RunError> {
    let mut names = HashSet::new();
    collect_vars(expr, &mut names);
    for name in names {
        if prog.get_var(&name).is_none() {
            return Err(RunError::new(
                kind::VARIABLE,
                format!("undefined variable \"{}\"", name),
            ));
        }
    }
    Ok(())
}

fn collect_vars<'a>(expr: &'a Expr, out: &mut HashSet<&'a str>) {
    match expr {
        Expr::Var(name) => {
            out.insert(name.as_str());
        }
        Expr::Unary(_, e) => collect_vars(e, out),
        Expr::Binary(_, a, b) => {
            collect_vars(a, out);
            collect_vars(b, out);
        }
        Expr::Index(a, b) => {
            collect_vars(a, out);
            collect_vars(b, out);
        }
        Expr::Attr(a, _) => collect_vars(a, out),
        Expr::Call(callee, args) | Expr::New(callee, args) => {
            collect_vars(callee, out);
            for arg in args {
                collect_vars(arg, out);
            }
        }
        Expr::List(items) => {
            for item in items {
                collect_vars(item, out);
            }
        }
        Expr::Map(pairs) => {
            for (k, v) in pairs {
                collect_vars(k, out);
                collect_vars(v, out);
            }
        }
        // inline programs are parsed and checked when they run
        _ => {}
    }
}

/// Bundle call arguments the way the memory slot expects them: none is
/// null, one is itself, several arrive as a list.
pub fn bundle_args(mut args: Vec<Value>) -> Value {
    match args.len() {
        0 => Value::Null,
        1 => args.remove(0),
        _ => Value::List(args),
    }
}

pub fn eval_expr(prog: &mut Program, ctx: &mut EvalCtx, expr: &Expr) -> Result<Value, Flow> {
    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Float(f) => Ok(Value::Float(*f)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),

        Expr::Var(name) => prog.get_var(name).ok_or_else(|| {
            Flow::Raise(RunError::new(
                kind::VARIABLE,
                format!("undefined variable \"{}\"", name),
            ))
        }),

        Expr::Name(name) => resolve_name(prog, name),

        Expr::MemRead => {
            let current = prog.take_mem();
            if !matches!(current, Value::Null) {
                ctx.mem_cache = Some(current.clone());
                return Ok(current);
            }
            Ok(ctx.mem_cache.clone().unwrap_or(Value::Null))
        }

        Expr::Inline(code) => {
            let body = lexer::parse(code, "<inline>").map_err(|e| {
                Flow::Raise(RunError::new(kind::SYNTAX, e.to_string()))
            })?;
            prog.exec_func(&body, false, None)?;
            Ok(prog.take_mem())
        }

        Expr::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval_expr(prog, ctx, item)?);
            }
            Ok(Value::List(out))
        }

        Expr::Map(pairs) => {
            let mut out = Vec::with_capacity(pairs.len());
            for (k, v) in pairs {
                let key = eval_expr(prog, ctx, k)?;
                let value = eval_expr(prog, ctx, v)?;
                out.push((key, value));
            }
            Ok(ops::make_map(out))
        }

        Expr::Unary(op, operand) => {
            let v = eval_expr(prog, ctx, operand)?;
            Ok(unary(*op, &v)?)
        }

        Expr::Binary(BinOp::And, a, b) => {
            let left = eval_expr(prog, ctx, a)?;
            if !left.is_truthy() {
                return Ok(Value::Bool(false));
            }
            let right = eval_expr(prog, ctx, b)?;
            Ok(Value::Bool(right.is_truthy()))
        }

        Expr::Binary(BinOp::Or, a, b) => {
            let left = eval_expr(prog, ctx, a)?;
            if left.is_truthy() {
                return Ok(Value::Bool(true));
            }
            let right = eval_expr(prog, ctx, b)?;
            Ok(Value::Bool(right.is_truthy()))
        }

        Expr::Binary(op, a, b) => {
            let left = eval_expr(prog, ctx, a)?;
            let right = eval_expr(prog, ctx, b)?;
            Ok(binary(*op, &left, &right)?)
        }

        Expr::Index(container, index) => {
            let c = eval_expr(prog, ctx, container)?;
            let i = eval_expr(prog, ctx, index)?;
            Ok(ops::index_get(&c, &i)?)
        }

        Expr::Attr(object, name) => {
            let obj = eval_expr(prog, ctx, object)?;
            eval_attr(prog, &obj, name)
        }

        Expr::Call(callee, args) => {
            let target = eval_expr(prog, ctx, callee)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(prog, ctx, arg)?);
            }
            let arg = bundle_args(values);
            call_value(prog, &target, arg)
        }

        Expr::New(class, args) => {
            let target = eval_expr(prog, ctx, class)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(prog, ctx, arg)?);
            }
            let arg = bundle_args(values);
            match target {
                Value::Class(real) => prog.instantiate(&real, arg),
                other => Err(Flow::Raise(RunError::new(
                    kind::TYPE,
                    format!("new requires a class, got {}", other.type_name()),
                ))),
            }
        }
    }
}

fn resolve_name(prog: &mut Program, name: &str) -> Result<Value, Flow> {
    if let Some(real) = prog.resolve_function(name) {
        return Ok(Value::Function(real));
    }
    if prog.natives.contains(name) {
        return Ok(Value::Native(name.to_string()));
    }
    if let Some(real) = prog.resolve_class(name) {
        return Ok(Value::Class(real));
    }
    if let Some(value) = prog.defines.get(name) {
        return Ok(value.clone());
    }
    Err(Flow::Raise(RunError::new(
        kind::NAME,
        format!("name \"{}\" is not defined", name),
    )))
}

fn eval_attr(prog: &Program, obj: &Value, name: &str) -> Result<Value, Flow> {
    match obj {
        Value::Instance(rc) => {
            if let Some(value) = rc.borrow().props.get(name) {
                return Ok(value.clone());
            }
            let class_name = rc.borrow().class_name.clone();
            if let Some(class) = prog.classes.get(&class_name) {
                if class.methods.contains_key(name) {
                    return Ok(Value::BoundMethod(rc.clone(), name.to_string()));
                }
            }
            Err(Flow::Raise(RunError::new(
                kind::NAME,
                format!("\"{}\" object has no attribute \"{}\"", class_name, name),
            )))
        }
        other => Err(Flow::Raise(RunError::new(
            kind::METHOD,
            format!("member access on {} value", other.type_name()),
        ))),
    }
}

/// Call an evaluated callee with an already-bundled argument.
pub fn call_value(prog: &mut Program, target: &Value, arg: Value) -> Result<Value, Flow> {
    match target {
        Value::Function(real) => prog.call_function(real, arg, None),
        Value::Native(name) => prog.call_native(name, arg),
        Value::BoundMethod(rc, method) => prog.call_method(rc.clone(), method, arg),
        Value::Class(name) => Err(Flow::Raise(RunError::new(
            kind::TYPE,
            format!("class \"{}\" is not callable, use new", name),
        ))),
        other => Err(Flow::Raise(RunError::new(
            kind::TYPE,
            format!("{} value is not callable", other.type_name()),
        ))),
    }
}
