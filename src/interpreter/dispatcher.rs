//! Command Dispatcher
//!
//! Executes one command: function-body collection, class bodies, the
//! keyword table, assignments (including `->`/index chains), function-call
//! statements, and the expression-statement fallback whose value lands in
//! the memory slot.

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::expr::parser::parse as parse_expr;
use crate::expr::scanner::scan;
use crate::expr::{eval_text, Expr};
use crate::interpreter::errors::{kind, Exec, RunError};
use crate::lexer::{split_by_equals, Command};
use crate::program::Program;
use crate::value::Value;

lazy_static! {
    static ref SIMPLE_VAR_RE: Regex = Regex::new(r"^\$[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

/// One step of an assignment target path, with index keys already
/// evaluated.
enum PathStep {
    Attr(String),
    Index(Value),
}

impl Program {
    /// Execute one command.
    pub fn run(&mut self, op: &Command) -> Exec {
        let head = op.head.as_str();

        if head == "func" {
            self.func_depth += 1;
        }
        if head == "endfunc" {
            if self.func_depth <= 1 {
                self.run_endfunc(op)?;
                self.func_depth = self.func_depth.saturating_sub(1);
                return Ok(());
            }
            self.func_depth -= 1;
        }

        // a function is open: collect the command into its body
        if let Some(current) = self.current_func.last().cloned() {
            if let Some(class_name) = self.current_class.last().cloned() {
                if let Some(method) = self
                    .classes
                    .get_mut(&class_name)
                    .and_then(|c| c.methods.get_mut(&current))
                {
                    method.body.push(op.clone());
                }
            } else if let Some(func) = self.functions.get_mut(&current) {
                func.body.push(op.clone());
            }
            return Ok(());
        }

        match head {
            "func" => return self.run_func(op),
            "goto" => return self.run_goto(op),
            "gotoif" => return self.run_gotoif(op),
            "try" => return self.run_try(op),
            "endtry" => return self.run_endtry(op),
            "namespace" | "ns" => return self.run_namespace(op),
            "endnamespace" | "endns" => return self.run_endnamespace(op),
            "use" => return self.run_use(op),
            "class" => return self.run_class(op),
            "endclass" => return self.run_endclass(op),
            "return" => return self.run_return(op),
            "while" => return self.run_while(op),
            "endwhile" => return self.run_endwhile(op),
            "break" => return self.run_break(op),
            "continue" => return self.run_continue(op),
            "if" => return self.run_if(op),
            "elif" => return self.run_elif(op),
            "else" => return self.run_else(op),
            "@doc" => return self.run_atdoc(op),
            "new" => return self.run_new(op),
            "define" => return self.run_define(op),
            "endif" | "pass" | "section" => return Ok(()),
            _ => {}
        }

        if op.source.starts_with('$') {
            return self.run_dollar(op);
        }

        // bareword-rooted assignment, e.g. `this->x = 1`
        if let Some((lhs, rhs)) = split_by_equals(&op.source) {
            if self.is_assignable_path(lhs.trim()) {
                let value = eval_text(self, rhs.trim(), true)?;
                return self.assign_path(lhs.trim(), value);
            }
        }

        // statement-form call: head resolves to a function or native
        if head == "rmem" {
            if self.has_call_argument(op) {
                eval_text(self, &op.args_text, true)?;
            } else {
                self.mem = Value::Null;
            }
            return Ok(());
        }
        if head == "mem" {
            self.mem = if self.has_call_argument(op) {
                eval_text(self, &op.args_text, true)?
            } else {
                Value::Null
            };
            return Ok(());
        }
        if let Some(real) = self.resolve_function(head) {
            let arg = self.eval_call_argument(op)?;
            let result = self.call_function(&real, arg, None)?;
            self.mem = result;
            return Ok(());
        }
        if self.natives.contains(head) {
            let arg = self.eval_call_argument(op)?;
            let result = self.call_native(head, arg)?;
            self.mem = result;
            return Ok(());
        }

        // expression statement
        self.mem = eval_text(self, &op.source, true)?;
        Ok(())
    }

    fn has_call_argument(&self, op: &Command) -> bool {
        !op.args_text.is_empty() && op.args_text.trim() != "()"
    }

    fn eval_call_argument(&mut self, op: &Command) -> Result<Value, crate::interpreter::errors::Flow> {
        if self.has_call_argument(op) {
            eval_text(self, &op.args_text, true)
        } else {
            Ok(Value::Null)
        }
    }

    /// `@doc "text"`: attach a docstring to the next declared function or
    /// class.
    pub(crate) fn run_atdoc(&mut self, op: &Command) -> Exec {
        let value = eval_text(self, &op.args_text, true)?;
        match value {
            Value::Str(text) => {
                self.last_docstring = text;
                Ok(())
            }
            other => Err(RunError::new(
                kind::TYPE,
                format!("@doc requires a string, got {}", other.type_name()),
            )
            .into()),
        }
    }

    /// `define NAME expr`: register a program-wide define.
    pub(crate) fn run_define(&mut self, op: &Command) -> Exec {
        let name = op
            .args
            .first()
            .ok_or_else(|| RunError::new(kind::SYNTAX, "define requires a name"))?
            .clone();
        if !crate::interpreter::namespaces::is_valid_name(&name) {
            return Err(RunError::new(
                kind::SYNTAX,
                format!("invalid define name \"{}\"", name),
            )
            .into());
        }
        let rest = op.args_text[name.len()..].trim().to_string();
        let value = if rest.is_empty() {
            Value::Null
        } else {
            eval_text(self, &rest, true)?
        };
        self.defines.insert(name, value);
        Ok(())
    }

    /// A command starting with `$`: declaration, assignment, or an
    /// expression statement such as `$o->m()`.
    fn run_dollar(&mut self, op: &Command) -> Exec {
        let source = op.source.trim();
        let in_class_body = !self.current_class.is_empty();

        let Some((lhs, rhs)) = split_by_equals(source) else {
            if source.contains("->") || source.contains('(') || source.contains(')') {
                self.mem = eval_text(self, source, true)?;
                return Ok(());
            }
            if !SIMPLE_VAR_RE.is_match(source) {
                return Err(RunError::new(
                    kind::SYNTAX,
                    format!("invalid variable declaration \"{}\"", source),
                )
                .into());
            }
            let name = &source[1..];
            if in_class_body {
                return self.set_class_prop(name, Value::Null);
            }
            self.set_var(name, Value::Null);
            return Ok(());
        };

        let lhs = lhs.trim().to_string();
        let rhs = rhs.trim().to_string();
        let value = eval_text(self, &rhs, true)?;

        if in_class_body && SIMPLE_VAR_RE.is_match(&lhs) {
            return self.set_class_prop(&lhs[1..], value);
        }
        self.assign_path(&lhs, value)
    }

    /// Can `text` be written to: a `$var` or bareword frame variable,
    /// optionally followed by `->attr` / `[index]` steps?
    fn is_assignable_path(&self, text: &str) -> bool {
        let Ok(toks) = scan(text) else { return false };
        let Ok(ast) = parse_expr(&toks) else { return false };
        let mut cursor = &ast;
        loop {
            match cursor {
                Expr::Attr(inner, _) => cursor = inner,
                Expr::Index(inner, _) => cursor = inner,
                Expr::Var(_) => return true,
                Expr::Name(name) => return self.get_var(name).is_some(),
                _ => return false,
            }
        }
    }

    /// Assign through a target path. The root is a frame variable; `->`
    /// steps descend into instance properties (shared, so writes are
    /// visible through every reference), `[..]` steps into lists and maps
    /// in place.
    pub(crate) fn assign_path(&mut self, text: &str, value: Value) -> Exec {
        let toks = scan(text)?;
        let ast = parse_expr(&toks)?;

        let mut rev_steps: Vec<&Expr> = Vec::new();
        let mut cursor = &ast;
        let root = loop {
            match cursor {
                Expr::Attr(inner, _) | Expr::Index(inner, _) => {
                    rev_steps.push(cursor);
                    cursor = inner;
                }
                Expr::Var(name) => break name.clone(),
                Expr::Name(name) => {
                    if self.get_var(name).is_none() {
                        return Err(RunError::new(
                            kind::VARIABLE,
                            format!("undefined variable \"{}\"", name),
                        )
                        .into());
                    }
                    break name.clone();
                }
                _ => {
                    return Err(RunError::new(
                        kind::SYNTAX,
                        format!("invalid assignment target \"{}\"", text),
                    )
                    .into())
                }
            }
        };

        // evaluate index expressions before touching the storage
        let mut steps = Vec::with_capacity(rev_steps.len());
        for step in rev_steps.into_iter().rev() {
            match step {
                Expr::Attr(_, name) => steps.push(PathStep::Attr(name.clone())),
                Expr::Index(_, index_expr) => {
                    let key = eval_text_expr(self, index_expr)?;
                    steps.push(PathStep::Index(key));
                }
                _ => {}
            }
        }

        if steps.is_empty() {
            self.set_var(&root, value);
            return Ok(());
        }

        let vars = self.current_frame().vars.clone();
        let mut vars = vars.borrow_mut();
        let slot = vars.get_mut(&root).ok_or_else(|| {
            RunError::new(kind::VARIABLE, format!("undefined variable \"{}\"", root))
        })?;
        set_in(slot, &steps, value)?;
        Ok(())
    }
}

fn eval_text_expr(prog: &mut Program, expr: &Expr) -> Result<Value, crate::interpreter::errors::Flow> {
    let mut ctx = crate::expr::eval::EvalCtx::default();
    crate::expr::eval::eval_expr(prog, &mut ctx, expr)
}

/// Write `value` at the end of `steps`, descending in place.
fn set_in(target: &mut Value, steps: &[PathStep], value: Value) -> Result<(), RunError> {
    let Some((step, rest)) = steps.split_first() else {
        *target = value;
        return Ok(());
    };
    match step {
        PathStep::Attr(name) => match target {
            Value::Instance(rc) => {
                let mut instance = rc.borrow_mut();
                if rest.is_empty() {
                    instance.props.insert(name.clone(), value);
                    return Ok(());
                }
                let slot = instance.props.get_mut(name).ok_or_else(|| {
                    RunError::new(
                        kind::NAME,
                        format!("object has no attribute \"{}\"", name),
                    )
                })?;
                set_in(slot, rest, value)
            }
            other => Err(RunError::new(
                kind::METHOD,
                format!("member assignment on {} value", other.type_name()),
            )),
        },
        PathStep::Index(key) => match target {
            Value::List(items) => match key {
                Value::Int(n) => {
                    let index = if *n < 0 { *n + items.len() as i64 } else { *n };
                    if index < 0 || index as usize >= items.len() {
                        return Err(RunError::new(kind::INDEX, "list index out of range"));
                    }
                    set_in(&mut items[index as usize], rest, value)
                }
                other => Err(RunError::new(
                    kind::TYPE,
                    format!("list indices must be int, not {}", other.type_name()),
                )),
            },
            Value::Map(map) => {
                let k = key.as_key();
                if rest.is_empty() {
                    map.insert(k, value);
                    return Ok(());
                }
                let slot = map.get_mut(&k).ok_or_else(|| {
                    RunError::new(kind::KEY, format!("undefined key \"{}\"", k))
                })?;
                set_in(slot, rest, value)
            }
            other => Err(RunError::new(
                kind::TYPE,
                format!("{} is not indexable", other.type_name()),
            )),
        },
    }
}
