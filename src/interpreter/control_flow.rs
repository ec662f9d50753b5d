//! Control Flow
//!
//! The labeled substrate (`section`/`goto`/`gotoif`), structured rescue
//! (`try`/`endtry`), loops (`while`/`endwhile`/`break`/`continue`) and
//! conditionals (`if`/`elif`/`else`/`endif`).
//!
//! Sections are materialized by a pre-pass over the frame's commands before
//! execution; the directive itself is rewritten to `pass`. Jumps set the
//! program counter one short of the target so the post-command increment
//! lands on it.

use crate::expr::eval_text;
use crate::interpreter::errors::{kind, Exec, RunError};
use crate::interpreter::types::LoopRecord;
use crate::lexer::Command;
use crate::program::Program;

/// Find the `endwhile` matching the `while` at `start`, counting nesting.
fn find_matching_endwhile(commands: &[Command], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, cmd) in commands.iter().enumerate().skip(start + 1) {
        match cmd.head.as_str() {
            "while" => depth += 1,
            "endwhile" => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Find the `endif` matching the `if` at `start`, counting nesting.
fn find_matching_endif(commands: &[Command], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, cmd) in commands.iter().enumerate().skip(start + 1) {
        match cmd.head.as_str() {
            "if" => depth += 1,
            "endif" => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

impl Program {
    /// Register the frame's top-level sections before execution, rewriting
    /// each directive to `pass`. Sections inside function bodies are left
    /// alone; they register when the function's own frame starts.
    pub(crate) fn prescan_sections(&mut self) -> Exec {
        let depth = self.frames.len() - 1;
        let mut in_func = false;
        for i in 0..self.frames[depth].commands.len() {
            let (head, label) = {
                let cmd = &self.frames[depth].commands[i];
                (cmd.head.clone(), cmd.args.first().cloned())
            };
            match head.as_str() {
                "section" if !in_func => {
                    let label = label.ok_or_else(|| {
                        RunError::new(kind::SYNTAX, "section requires a label")
                    })?;
                    self.sections.insert(label, i + 1);
                    self.frames[depth].commands[i] = Command::pass("<system>");
                }
                "func" => in_func = true,
                "endfunc" => in_func = false,
                _ => {}
            }
        }
        Ok(())
    }

    /// `goto label`: jump to the command following the section directive.
    pub(crate) fn run_goto(&mut self, op: &Command) -> Exec {
        let label = op
            .args
            .first()
            .ok_or_else(|| RunError::new(kind::SYNTAX, "goto requires a label"))?;
        let step = *self.sections.get(label).ok_or_else(|| {
            RunError::new(kind::KEY, format!("undefined section \"{}\"", label))
        })?;
        self.current_frame_mut().pc = step as i64 - 1;
        Ok(())
    }

    /// `gotoif label [condition]`: jump when the condition is truthy. With
    /// no condition text the memory slot is consumed as the condition.
    pub(crate) fn run_gotoif(&mut self, op: &Command) -> Exec {
        let label = op
            .args
            .first()
            .ok_or_else(|| RunError::new(kind::SYNTAX, "gotoif requires a label"))?
            .clone();
        let rest = op.args_text[label.len()..].trim().to_string();
        let condition = if rest.is_empty() {
            self.take_mem()
        } else {
            eval_text(self, &rest, true)?
        };
        if condition.is_truthy() {
            let step = *self.sections.get(&label).ok_or_else(|| {
                RunError::new(kind::KEY, format!("undefined section \"{}\"", label))
            })?;
            self.current_frame_mut().pc = step as i64 - 1;
        }
        Ok(())
    }

    /// `try label`: register a rescue target.
    pub(crate) fn run_try(&mut self, op: &Command) -> Exec {
        let label = op
            .args
            .first()
            .ok_or_else(|| RunError::new(kind::SYNTAX, "try requires a section label"))?
            .clone();
        self.try_endtry.push(label);
        Ok(())
    }

    pub(crate) fn run_endtry(&mut self, _op: &Command) -> Exec {
        self.try_endtry
            .pop()
            .map(|_| ())
            .ok_or_else(|| RunError::new(kind::INDEX, "endtry without an active try").into())
    }

    /// `while condition`: on a truthy test, enter (or stay in) the loop; on
    /// a falsy test, drop the loop record and jump past `endwhile`.
    pub(crate) fn run_while(&mut self, op: &Command) -> Exec {
        if op.args_text.is_empty() {
            return Err(RunError::new(kind::SYNTAX, "while requires a condition").into());
        }
        let test_index = self.current_frame().current_index();
        let end_index = find_matching_endwhile(&self.current_frame().commands, test_index)
            .ok_or_else(|| RunError::new(kind::SYNTAX, "while without a matching endwhile"))?;

        let condition = eval_text(self, &op.args_text, true)?;
        let frame = self.current_frame_mut();
        let record = LoopRecord { test_index, end_index };
        if condition.is_truthy() {
            if frame.loops.last() != Some(&record) {
                frame.loops.push(record);
            }
        } else {
            if frame.loops.last() == Some(&record) {
                frame.loops.pop();
            }
            frame.pc = end_index as i64;
        }
        Ok(())
    }

    /// `endwhile`: jump back to the loop test.
    pub(crate) fn run_endwhile(&mut self, _op: &Command) -> Exec {
        let frame = self.current_frame_mut();
        match frame.loops.last() {
            Some(record) => {
                frame.pc = record.test_index as i64 - 1;
                Ok(())
            }
            None => Err(RunError::new(kind::SYNTAX, "endwhile outside of a loop").into()),
        }
    }

    /// `break`: leave the innermost loop.
    pub(crate) fn run_break(&mut self, _op: &Command) -> Exec {
        let frame = self.current_frame_mut();
        match frame.loops.pop() {
            Some(record) => {
                frame.pc = record.end_index as i64;
                Ok(())
            }
            None => Err(RunError::new(kind::SYNTAX, "break outside of a loop").into()),
        }
    }

    /// `continue`: jump back to the innermost loop's test.
    pub(crate) fn run_continue(&mut self, _op: &Command) -> Exec {
        let frame = self.current_frame_mut();
        match frame.loops.last() {
            Some(record) => {
                frame.pc = record.test_index as i64 - 1;
                Ok(())
            }
            None => Err(RunError::new(kind::SYNTAX, "continue outside of a loop").into()),
        }
    }

    /// `if condition`: on a falsy test, scan forward for the branch to take
    /// (an `elif` whose condition holds, `else`, or `endif`).
    pub(crate) fn run_if(&mut self, op: &Command) -> Exec {
        if op.args_text.is_empty() {
            return Err(RunError::new(kind::SYNTAX, "if requires a condition").into());
        }
        let condition = eval_text(self, &op.args_text, true)?;
        if condition.is_truthy() {
            return Ok(());
        }

        let start = self.current_frame().current_index();
        let mut depth = 0usize;
        let mut i = start + 1;
        loop {
            let (head, cond_text) = {
                let commands = &self.current_frame().commands;
                match commands.get(i) {
                    Some(cmd) => (cmd.head.clone(), cmd.args_text.clone()),
                    None => {
                        return Err(RunError::new(
                            kind::SYNTAX,
                            "if without a matching endif",
                        )
                        .into())
                    }
                }
            };
            match head.as_str() {
                "if" => depth += 1,
                "endif" => {
                    if depth == 0 {
                        self.current_frame_mut().pc = i as i64;
                        return Ok(());
                    }
                    depth -= 1;
                }
                "elif" if depth == 0 => {
                    let branch = eval_text(self, &cond_text, true)?;
                    if branch.is_truthy() {
                        self.current_frame_mut().pc = i as i64;
                        return Ok(());
                    }
                }
                "else" if depth == 0 => {
                    self.current_frame_mut().pc = i as i64;
                    return Ok(());
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// `elif`/`else` reached by falling out of a taken branch: skip to the
    /// matching `endif`.
    pub(crate) fn run_elif(&mut self, _op: &Command) -> Exec {
        self.skip_to_endif()
    }

    pub(crate) fn run_else(&mut self, _op: &Command) -> Exec {
        self.skip_to_endif()
    }

    fn skip_to_endif(&mut self) -> Exec {
        let start = self.current_frame().current_index();
        let end = find_matching_endif(&self.current_frame().commands, start)
            .ok_or_else(|| RunError::new(kind::SYNTAX, "branch without a matching endif"))?;
        self.current_frame_mut().pc = end as i64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::parse;

    #[test]
    fn test_find_matching_endwhile_nested() {
        let cmds = parse(
            "while $a\nwhile $b\nendwhile\nendwhile\npass",
            "<test>",
        )
        .unwrap();
        assert_eq!(find_matching_endwhile(&cmds, 0), Some(3));
        assert_eq!(find_matching_endwhile(&cmds, 1), Some(2));
        assert_eq!(find_matching_endwhile(&cmds, 4), None);
    }

    #[test]
    fn test_find_matching_endif_nested() {
        let cmds = parse("if $a\nif $b\nendif\nendif", "<test>").unwrap();
        assert_eq!(find_matching_endif(&cmds, 0), Some(3));
        assert_eq!(find_matching_endif(&cmds, 1), Some(2));
    }
}
