//! Interpreter Types
//!
//! Call frames and their construction modes. A frame owns a program
//! counter and a command list; variables, used namespaces and imported
//! modules live behind `Rc<RefCell<..>>` so that non-isolating calls can
//! share them with the caller by reference while isolating calls get
//! fresh maps.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::lexer::Command;
use crate::value::Value;

/// An active `while` loop inside a frame: the index of the test command
/// and of its matching `endwhile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopRecord {
    pub test_index: usize,
    pub end_index: usize,
}

/// A call-stack entry.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Program counter. Transiently -1 right after a backward jump; the
    /// step increment lands it back on a valid index.
    pub pc: i64,
    pub commands: Vec<Command>,
    pub vars: Rc<RefCell<HashMap<String, Value>>>,
    pub used_namespaces: Rc<RefCell<Vec<String>>>,
    pub imported_modules: Rc<RefCell<HashSet<String>>>,
    /// Stack of active loops, innermost last.
    pub loops: Vec<LoopRecord>,
}

impl Frame {
    /// Root frame with its own state.
    pub fn root(commands: Vec<Command>, vars: HashMap<String, Value>) -> Self {
        Self {
            pc: 0,
            commands,
            vars: Rc::new(RefCell::new(vars)),
            used_namespaces: Rc::new(RefCell::new(Vec::new())),
            imported_modules: Rc::new(RefCell::new(HashSet::new())),
            loops: Vec::new(),
        }
    }

    /// Isolated frame for an ordinary function call: fresh maps seeded by
    /// the caller (see `Program::exec_func`), empty namespace uses and
    /// import set.
    pub fn isolated(commands: Vec<Command>, vars: HashMap<String, Value>) -> Self {
        Self::root(commands, vars)
    }

    /// Non-isolated frame sharing vars, used namespaces and imported
    /// modules with the parent by reference.
    pub fn shared(parent: &Frame, commands: Vec<Command>) -> Self {
        Self {
            pc: 0,
            commands,
            vars: Rc::clone(&parent.vars),
            used_namespaces: Rc::clone(&parent.used_namespaces),
            imported_modules: Rc::clone(&parent.imported_modules),
            loops: Vec::new(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.pc.max(0) as usize
    }

    pub fn finished(&self) -> bool {
        self.pc < 0 || self.current_index() >= self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::parse;

    #[test]
    fn test_shared_frame_sees_parent_writes() {
        let cmds = parse("pass", "<test>").unwrap();
        let parent = Frame::root(cmds.clone(), HashMap::new());
        let child = Frame::shared(&parent, cmds);
        parent
            .vars
            .borrow_mut()
            .insert("x".to_string(), Value::Int(1));
        assert_eq!(child.vars.borrow().get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_isolated_frame_has_own_vars() {
        let cmds = parse("pass", "<test>").unwrap();
        let parent = Frame::root(cmds.clone(), HashMap::new());
        let child = Frame::isolated(cmds, parent.vars.borrow().clone());
        child
            .vars
            .borrow_mut()
            .insert("x".to_string(), Value::Int(1));
        assert!(parent.vars.borrow().get("x").is_none());
    }
}
