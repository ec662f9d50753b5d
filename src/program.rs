//! Program Executor
//!
//! Ties the lexer, dispatcher and expression engine together: owns the
//! frame stack, the function/class/define tables, the section map, the
//! rescue stack and the memory slot. Runs frames command by command,
//! routes raised errors (into `try` rescue sections, the test-mode
//! recorder, or an uncaught-error trace), and handles SIGINT by running
//! shutdown callbacks between commands.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;

use crate::builtins::{self, NativeRegistry};
use crate::interpreter::classes::{builtin_error_class, Class, ERROR_CLASS};
use crate::interpreter::errors::{kind, Flow, RunError};
use crate::interpreter::functions::Function;
use crate::interpreter::modules::{BuiltinModules, ModuleSource};
use crate::interpreter::types::Frame;
use crate::lexer::{self, Command};
use crate::value::{Instance, Value};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install the SIGINT handler: the flag is checked between commands, so a
/// partially executed command is never abandoned midway.
pub fn install_interrupt_handler() {
    let handler = handle_interrupt as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

fn interrupt_requested() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// A Pashmak program: state plus the execution loop.
pub struct Program {
    pub frames: Vec<Frame>,
    pub functions: HashMap<String, Function>,
    pub classes: HashMap<String, Class>,
    pub defines: HashMap<String, Value>,
    /// Section label -> index of the command following the directive.
    pub sections: HashMap<String, usize>,
    /// Active `try` rescue labels, innermost last.
    pub try_endtry: Vec<String>,
    /// The memory slot: the implicit argument/return channel. Null means
    /// empty.
    pub mem: Value,
    pub namespaces_tree: Vec<String>,
    /// Functions (or methods) currently collecting their bodies.
    pub current_func: Vec<String>,
    /// Classes currently collecting their bodies.
    pub current_class: Vec<String>,
    pub func_depth: usize,
    pub last_docstring: String,
    pub natives: NativeRegistry,
    pub module_path: Vec<PathBuf>,
    pub module_source: Box<dyn ModuleSource>,
    pub main_filename: PathBuf,
    pub allowed_extensions: Vec<String>,
    /// Test mode: capture output and record runtime errors instead of
    /// aborting the process.
    pub is_test: bool,
    pub output: String,
    pub runtime_error: Option<RunError>,
    pub stop_after_error: bool,
    shutdown_events: Vec<Box<dyn FnMut()>>,
}

impl Program {
    pub fn new(is_test: bool, args: Vec<String>) -> Self {
        let root_commands = lexer::parse("pass", "<system>").unwrap_or_default();

        let mut vars = HashMap::new();
        vars.insert(
            "argv".to_string(),
            Value::List(args.iter().map(|a| Value::Str(a.clone())).collect()),
        );
        vars.insert("argc".to_string(), Value::Int(args.len() as i64));

        let mut functions = HashMap::new();
        functions.insert("mem".to_string(), Function::empty("mem"));
        functions.insert("rmem".to_string(), Function::empty("rmem"));

        let mut classes = HashMap::new();
        classes.insert(ERROR_CLASS.to_string(), builtin_error_class());

        let main_filename = std::env::current_dir()
            .unwrap_or_default()
            .join("__main__");

        Self {
            frames: vec![Frame::root(root_commands, vars)],
            functions,
            classes,
            defines: HashMap::new(),
            sections: HashMap::new(),
            try_endtry: Vec::new(),
            mem: Value::Null,
            namespaces_tree: Vec::new(),
            current_func: Vec::new(),
            current_class: Vec::new(),
            func_depth: 0,
            last_docstring: String::new(),
            natives: builtins::default_registry(),
            module_path: Vec::new(),
            module_source: Box::new(BuiltinModules),
            main_filename,
            allowed_extensions: vec!["pashm".to_string()],
            is_test,
            output: String::new(),
            runtime_error: None,
            stop_after_error: true,
            shutdown_events: Vec::new(),
        }
    }

    pub(crate) fn current_frame(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub(crate) fn current_frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Read a variable from the current frame.
    pub fn get_var(&self, name: &str) -> Option<Value> {
        self.current_frame().vars.borrow().get(name).cloned()
    }

    /// Bind a variable in the current frame.
    pub fn set_var(&mut self, name: &str, value: Value) {
        self.current_frame()
            .vars
            .borrow_mut()
            .insert(name.to_string(), value);
    }

    /// Return the memory slot's value and empty it.
    pub fn take_mem(&mut self) -> Value {
        std::mem::replace(&mut self.mem, Value::Null)
    }

    /// Write program output: captured in test mode, stdout otherwise.
    pub fn output_write(&mut self, text: &str) {
        if self.is_test {
            self.output.push_str(text);
        } else {
            print!("{}", text);
            let _ = std::io::stdout().flush();
        }
    }

    /// Register a shutdown callback; they run in registration order when
    /// the root frame finishes or on interrupt.
    pub fn on_shutdown(&mut self, callback: impl FnMut() + 'static) {
        self.shutdown_events.push(Box::new(callback));
    }

    pub fn run_shutdown_events(&mut self) {
        for event in &mut self.shutdown_events {
            event();
        }
        self.shutdown_events.clear();
    }

    /// Install the main command list: binds `__file__`, `__dir__` and
    /// `__ismain__`, imports the standard library, then replaces the root
    /// frame's commands.
    pub fn set_commands(&mut self, commands: Vec<Command>) -> Result<(), Flow> {
        let main = self.main_filename.clone();
        self.set_var("__file__", Value::Str(main.display().to_string()));
        let dir = main
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.set_var("__dir__", Value::Str(dir));
        self.set_var("__ismain__", Value::Bool(true));
        self.import_script(&["@stdlib".to_string()], true, false)?;
        self.frames[0].commands = commands;
        Ok(())
    }

    /// Run the program: install the interrupt handler, read the module
    /// path, execute the root frame, run shutdown callbacks. Returns the
    /// process exit code.
    pub fn start(&mut self) -> i32 {
        install_interrupt_handler();
        self.bootstrap_modules();
        let result = self.start_frame();
        self.run_shutdown_events();
        match result {
            Ok(()) | Err(Flow::Return) => 0,
            Err(Flow::Exit(code)) => code,
            Err(_) => 1,
        }
    }

    /// Run a command body as a function or included script. Isolated
    /// frames start from a shallow copy of the root frame's vars with the
    /// caller's `argv`/`argc`/`__file__`/`__dir__`/`__ismain__` deep-copied
    /// in, plus any default bindings (`this` for methods). Non-isolated
    /// frames share vars, used namespaces and imported modules with the
    /// caller by reference.
    pub fn exec_func(
        &mut self,
        body: &[Command],
        isolate: bool,
        default_vars: Option<HashMap<String, Value>>,
    ) -> Result<(), Flow> {
        let old_file = self.get_var("__file__");
        let old_dir = self.get_var("__dir__");

        let frame = if isolate {
            let mut vars = self.frames[0].vars.borrow().clone();
            for key in ["argv", "argc", "__file__", "__dir__", "__ismain__"] {
                if let Some(value) = self.get_var(key) {
                    vars.insert(key.to_string(), value.deep_copy());
                }
            }
            if let Some(defaults) = default_vars {
                vars.extend(defaults);
            }
            Frame::isolated(body.to_vec(), vars)
        } else {
            Frame::shared(self.current_frame(), body.to_vec())
        };
        self.frames.push(frame);

        if let Some(first) = body.first() {
            let file_path = first.file_path.clone();
            self.set_var("__file__", Value::Str(file_path.clone()));
            let path = std::path::Path::new(&file_path);
            if path.is_file() {
                if let Some(parent) = path.parent() {
                    self.set_var("__dir__", Value::Str(parent.display().to_string()));
                }
            }
        }

        let result = self.start_frame();
        self.frames.pop();

        if let Some(value) = old_dir {
            self.set_var("__dir__", value);
        }
        if let Some(value) = old_file {
            self.set_var("__file__", value);
        }
        result
    }

    /// Execute the top frame to completion. `Err` carries control flow
    /// still unwinding past this frame (rescue targets below it, exit,
    /// test-mode abort).
    pub fn start_frame(&mut self) -> Result<(), Flow> {
        let depth = self.frames.len() - 1;
        self.frames[depth].pc = 0;

        if let Err(flow) = self.prescan_sections() {
            match flow {
                Flow::Raise(error) => {
                    let op = self.frames[depth]
                        .commands
                        .first()
                        .cloned()
                        .unwrap_or_else(|| Command::pass("<system>"));
                    match self.route_error(error, &op) {
                        Flow::Rescue { depth: d, step } if d == depth => {
                            self.frames[depth].pc = step as i64 - 1;
                        }
                        other => return Err(other),
                    }
                }
                other => return Err(other),
            }
        }

        loop {
            if interrupt_requested() && !self.is_test {
                self.run_shutdown_events();
                std::process::exit(1);
            }

            let index = {
                let frame = &self.frames[depth];
                let index = frame.current_index();
                if index >= frame.commands.len() {
                    break;
                }
                index
            };
            let op = self.frames[depth].commands[index].clone();

            match self.run(&op) {
                Ok(()) => {}
                Err(Flow::Return) => break,
                Err(Flow::Raise(error)) => match self.route_error(error, &op) {
                    Flow::Rescue { depth: d, step } if d == depth => {
                        self.frames[depth].pc = step as i64 - 1;
                    }
                    other => return Err(other),
                },
                Err(Flow::Rescue { depth: d, step }) if d == depth => {
                    self.frames[depth].pc = step as i64 - 1;
                }
                Err(other) => return Err(other),
            }

            self.frames[depth].pc += 1;
        }
        Ok(())
    }

    /// Route a raised error. With an active `try`, resolve its label to a
    /// section, find the deepest frame holding that section (its directive
    /// was rewritten to `pass`), put an `Error` instance into the memory
    /// slot and unwind there. Otherwise record (test mode) or print a
    /// frame trace and exit.
    pub(crate) fn route_error(&mut self, error: RunError, op: &Command) -> Flow {
        let mut error = error;
        while let Some(label) = self.try_endtry.pop() {
            let Some(&step) = self.sections.get(&label) else {
                error = RunError::new(kind::KEY, format!("undefined section \"{}\"", label));
                continue;
            };
            let target = (0..self.frames.len()).rev().find(|&d| {
                step >= 1
                    && self.frames[d]
                        .commands
                        .get(step - 1)
                        .map(|c| c.head == "pass")
                        .unwrap_or(false)
            });
            if let Some(depth) = target {
                self.mem = self.make_error_value(&error, op);
                return Flow::Rescue { depth, step };
            }
        }

        if self.is_test {
            self.runtime_error = Some(error);
            if self.stop_after_error {
                let end = self.frames[0].commands.len() as i64;
                self.frames[0].pc = end * 2;
            }
            return Flow::Abort;
        }

        self.print_error_trace(&error, op);
        std::process::exit(1);
    }

    /// Build an `Error` instance carrying kind, message and location.
    fn make_error_value(&self, error: &RunError, op: &Command) -> Value {
        let mut props: IndexMap<String, Value> = self
            .classes
            .get(ERROR_CLASS)
            .map(|c| {
                c.props
                    .iter()
                    .map(|(k, v)| (k.clone(), v.deep_copy()))
                    .collect()
            })
            .unwrap_or_default();
        props.insert("type".to_string(), Value::Str(error.kind.clone()));
        props.insert("message".to_string(), Value::Str(error.message.clone()));
        props.insert("file_path".to_string(), Value::Str(op.file_path.clone()));
        props.insert(
            "line_number".to_string(),
            Value::Int(op.line_number as i64),
        );
        Value::Instance(Rc::new(RefCell::new(Instance {
            class_name: ERROR_CLASS.to_string(),
            props,
        })))
    }

    fn print_error_trace(&self, error: &RunError, op: &Command) {
        println!("{}: {}:", error.kind, error.message);
        for frame in &self.frames[..self.frames.len().saturating_sub(1)] {
            if let Some(cmd) = frame.commands.get(frame.current_index()) {
                println!("\tin {}:{}: {}", cmd.file_path, cmd.line_number, cmd.source);
            }
        }
        println!("\tin {}:{}: {}", op.file_path, op.line_number, op.source);
        if self.frames.len() > 1 {
            println!("{}: {}:", error.kind, error.message);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(source: &str) -> Program {
        let mut prog = Program::new(true, Vec::new());
        let commands = lexer::parse(source, "<test>").expect("script should parse");
        prog.set_commands(commands).expect("set_commands");
        let _ = prog.start_frame();
        prog
    }

    #[test]
    fn test_print_hello() {
        let prog = run_script("print(\"hello\")");
        assert_eq!(prog.output, "hello\n");
        assert!(prog.runtime_error.is_none());
    }

    #[test]
    fn test_function_call_with_list_argument() {
        let prog = run_script(
            "func add\nreturn ^[0] + ^[1]\nendfunc\nprint(add(2, 3))",
        );
        assert_eq!(prog.output, "5\n");
    }

    #[test]
    fn test_statement_form_call_with_several_arguments() {
        let prog = run_script(
            "func add\nreturn ^[0] + ^[1]\nendfunc\nadd (2, 3)\nprint(^)",
        );
        assert_eq!(prog.output, "5\n");
    }

    #[test]
    fn test_goto_skips_commands() {
        let prog = run_script(
            "section L\ngoto END\nprint(\"skipped\")\nsection END\nprint(\"ok\")",
        );
        assert_eq!(prog.output, "ok\n");
    }

    #[test]
    fn test_try_rescues_division_by_zero() {
        let prog = run_script(
            "try T\n$x = 1 / 0\nendtry\nprint(\"not reached\")\nsection T\nprint(\"caught\")",
        );
        assert_eq!(prog.output, "caught\n");
        assert!(prog.runtime_error.is_none());
    }

    #[test]
    fn test_rescue_receives_error_instance() {
        let prog = run_script(
            "try T\n$x = 1 / 0\nsection T\n$e = ^\nprint($e->type)\nprint($e->line_number)",
        );
        assert_eq!(prog.output, "ZeroDivisionError\n2\n");
    }

    #[test]
    fn test_rescue_unwinds_function_frames() {
        let prog = run_script(
            "func boom\n$x = 1 / 0\nendfunc\ntry T\nboom()\nsection T\n$e = ^\nprint($e->type)",
        );
        assert_eq!(prog.output, "ZeroDivisionError\n");
    }

    #[test]
    fn test_namespace_use_resolution() {
        let prog = run_script(
            "namespace A\nfunc f\nreturn 1\nendfunc\nendnamespace\nuse A\nprint(f())",
        );
        assert_eq!(prog.output, "1\n");
    }

    #[test]
    fn test_class_init_and_property_access() {
        let prog = run_script(
            "class C\n$x = 0\nfunc init\nthis->x = ^\nendfunc\nendclass\n$o = new C(7)\nprint($o->x)",
        );
        assert_eq!(prog.output, "7\n");
    }

    #[test]
    fn test_instances_are_reference_like() {
        let prog = run_script(
            "class C\n$x = 0\nendclass\n$a = new C()\n$b = $a\n$b->x = 9\nprint($a->x)",
        );
        assert_eq!(prog.output, "9\n");
    }

    #[test]
    fn test_instance_type_attribute() {
        let prog = run_script("class C\nendclass\n$o = new C()\nprint($o->type)");
        assert_eq!(prog.output, "C\n");
    }

    #[test]
    fn test_method_call_with_this() {
        let prog = run_script(
            "class Counter\n$n = 0\nfunc bump\nthis->n = $this->n + 1\nreturn $this->n\nendfunc\nendclass\n$c = new Counter()\n$c->bump()\nprint($c->bump())",
        );
        assert_eq!(prog.output, "2\n");
    }

    #[test]
    fn test_mem_round_trip() {
        let prog = run_script(
            "func f\nreturn 42\nendfunc\nf ()\nprint(^)\nprint(^)",
        );
        assert_eq!(prog.output, "42\nnull\n");
    }

    #[test]
    fn test_mem_and_rmem() {
        let prog = run_script("mem (5)\nprint(^)\nmem (6)\nrmem ^\nprint(^)");
        assert_eq!(prog.output, "5\nnull\n");
    }

    #[test]
    fn test_while_loop() {
        let prog = run_script(
            "$i = 0\n$sum = 0\nwhile $i < 3\n$sum = $sum + $i\n$i = $i + 1\nendwhile\nprint($sum)",
        );
        assert_eq!(prog.output, "3\n");
    }

    #[test]
    fn test_while_break_and_continue() {
        let prog = run_script(
            "$i = 0\nwhile true\n$i = $i + 1\ngotoif DONE $i >= 2\ncontinue\nsection DONE\nbreak\nendwhile\nprint($i)",
        );
        assert_eq!(prog.output, "2\n");
    }

    #[test]
    fn test_nested_while() {
        let prog = run_script(
            "$total = 0\n$i = 0\nwhile $i < 2\n$j = 0\nwhile $j < 3\n$total = $total + 1\n$j = $j + 1\nendwhile\n$i = $i + 1\nendwhile\nprint($total)",
        );
        assert_eq!(prog.output, "6\n");
    }

    #[test]
    fn test_if_elif_else() {
        let prog = run_script(
            "$x = 2\nif $x == 1\nprint(\"one\")\nelif $x == 2\nprint(\"two\")\nelse\nprint(\"other\")\nendif",
        );
        assert_eq!(prog.output, "two\n");
    }

    #[test]
    fn test_if_else_branch() {
        let prog = run_script(
            "$x = 5\nif $x == 1\nprint(\"one\")\nelse\nprint(\"other\")\nendif\nprint(\"after\")",
        );
        assert_eq!(prog.output, "other\nafter\n");
    }

    #[test]
    fn test_gotoif_consumes_mem_without_condition() {
        let prog = run_script(
            "mem (true)\ngotoif SKIP\nprint(\"not reached\")\nsection SKIP\nprint(\"jumped\")",
        );
        assert_eq!(prog.output, "jumped\n");
    }

    #[test]
    fn test_undefined_variable_error_recorded() {
        let prog = run_script("print($missing)");
        let error = prog.runtime_error.expect("error expected");
        assert_eq!(error.kind, kind::VARIABLE);
        assert!(error.message.contains("missing"));
    }

    #[test]
    fn test_undefined_name_error() {
        let prog = run_script("no_such_function()");
        let error = prog.runtime_error.expect("error expected");
        assert_eq!(error.kind, kind::NAME);
    }

    #[test]
    fn test_endnamespace_underflow() {
        let prog = run_script("endnamespace");
        let error = prog.runtime_error.expect("error expected");
        assert_eq!(error.kind, kind::INDEX);
    }

    #[test]
    fn test_namespace_with_dot_rejected() {
        let prog = run_script("namespace a.b");
        let error = prog.runtime_error.expect("error expected");
        assert_eq!(error.kind, kind::NAMESPACE_DOT);
    }

    #[test]
    fn test_goto_unknown_section() {
        let prog = run_script("goto NOWHERE");
        let error = prog.runtime_error.expect("error expected");
        assert_eq!(error.kind, kind::KEY);
    }

    #[test]
    fn test_defines_resolve_in_expressions() {
        let prog = run_script("define TWO 2\nprint(TWO + 1)");
        assert_eq!(prog.output, "3\n");
    }

    #[test]
    fn test_stdlib_define_available() {
        let prog = run_script("print(PASHMAK_VERSION)");
        assert_eq!(prog.output, "0.1.0\n");
    }

    #[test]
    fn test_stdlib_functions() {
        let prog = run_script("print(abs(0 - 4))\nprint(min(2, 9))\nprint(max(2, 9))");
        assert_eq!(prog.output, "4\n2\n9\n");
    }

    #[test]
    fn test_docstring_attachment() {
        let prog = run_script(
            "@doc \"adds numbers\"\nfunc add2\nreturn ^\nendfunc\nprint(doc(add2))",
        );
        assert_eq!(prog.output, "adds numbers\n");
    }

    #[test]
    fn test_eval_shares_frame() {
        let prog = run_script("eval(\"$x = 5\")\nprint($x)");
        assert_eq!(prog.output, "5\n");
    }

    #[test]
    fn test_inline_call() {
        let prog = run_script("$x = %{ mem (21) }% + 21\nprint($x)");
        assert_eq!(prog.output, "42\n");
    }

    #[test]
    fn test_exit_flow() {
        let mut prog = Program::new(true, Vec::new());
        let commands = lexer::parse("exit(3)\nprint(\"not reached\")", "<test>").unwrap();
        prog.set_commands(commands).unwrap();
        let result = prog.start_frame();
        assert!(matches!(result, Err(Flow::Exit(3))));
        assert_eq!(prog.output, "");
    }

    #[test]
    fn test_list_and_map_assignment() {
        let prog = run_script(
            "$l = [1, 2, 3]\n$l[1] = 9\nprint($l)\n$m = {\"a\": 1}\n$m[\"b\"] = 2\nprint($m[\"b\"])",
        );
        assert_eq!(prog.output, "[1, 9, 3]\n2\n");
    }

    #[test]
    fn test_argv_and_argc() {
        let mut prog = Program::new(true, vec!["one".to_string(), "two".to_string()]);
        let commands = lexer::parse("print($argc)\nprint($argv[1])", "<test>").unwrap();
        prog.set_commands(commands).unwrap();
        let _ = prog.start_frame();
        assert_eq!(prog.output, "2\ntwo\n");
    }

    #[test]
    fn test_isolated_frames_do_not_leak_vars() {
        let prog = run_script(
            "$secret = 1\nfunc f\n$local = 2\nreturn null\nendfunc\nf ()\nprint($local)",
        );
        let error = prog.runtime_error.expect("error expected");
        assert_eq!(error.kind, kind::VARIABLE);
    }

    #[test]
    fn test_function_sees_root_vars_not_caller_locals() {
        let prog = run_script(
            "$root = 10\nfunc outer\n$hidden = 1\nreturn inner()\nendfunc\nfunc inner\nreturn $root\nendfunc\nprint(outer())",
        );
        assert_eq!(prog.output, "10\n");
    }

    #[test]
    fn test_import_once_is_idempotent() {
        let dir = std::env::temp_dir().join(format!(
            "pashmak-test-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let module = dir.join("counter_mod.pashm");
        std::fs::write(&module, "$counter = $counter + 1\n").unwrap();

        let mut prog = Program::new(true, Vec::new());
        prog.set_commands(lexer::parse("$counter = 0", "<test>").unwrap())
            .unwrap();
        let _ = prog.start_frame();

        let path = module.display().to_string();
        prog.import_script(std::slice::from_ref(&path), true, false)
            .unwrap();
        prog.import_script(std::slice::from_ref(&path), true, false)
            .unwrap();
        assert_eq!(prog.get_var("counter"), Some(Value::Int(1)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_logical_module() {
        let prog = run_script("import(\"@no_such_module\")");
        let error = prog.runtime_error.expect("error expected");
        assert_eq!(error.kind, kind::MODULE);
    }

    #[test]
    fn test_json_and_base64_natives() {
        let prog = run_script(
            "print(json_encode([1, 2]))\nprint(json_decode(\"{\\\"a\\\": 3}\")[\"a\"])\nprint(base64_encode(\"hi\"))\nprint(base64_decode(\"aGk=\"))",
        );
        assert_eq!(prog.output, "[1,2]\n3\naGk=\nhi\n");
    }

    #[test]
    fn test_typeof_and_len() {
        let prog = run_script(
            "print(typeof(1))\nprint(typeof(\"s\"))\nprint(len(\"abc\"))\nprint(len([1, 2]))",
        );
        assert_eq!(prog.output, "int\nstring\n3\n2\n");
    }

    #[test]
    fn test_range_native() {
        let prog = run_script("print(range(3))\nprint(range([1, 7, 2]))");
        assert_eq!(prog.output, "[0, 1, 2]\n[1, 3, 5]\n");
    }

    #[test]
    fn test_nested_function_declaration() {
        let prog = run_script(
            "func outer\nfunc inner\nreturn 5\nendfunc\nreturn inner()\nendfunc\nprint(outer())",
        );
        assert_eq!(prog.output, "5\n");
    }

    #[test]
    fn test_expression_statement_sets_mem() {
        let prog = run_script("1 + 2\nprint(^)");
        assert_eq!(prog.output, "3\n");
    }

    #[test]
    fn test_pc_stays_in_bounds_after_jumps() {
        let prog = run_script(
            "$i = 0\nsection A\n$i = $i + 1\ngotoif A $i < 3\nprint($i)",
        );
        assert_eq!(prog.output, "3\n");
        for frame in &prog.frames {
            assert!(frame.current_index() <= frame.commands.len() * 2);
        }
    }
}
