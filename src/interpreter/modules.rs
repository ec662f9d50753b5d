//! Module Loader
//!
//! Deduplicated import of text modules. A leading `@` denotes a logical
//! module resolved through the module source oracle, then along the module
//! path list; anything else is a filesystem path (relative paths resolve
//! against the main file's directory, directories imply `__init__.pashm`).
//! The dedup key is the importing namespace plus the module identity,
//! searched across the whole frame stack. Module bodies execute without
//! frame isolation so their declarations become visible to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use crate::interpreter::errors::{kind, Exec, RunError};
use crate::lexer;
use crate::program::Program;
use crate::value::Value;

/// Oracle for logical module sources (`import '@name'`).
pub trait ModuleSource {
    fn get(&self, name: &str) -> Option<String>;
}

/// The default oracle: the built-in module table.
pub struct BuiltinModules;

impl ModuleSource for BuiltinModules {
    fn get(&self, name: &str) -> Option<String> {
        match name {
            "stdlib" => Some(STDLIB.to_string()),
            _ => None,
        }
    }
}

/// The standard library, imported by `set_commands` before the main file
/// runs.
pub const STDLIB: &str = r#"
define PASHMAK_VERSION "0.1.0"

func abs
    $x = ^
    gotoif ABS_NEG $x < 0
    return $x
    section ABS_NEG
    return 0 - $x
endfunc

func min
    $pair = ^
    gotoif MIN_SECOND $pair[1] < $pair[0]
    return $pair[0]
    section MIN_SECOND
    return $pair[1]
endfunc

func max
    $pair = ^
    gotoif MAX_SECOND $pair[0] < $pair[1]
    return $pair[0]
    section MAX_SECOND
    return $pair[1]
endfunc
"#;

impl Program {
    /// Read the module search path once: `PASHMAKPATH` plus the prepended
    /// defaults. Runtime mutations of the variable are not honored.
    pub fn bootstrap_modules(&mut self) {
        let mut paths = vec![PathBuf::from("/usr/lib/pashmak_modules")];
        if let Ok(home) = std::env::var("HOME") {
            paths.push(PathBuf::from(home).join(".local/lib/pashmak_modules"));
        }
        if let Ok(extra) = std::env::var("PASHMAKPATH") {
            for part in extra.split(':') {
                let part = part.trim();
                if !part.is_empty() {
                    paths.push(PathBuf::from(part));
                }
            }
        }
        self.module_path = paths;
    }

    /// Import scripts/modules by logical name or path.
    pub fn import_script(
        &mut self,
        paths: &[String],
        import_once: bool,
        ismain_default: bool,
    ) -> Exec {
        for path in paths {
            if let Some(module_name) = path.strip_prefix('@') {
                self.import_logical(module_name, ismain_default)?;
            } else {
                self.import_file(path, import_once, ismain_default)?;
            }
        }
        Ok(())
    }

    fn import_logical(&mut self, module_name: &str, ismain_default: bool) -> Exec {
        let key = format!("{}@{}", self.current_namespace(), module_name);
        if self.module_already_imported(&key) {
            return Ok(());
        }

        let (source, location) = if let Some(text) = self.module_source.get(module_name) {
            (text, format!("@{}", module_name))
        } else if let Some(file) = self.find_module_file(module_name) {
            let text = fs::read_to_string(&file).map_err(|e| {
                RunError::new(kind::FILE, format!("{}: {}", file.display(), e))
            })?;
            (text, file.display().to_string())
        } else {
            return Err(RunError::new(
                kind::MODULE,
                format!("undefined module \"{}\"", module_name),
            )
            .into());
        };

        let body = lexer::parse(&source, &location)
            .map_err(|e| RunError::new(kind::SYNTAX, e.to_string()))?;
        self.current_frame()
            .imported_modules
            .borrow_mut()
            .insert(key);
        self.exec_module_body(&body, ismain_default)
    }

    fn import_file(&mut self, path: &str, import_once: bool, ismain_default: bool) -> Exec {
        let mut target = PathBuf::from(path);
        if target.is_relative() {
            let base = self
                .main_filename
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            target = base.join(target);
        }
        if target.is_dir() {
            target = target.join("__init__.pashm");
        }
        let resolved = fs::canonicalize(&target).unwrap_or(target);

        let key = format!("{}@{}", self.current_namespace(), resolved.display());
        if self.module_already_imported(&key) && import_once {
            return Ok(());
        }

        let source = fs::read_to_string(&resolved).map_err(|e| {
            RunError::new(kind::FILE, format!("{}: {}", resolved.display(), e))
        })?;
        let location = resolved.display().to_string();
        let body = lexer::parse(&source, &location)
            .map_err(|e| RunError::new(kind::SYNTAX, e.to_string()))?;
        self.current_frame()
            .imported_modules
            .borrow_mut()
            .insert(key);
        self.exec_module_body(&body, ismain_default)
    }

    /// Search the dedup key across the entire frame stack.
    fn module_already_imported(&self, key: &str) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.imported_modules.borrow().contains(key))
    }

    fn find_module_file(&self, module_name: &str) -> Option<PathBuf> {
        for dir in &self.module_path {
            let base = dir.join(module_name.replace('.', "/"));
            for ext in &self.allowed_extensions {
                let file = base.with_extension(ext);
                if file.is_file() {
                    return Some(file);
                }
                if base.is_dir() {
                    let init = base.join(format!("__init__.{}", ext));
                    if init.is_file() {
                        return Some(init);
                    }
                }
            }
        }
        None
    }

    /// Run a module body without frame isolation, setting `__ismain__` for
    /// the duration and restoring it afterwards.
    fn exec_module_body(&mut self, body: &[crate::lexer::Command], ismain_default: bool) -> Exec {
        let saved = self.get_var("__ismain__");
        self.set_var("__ismain__", Value::Bool(ismain_default));
        let result = self.exec_func(body, false, None);
        if let Some(previous) = saved {
            self.set_var("__ismain__", previous);
        }
        result
    }
}
