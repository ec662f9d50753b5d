//! Interpreter module
//!
//! Frames, the command dispatcher, control flow, the function/class
//! system, namespaces and the module loader.

pub mod classes;
pub mod control_flow;
pub mod dispatcher;
pub mod errors;
pub mod functions;
pub mod modules;
pub mod namespaces;
pub mod types;

pub use classes::Class;
pub use errors::{Exec, Flow, RunError};
pub use functions::Function;
pub use modules::{BuiltinModules, ModuleSource};
pub use types::{Frame, LoopRecord};
