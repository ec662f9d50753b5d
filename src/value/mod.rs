//! Value model
//!
//! Tagged runtime values and the operator/indexing semantics over them.

pub mod ops;
pub mod types;

pub use ops::{binary, index_get, unary, BinOp, UnOp};
pub use types::{Instance, Value};
