//! Program evaluation
//!
//! [`Value`] is the runtime value model; [`Interpreter`] walks a checked
//! AST and writes `print` output to a caller-supplied sink.

mod eval;
mod value;

pub use eval::{Interpreter, NativeMethod};
pub use value::{compare, Object, Value};
