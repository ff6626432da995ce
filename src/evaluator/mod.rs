//! Expression evaluation
//!
//! The right-hand side of a command is scanned left to right. Literals,
//! variable references, function calls, `this` and path references each append
//! to the current value; a top-level `,` ends it. [`ValueScanner`] yields one
//! value per comma-separated part, which is how function arguments are
//! collected.

mod context;
mod scanner;

pub use context::{EvaluationContext, VariableTable};
pub use scanner::{Expression, ScannedValue, ValueScanner};
