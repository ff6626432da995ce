//! Text reduction functions

mod initials;
mod round;

pub use initials::{InitialsFunction, initials};
pub use round::{RoundFunction, round_age};

use crate::registry::function::FunctionRegistry;

/// Register all text functions
pub fn register_text_functions(registry: &mut FunctionRegistry) {
    registry.register(InitialsFunction);
    registry.register(RoundFunction);
}
