//! Functions that mint new identifiers

mod uid;

pub use uid::UidFunction;

use crate::registry::function::FunctionRegistry;

/// Register all identifier functions
pub fn register_identifier_functions(registry: &mut FunctionRegistry) {
    registry.register(UidFunction);
}
