//! Functions backed by external tables

mod integer;
mod lookup;

pub use integer::IntegerFunction;
pub use lookup::LookupFunction;

use crate::registry::function::FunctionRegistry;

/// Register all table functions
pub fn register_table_functions(registry: &mut FunctionRegistry) {
    registry.register(LookupFunction);
    registry.register(IntegerFunction);
}
