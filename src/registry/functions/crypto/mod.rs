//! Reversible encryption

mod encrypt;

pub use encrypt::{EncryptFunction, encryption_key};

use crate::registry::function::FunctionRegistry;

/// Register all encryption functions
pub fn register_crypto_functions(registry: &mut FunctionRegistry) {
    registry.register(EncryptFunction);
}
