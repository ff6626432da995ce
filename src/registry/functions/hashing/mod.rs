//! Deterministic hashing functions

mod hash;
mod hash_name;
mod hash_ptid;
mod hash_uid;

pub use hash::HashFunction;
pub use hash_name::{HashNameFunction, normalize_name};
pub use hash_ptid::HashPtIdFunction;
pub use hash_uid::{HashUidFunction, MAX_UID_LENGTH, normalize_root};

use crate::registry::function::FunctionRegistry;
use md5::{Digest, Md5};

/// Register all hashing functions
pub fn register_hashing_functions(registry: &mut FunctionRegistry) {
    registry.register(HashFunction);
    registry.register(HashNameFunction);
    registry.register(HashPtIdFunction);
    registry.register(HashUidFunction);
}

/// MD5 digest of the UTF-8 bytes of `text`, read as an unsigned big-endian
/// integer and written in base 10
pub fn md5_decimal(text: &str) -> String {
    let digest = Md5::digest(text.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    u128::from_be_bytes(bytes).to_string()
}
