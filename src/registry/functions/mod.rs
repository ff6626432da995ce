//! Function implementations for anonymizer scripts

pub mod crypto;
pub mod datetime;
pub mod hashing;
pub mod identifiers;
pub mod tables;
pub mod text;

pub use crypto::*;
pub use datetime::*;
pub use hashing::*;
pub use identifiers::*;
pub use tables::*;
pub use text::*;
