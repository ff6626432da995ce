//! Path matching
//!
//! Paths are `/`-separated segments: `name`, `name[n]`, `name[*]`, `*`,
//! `//name` for a descendant search, and a terminal `@attr`. Whitespace anywhere
//! in a path is ignored.

pub mod matcher;
pub mod segment;

pub use matcher::{Target, candidates, find, first_value, resolve};
pub use segment::{PathElement, Qualifier, Segment};
