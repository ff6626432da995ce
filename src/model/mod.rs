//! Trees the anonymizer rewrites
//!
//! [`Document`] is an arena XML tree read and written with quick-xml;
//! [`DataSet`] is a tag-keyed element list. Both implement [`PathTree`].

pub mod dataset;
pub mod document;
pub mod tree;
pub mod xml;

pub use dataset::{DataSet, DataSetAddress, DataSetNode, Tag};
pub use document::{Document, NodeId, NodeKind, XmlDeclaration};
pub use tree::PathTree;
