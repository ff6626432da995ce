//! Tree abstraction shared by the path matcher and the anonymizer
//!
//! Both backends expose the same small surface: ordered child navigation,
//! name/tag matching, on-demand creation, and string values on elements and
//! attributes. The path matcher and expression evaluator only ever see a
//! `PathTree`, so one script engine drives XML documents and tag-keyed data sets
//! alike.

use std::fmt::Debug;

/// A mutable tree addressable by script paths
pub trait PathTree: Clone {
    /// Handle to one node of the tree
    type Node: Copy + Eq + Debug;

    /// A parsed segment name (an element name, a numeric tag, ...)
    type Address: Clone + Debug;

    /// Node that top-level path segments are resolved against
    fn start_node(&self) -> Self::Node;

    /// Parse a bare segment name. `None` means the name can never match.
    fn parse_address(&self, name: &str) -> Option<Self::Address>;

    /// Whether `node` is addressed by `address`
    fn has_address(&self, node: Self::Node, address: &Self::Address) -> bool;

    /// Addressable children of `node`, in document order
    fn child_nodes(&self, node: Self::Node) -> Vec<Self::Node>;

    /// All addressable descendants of `node` in document order, excluding `node`
    fn descendants(&self, node: Self::Node) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Self::Node> = self.child_nodes(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.child_nodes(next).into_iter().rev());
        }
        out
    }

    /// Append a new child addressed by `address`, or `None` if `parent` cannot
    /// hold one
    fn create_child(&mut self, parent: Self::Node, address: &Self::Address) -> Option<Self::Node>;

    /// Current value of an element node
    fn value(&self, node: Self::Node) -> String;

    /// Replace the value of an element node, leaving its child structure intact
    fn set_value(&mut self, node: Self::Node, value: &str);

    /// Detach `node` and its subtree
    fn remove(&mut self, node: Self::Node);

    /// Value of an attribute on `node`
    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Set or create an attribute on `node`
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// Remove an attribute from `node` if present
    fn remove_attribute(&mut self, node: Self::Node, name: &str);
}
