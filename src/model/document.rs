//! Arena-backed XML document
//!
//! Nodes live in a flat vector and refer to each other by [`NodeId`]. Detaching
//! a node unlinks it from its parent; the slot stays in the arena but is no longer
//! reachable from the document node.

use super::tree::PathTree;
use indexmap::IndexMap;

/// Handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of the node
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node variants of an XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node, parent of the root element
    Document,
    /// An element with its attributes in source order
    Element {
        /// Qualified tag name
        name: String,
        /// Attributes, unescaped
        attributes: IndexMap<String, String>,
    },
    /// Character data, unescaped
    Text(String),
    /// A CDATA section
    CData(String),
    /// A comment body
    Comment(String),
    /// A processing instruction body (target and content)
    ProcessingInstruction(String),
    /// A document type declaration body
    DocType(String),
}

/// The `<?xml ...?>` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    /// Version pseudo-attribute
    pub version: String,
    /// Encoding pseudo-attribute
    pub encoding: Option<String>,
    /// Standalone pseudo-attribute
    pub standalone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<NodeData>,
    declaration: Option<XmlDeclaration>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            declaration: None,
        }
    }

    /// The document node
    pub fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    /// The root element, if the document has one
    pub fn root_element(&self) -> Option<NodeId> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .find(|id| self.is_element(*id))
    }

    /// The XML declaration, if any
    pub fn declaration(&self) -> Option<&XmlDeclaration> {
        self.declaration.as_ref()
    }

    /// Set or clear the XML declaration
    pub fn set_declaration(&mut self, declaration: Option<XmlDeclaration>) {
        self.declaration = declaration;
    }

    /// Kind of a node
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Parent of a node; `None` for the document node and detached nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All children of a node, in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children of a node, in document order
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// Whether the node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element { .. })
    }

    /// Tag name of an element node
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Append a node of any kind under `parent`
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append a new empty element under `parent`
    pub fn append_element(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.append(
            parent,
            NodeKind::Element {
                name: name.into(),
                attributes: IndexMap::new(),
            },
        )
    }

    /// Concatenation of the direct text and CDATA children of a node
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[id.0].children {
            match &self.nodes[child.0].kind {
                NodeKind::Text(text) | NodeKind::CData(text) => out.push_str(text),
                _ => {}
            }
        }
        out
    }

    /// Replace all direct text and CDATA children with one text node.
    ///
    /// Child elements, comments and processing instructions keep their positions.
    pub fn set_text_content(&mut self, id: NodeId, value: &str) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        let (text, kept): (Vec<NodeId>, Vec<NodeId>) = children.into_iter().partition(|c| {
            matches!(
                self.nodes[c.0].kind,
                NodeKind::Text(_) | NodeKind::CData(_)
            )
        });
        for t in text {
            self.nodes[t.0].parent = None;
        }
        self.nodes[id.0].children = kept;
        self.append(id, NodeKind::Text(value.to_string()));
    }

    /// Attributes of an element node
    pub fn attributes(&self, id: NodeId) -> Option<&IndexMap<String, String>> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Value of one attribute
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)?.get(name).map(String::as_str)
    }

    /// Set or create an attribute; ignored on non-element nodes
    pub fn put_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Remove an attribute, keeping the order of the others
    pub fn delete_attribute(&mut self, id: NodeId, name: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            attributes.shift_remove(name);
        }
    }

    /// Unlink a node and its subtree from its parent
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// First element named `name` among the children of `parent`
    pub fn first_child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|c| self.name(*c) == Some(name))
    }
}

impl PathTree for Document {
    type Node = NodeId;
    type Address = String;

    fn start_node(&self) -> NodeId {
        self.document_node()
    }

    fn parse_address(&self, name: &str) -> Option<String> {
        (!name.is_empty()).then(|| name.to_string())
    }

    fn has_address(&self, node: NodeId, address: &String) -> bool {
        self.name(node) == Some(address.as_str())
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.child_elements(node)
    }

    fn create_child(&mut self, parent: NodeId, address: &String) -> Option<NodeId> {
        if parent == self.document_node() && self.root_element().is_some() {
            log::debug!("Cannot create a second root element <{address}>");
            return None;
        }
        Some(self.append_element(parent, address.clone()))
    }

    fn value(&self, node: NodeId) -> String {
        self.text_content(node)
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if node == self.document_node() {
            log::debug!("Ignoring value assigned to the document node");
            return;
        }
        self.set_text_content(node, value);
    }

    fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.get_attribute(node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.put_attribute(node, name, value);
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.delete_attribute(node, name);
    }
}
