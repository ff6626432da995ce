//! Tag-keyed data set in the style of a DICOM element list
//!
//! Elements are addressed by numeric tags written `(gggg,eeee)` or `ggggeeee`
//! and kept in ascending tag order within each level. A sequence element holds
//! items, addressed by the segment name `item`, and each item is itself a list of
//! elements. Data sets carry no attributes.

use super::tree::PathTree;
use std::fmt;

/// A (group, element) tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    /// Group number
    pub group: u16,
    /// Element number
    pub element: u16,
}

impl Tag {
    /// Create a tag from its group and element numbers
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Parse `(gggg,eeee)` or `ggggeeee` (hexadecimal, case-insensitive)
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (group, element) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            Some(inner) => inner.split_once(',')?,
            None if text.len() == 8 => text.split_at(4),
            None => return None,
        };
        if group.len() != 4 || element.len() != 4 {
            return None;
        }
        Some(Self {
            group: u16::from_str_radix(group, 16).ok()?,
            element: u16::from_str_radix(element, 16).ok()?,
        })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

/// Handle to a node in a [`DataSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataSetNode(usize);

/// Path address of a data set node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSetAddress {
    /// An element with this tag
    Tag(Tag),
    /// A sequence item
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Root,
    Element { tag: Tag, value: String },
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    entry: Entry,
    parent: Option<DataSetNode>,
    children: Vec<DataSetNode>,
}

/// A mutable tag-keyed data set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSet {
    slots: Vec<Slot>,
}

impl Default for DataSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSet {
    /// Create an empty data set
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                entry: Entry::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The top-level element list
    pub fn root(&self) -> DataSetNode {
        DataSetNode(0)
    }

    fn push(&mut self, parent: DataSetNode, entry: Entry, position: usize) -> DataSetNode {
        let id = DataSetNode(self.slots.len());
        self.slots.push(Slot {
            entry,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.slots[parent.0].children.insert(position, id);
        id
    }

    /// Insert an element under the root or an item, or overwrite the value of an
    /// existing element with the same tag. `None` if `parent` is an element.
    pub fn insert(
        &mut self,
        parent: DataSetNode,
        tag: Tag,
        value: impl Into<String>,
    ) -> Option<DataSetNode> {
        if matches!(self.slots[parent.0].entry, Entry::Element { .. }) {
            return None;
        }
        let value = value.into();
        if let Some(existing) = self.get(parent, tag) {
            self.set_element_value(existing, &value);
            return Some(existing);
        }
        let position = self.slots[parent.0]
            .children
            .iter()
            .position(|c| self.tag(*c).is_some_and(|t| t > tag))
            .unwrap_or(self.slots[parent.0].children.len());
        Some(self.push(parent, Entry::Element { tag, value }, position))
    }

    /// Append an item to a sequence element. `None` if `sequence` is not an element.
    pub fn add_item(&mut self, sequence: DataSetNode) -> Option<DataSetNode> {
        if !matches!(self.slots[sequence.0].entry, Entry::Element { .. }) {
            return None;
        }
        let position = self.slots[sequence.0].children.len();
        Some(self.push(sequence, Entry::Item, position))
    }

    /// Element with `tag` directly under `parent`
    pub fn get(&self, parent: DataSetNode, tag: Tag) -> Option<DataSetNode> {
        self.slots[parent.0]
            .children
            .iter()
            .copied()
            .find(|c| self.tag(*c) == Some(tag))
    }

    /// Tag of an element node
    pub fn tag(&self, node: DataSetNode) -> Option<Tag> {
        match self.slots[node.0].entry {
            Entry::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Whether the node is a sequence item
    pub fn is_item(&self, node: DataSetNode) -> bool {
        self.slots[node.0].entry == Entry::Item
    }

    /// Items of a sequence element, or elements of the root or an item
    pub fn children(&self, node: DataSetNode) -> &[DataSetNode] {
        &self.slots[node.0].children
    }

    /// Value of an element; empty for items and the root
    pub fn element_value(&self, node: DataSetNode) -> &str {
        match &self.slots[node.0].entry {
            Entry::Element { value, .. } => value,
            _ => "",
        }
    }

    fn set_element_value(&mut self, node: DataSetNode, new_value: &str) {
        match &mut self.slots[node.0].entry {
            Entry::Element { value, .. } => *value = new_value.to_string(),
            _ => log::debug!("Ignoring value on a non-element data set node"),
        }
    }

    /// Value of the element at a top-level tag
    pub fn value_of(&self, tag: Tag) -> Option<&str> {
        self.get(self.root(), tag).map(|n| self.element_value(n))
    }

    fn write_level(&self, f: &mut fmt::Formatter<'_>, node: DataSetNode, depth: usize) -> fmt::Result {
        for child in self.children(node) {
            match &self.slots[child.0].entry {
                Entry::Element { tag, value } => {
                    writeln!(f, "{:indent$}{tag} {value}", "", indent = depth * 2)?;
                }
                Entry::Item => writeln!(f, "{:indent$}item", "", indent = depth * 2)?,
                Entry::Root => {}
            }
            self.write_level(f, *child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_level(f, self.root(), 0)
    }
}

impl PathTree for DataSet {
    type Node = DataSetNode;
    type Address = DataSetAddress;

    fn start_node(&self) -> DataSetNode {
        self.root()
    }

    fn parse_address(&self, name: &str) -> Option<DataSetAddress> {
        if name.eq_ignore_ascii_case("item") {
            Some(DataSetAddress::Item)
        } else {
            Tag::parse(name).map(DataSetAddress::Tag)
        }
    }

    fn has_address(&self, node: DataSetNode, address: &DataSetAddress) -> bool {
        match address {
            DataSetAddress::Tag(tag) => self.tag(node) == Some(*tag),
            DataSetAddress::Item => self.is_item(node),
        }
    }

    fn child_nodes(&self, node: DataSetNode) -> Vec<DataSetNode> {
        self.children(node).to_vec()
    }

    fn create_child(
        &mut self,
        parent: DataSetNode,
        address: &DataSetAddress,
    ) -> Option<DataSetNode> {
        match address {
            DataSetAddress::Tag(tag) => {
                if self.get(parent, *tag).is_some() {
                    return None;
                }
                self.insert(parent, *tag, "")
            }
            DataSetAddress::Item => self.add_item(parent),
        }
    }

    fn value(&self, node: DataSetNode) -> String {
        self.element_value(node).to_string()
    }

    fn set_value(&mut self, node: DataSetNode, value: &str) {
        self.set_element_value(node, value);
    }

    fn remove(&mut self, node: DataSetNode) {
        if let Some(parent) = self.slots[node.0].parent.take() {
            self.slots[parent.0].children.retain(|c| *c != node);
        }
    }

    fn attribute(&self, _node: DataSetNode, _name: &str) -> Option<String> {
        None
    }

    fn set_attribute(&mut self, _node: DataSetNode, name: &str, _value: &str) {
        log::debug!("Data set elements have no attributes; ignoring @{name}");
    }

    fn remove_attribute(&mut self, _node: DataSetNode, _name: &str) {}
}
