//! Path resolution over a [`PathTree`]
//!
//! Resolution never fails: a segment with no match (an unresolved name, an index
//! past the last match, a malformed qualifier) ends that branch silently unless
//! the caller asked for missing elements to be created.

use super::segment::{PathElement, Qualifier, Segment};
use crate::model::PathTree;

/// A resolved path target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<N> {
    /// An element node
    Element(N),
    /// An attribute of an element, which may not exist yet
    Attribute {
        /// Element carrying the attribute
        owner: N,
        /// Attribute name
        name: String,
    },
}

impl<N: Copy> Target<N> {
    /// Whether the target is present in the tree
    pub fn exists<T: PathTree<Node = N>>(&self, tree: &T) -> bool {
        match self {
            Target::Element(_) => true,
            Target::Attribute { owner, name } => tree.attribute(*owner, name).is_some(),
        }
    }

    /// Current value; a missing attribute has no value
    pub fn value<T: PathTree<Node = N>>(&self, tree: &T) -> Option<String> {
        match self {
            Target::Element(node) => Some(tree.value(*node)),
            Target::Attribute { owner, name } => tree.attribute(*owner, name),
        }
    }

    /// Replace the value of an element or set the attribute
    pub fn set<T: PathTree<Node = N>>(&self, tree: &mut T, value: &str) {
        match self {
            Target::Element(node) => tree.set_value(*node, value),
            Target::Attribute { owner, name } => tree.set_attribute(*owner, name, value),
        }
    }

    /// Detach an element with its subtree, or remove only the attribute
    pub fn remove<T: PathTree<Node = N>>(&self, tree: &mut T) {
        match self {
            Target::Element(node) => tree.remove(*node),
            Target::Attribute { owner, name } => tree.remove_attribute(*owner, name),
        }
    }
}

fn select<N: Copy>(matches: Vec<N>, qualifier: Qualifier, descendant: bool) -> Vec<N> {
    match qualifier {
        Qualifier::All => matches,
        Qualifier::None if descendant => matches,
        Qualifier::None => matches.into_iter().take(1).collect(),
        Qualifier::Index(n) => matches.get(n).copied().into_iter().collect(),
        Qualifier::Malformed => Vec::new(),
    }
}

/// Nodes matching the leading segment of `element`, in document order.
///
/// A plain `name` selects only the first matching child. `name[*]` and `*`
/// select every match, and `//name` every matching descendant unless it
/// carries an index.
pub fn candidates<T: PathTree>(tree: &T, element: &PathElement<T::Node>) -> Vec<T::Node> {
    match &element.segment {
        Segment::End | Segment::Attribute(_) => Vec::new(),
        Segment::Wildcard => tree.child_nodes(element.node),
        Segment::Named {
            name,
            descendant,
            qualifier,
        } => {
            let Some(address) = tree.parse_address(name) else {
                log::debug!("Segment name '{name}' cannot address a node");
                return Vec::new();
            };
            let pool = if *descendant {
                tree.descendants(element.node)
            } else {
                tree.child_nodes(element.node)
            };
            let matches: Vec<T::Node> = pool
                .into_iter()
                .filter(|n| tree.has_address(*n, &address))
                .collect();
            let selected = select(matches, *qualifier, *descendant);
            if selected.is_empty() && matches!(qualifier, Qualifier::Index(_)) {
                log::debug!("No match for index qualifier in '{}'", element.segment);
            }
            selected
        }
    }
}

fn terminal<N: Copy>(element: &PathElement<N>) -> Option<Target<N>> {
    match &element.segment {
        Segment::End => Some(Target::Element(element.node)),
        Segment::Attribute(name) if !name.is_empty() => Some(Target::Attribute {
            owner: element.node,
            name: name.clone(),
        }),
        Segment::Attribute(_) => {
            log::debug!("Ignoring attribute segment without a name");
            None
        }
        _ => None,
    }
}

/// Resolve `path` from `start`, creating missing elements when `required`.
///
/// Targets are returned in document order. Only named segments can be
/// created; a required element is appended as the last child of its parent.
pub fn resolve<T: PathTree>(
    tree: &mut T,
    start: T::Node,
    path: &str,
    required: bool,
) -> Vec<Target<T::Node>> {
    let mut out = Vec::new();
    resolve_into(tree, PathElement::new(start, path), required, &mut out);
    out
}

fn resolve_into<T: PathTree>(
    tree: &mut T,
    element: PathElement<T::Node>,
    required: bool,
    out: &mut Vec<Target<T::Node>>,
) {
    if let Some(target) = terminal(&element) {
        out.push(target);
        return;
    }
    if matches!(element.segment, Segment::End | Segment::Attribute(_)) {
        return;
    }

    let found = candidates(tree, &element);
    if found.is_empty() {
        if required {
            if let Some(child) = create(tree, &element) {
                resolve_into(tree, element.descend(child), required, out);
            }
        } else {
            log::debug!("Unresolved path segment '{}'", element.segment);
        }
        return;
    }
    for node in found {
        resolve_into(tree, element.descend(node), required, out);
    }
}

fn create<T: PathTree>(tree: &mut T, element: &PathElement<T::Node>) -> Option<T::Node> {
    let Segment::Named { name, .. } = &element.segment else {
        log::debug!("Cannot create a node for segment '{}'", element.segment);
        return None;
    };
    let address = tree.parse_address(name)?;
    tree.create_child(element.node, &address)
}

/// Resolve `path` from `start` without modifying the tree
pub fn find<T: PathTree>(tree: &T, start: T::Node, path: &str) -> Vec<Target<T::Node>> {
    let mut out = Vec::new();
    let mut pending = vec![PathElement::new(start, path)];
    while let Some(element) = pending.pop() {
        if let Some(target) = terminal(&element) {
            out.push(target);
            continue;
        }
        let found = candidates(tree, &element);
        pending.extend(found.into_iter().rev().map(|n| element.descend(n)));
    }
    out
}

/// Value of `path` following only the first matching node at every step.
///
/// A later match is never consulted, even when the first one lacks the
/// requested attribute or child.
pub fn first_value<T: PathTree>(tree: &T, path: &str) -> Option<String> {
    let mut element = PathElement::new(tree.start_node(), path);
    loop {
        if let Some(target) = terminal(&element) {
            return target.value(tree);
        }
        let node = candidates(tree, &element).first().copied()?;
        element = element.descend(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn doc(xml: &str) -> Document {
        Document::parse(xml).unwrap()
    }

    fn values(d: &Document, path: &str) -> Vec<String> {
        find(d, d.start_node(), path)
            .iter()
            .filter_map(|t| t.value(d))
            .collect()
    }

    #[test]
    fn test_index_selection() {
        let d = doc("<r><a>1</a><b>x</b><a>2</a></r>");
        assert_eq!(values(&d, "/r/a[0]"), vec!["1"]);
        assert_eq!(values(&d, "/r/a[1]"), vec!["2"]);
        assert!(values(&d, "/r/a[2]").is_empty());
    }

    #[test]
    fn test_plain_name_selects_first_match() {
        let d = doc("<r><a>1</a><a>2</a></r>");
        assert_eq!(values(&d, "/r/a"), vec!["1"]);
        assert_eq!(values(&d, "/r/a[*]"), vec!["1", "2"]);
    }

    #[test]
    fn test_wildcard_keeps_document_order() {
        let d = doc("<r><a>1</a><b>2</b><c>3</c></r>");
        assert_eq!(values(&d, "/r/*"), vec!["1", "2", "3"]);
        assert_eq!(values(&d, "/*"), vec![""]);
    }

    #[test]
    fn test_descendant_search() {
        let d = doc("<r><x><n>1</n></x><n>2</n><y><z><n>3</n></z></y></r>");
        assert_eq!(values(&d, "/r//n"), vec!["1", "2", "3"]);
        assert_eq!(values(&d, "/r//n[2]"), vec!["3"]);
        assert_eq!(values(&d, "//n"), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_malformed_qualifier_matches_nothing() {
        let d = doc("<r><a>1</a></r>");
        assert!(values(&d, "/r/a[first]").is_empty());
    }

    #[test]
    fn test_attribute_targets() {
        let d = doc("<r><e id=\"7\"/><e/></r>");
        let targets = find(&d, d.start_node(), "/r/e[*]/@id");
        assert_eq!(targets.len(), 2);
        assert!(targets[0].exists(&d));
        assert!(!targets[1].exists(&d));
        assert_eq!(first_value(&d, "/r/e[*]/@id").as_deref(), Some("7"));
    }

    #[rstest]
    #[case("<r><e/><e id=\"7\"/></r>", "/r/e[*]/@id", None)]
    #[case("<r><a/><b><n>SECRET</n></b></r>", "/r/*/n", None)]
    #[case("<r><a><n>1</n></a><a><n>2</n></a></r>", "/r/a[*]/n", Some("1"))]
    #[case("<r><a>1</a><a>2</a></r>", "/r/a[1]", Some("2"))]
    #[case("<r><x><n>1</n></x><n>2</n></r>", "/r//n", Some("1"))]
    #[case("<r><x/><x><n>2</n></x></r>", "/r//x/n", None)]
    fn test_first_value_follows_first_match(
        #[case] xml: &str,
        #[case] path: &str,
        #[case] expected: Option<&str>,
    ) {
        let d = doc(xml);
        assert_eq!(first_value(&d, path).as_deref(), expected);
    }

    #[test]
    fn test_required_creates_missing_elements() {
        let mut d = doc("<r/>");
        let start = d.start_node();
        let targets = resolve(&mut d, start, "/r/missing/deeper/@x", true);
        assert_eq!(targets.len(), 1);
        targets[0].set(&mut d, "v");
        assert_eq!(
            d.to_xml_string().unwrap(),
            "<r><missing><deeper x=\"v\"/></missing></r>"
        );
    }

    #[test]
    fn test_unrequired_missing_path_is_empty() {
        let mut d = doc("<r/>");
        let start = d.start_node();
        assert!(resolve(&mut d, start, "/r/missing/@x", false).is_empty());
        assert_eq!(d.to_xml_string().unwrap(), "<r/>");
    }

    #[test]
    fn test_first_value_of_unresolved_path() {
        let d = doc("<r/>");
        assert_eq!(first_value(&d, "/r/none"), None);
    }
}
