//! Host render target.
//!
//! The engine never owns a real document. Regions (lists, conditionals)
//! manipulate nodes through [`HostTree`], which a host implements for its
//! own node type. [`MemoryTree`] is an arena-backed implementation used by
//! tests and headless hosts.

use std::cell::{Cell, RefCell};
use std::fmt;

/// The node operations regions need from a host.
///
/// Methods take `&self`; hosts are shared between regions and use interior
/// mutability.
pub trait HostTree {
    type Node: Clone + PartialEq + fmt::Debug;

    /// An invisible node marking a region's position.
    fn create_placeholder(&self, label: &str) -> Self::Node;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Insert `node` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. A node that is already attached is moved.
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>);

    /// Detach `node` from its parent. Detaching a detached node is a no-op.
    fn remove(&self, node: &Self::Node);

    /// Put `new` where `old` is and detach `old`.
    fn replace(&self, old: &Self::Node, new: &Self::Node);
}

/// Handle to a node in a [`MemoryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element(String),
    Text(String),
    Placeholder(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed host tree.
///
/// Nodes are never freed; removing a node only detaches it. Counters record
/// how many insertions and removals the regions performed.
#[derive(Default)]
pub struct MemoryTree {
    nodes: RefCell<Vec<NodeData>>,
    inserts: Cell<usize>,
    removals: Cell<usize>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(nodes.len() - 1)
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(tag.to_string()))
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    /// Append `child` to `parent`, moving it if attached elsewhere.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        self.insert_before(&parent, &child, None);
    }

    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[parent.0].children.clone()
    }

    /// Text content of a text node.
    pub fn text(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow()[node.0].kind {
            NodeKind::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Replace the content of a text node. Other nodes are left unchanged.
    pub fn set_text(&self, node: NodeId, text: &str) {
        if let NodeKind::Text(content) = &mut self.nodes.borrow_mut()[node.0].kind {
            *content = text.to_string();
        }
    }

    /// Short description of a node: element tag, text content, or the
    /// placeholder label in angle brackets.
    pub fn label(&self, node: NodeId) -> String {
        match &self.nodes.borrow()[node.0].kind {
            NodeKind::Element(tag) => tag.clone(),
            NodeKind::Text(text) => text.clone(),
            NodeKind::Placeholder(label) => format!("<{label}>"),
        }
    }

    /// Labels of every child of `parent`, in order.
    pub fn labels(&self, parent: NodeId) -> Vec<String> {
        self.children(parent)
            .into_iter()
            .map(|child| self.label(child))
            .collect()
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.get()
    }

    pub fn removal_count(&self) -> usize {
        self.removals.get()
    }

    pub fn reset_counters(&self) {
        self.inserts.set(0);
        self.removals.set(0);
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    fn detach(nodes: &mut [NodeData], node: NodeId) -> Option<usize> {
        let parent = nodes[node.0].parent.take()?;
        let siblings = &mut nodes[parent.0].children;
        let position = siblings.iter().position(|&child| child == node)?;
        siblings.remove(position);
        Some(position)
    }
}

impl HostTree for MemoryTree {
    type Node = NodeId;

    fn create_placeholder(&self, label: &str) -> NodeId {
        self.alloc(NodeKind::Placeholder(label.to_string()))
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let parent = nodes[node.0].parent?;
        let siblings = &nodes[parent.0].children;
        let position = siblings.iter().position(|child| child == node)?;
        siblings.get(position + 1).copied()
    }

    fn insert_before(&self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) {
        let mut nodes = self.nodes.borrow_mut();
        Self::detach(&mut nodes, *node);

        let siblings = &mut nodes[parent.0].children;
        let position = reference
            .and_then(|r| siblings.iter().position(|child| child == r))
            .unwrap_or(siblings.len());
        siblings.insert(position, *node);
        nodes[node.0].parent = Some(*parent);
        self.inserts.set(self.inserts.get() + 1);
    }

    fn remove(&self, node: &NodeId) {
        if Self::detach(&mut self.nodes.borrow_mut(), *node).is_some() {
            self.removals.set(self.removals.get() + 1);
        }
    }

    fn replace(&self, old: &NodeId, new: &NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        let Some(parent) = nodes[old.0].parent else {
            return;
        };
        Self::detach(&mut nodes, *new);
        let Some(position) = Self::detach(&mut nodes, *old) else {
            return;
        };
        nodes[parent.0].children.insert(position, *new);
        nodes[new.0].parent = Some(parent);
    }
}

impl fmt::Debug for MemoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTree")
            .field("nodes", &self.len())
            .field("inserts", &self.inserts.get())
            .field("removals", &self.removals.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_before_orders_children() {
        let tree = MemoryTree::new();
        let root = tree.create_element("ul");
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        let c = tree.create_text("c");

        tree.append_child(root, a);
        tree.append_child(root, c);
        tree.insert_before(&root, &b, Some(&c));

        assert_eq!(tree.labels(root), vec!["a", "b", "c"]);
        assert_eq!(tree.next_sibling(&a), Some(b));
        assert_eq!(tree.next_sibling(&c), None);
        assert_eq!(tree.parent(&b), Some(root));
    }

    #[test]
    fn inserting_attached_node_moves_it() {
        let tree = MemoryTree::new();
        let root = tree.create_element("ul");
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(root, a);
        tree.append_child(root, b);

        tree.insert_before(&root, &b, Some(&a));
        assert_eq!(tree.labels(root), vec!["b", "a"]);
    }

    #[test]
    fn remove_and_replace() {
        let tree = MemoryTree::new();
        let root = tree.create_element("div");
        let marker = tree.create_placeholder("if");
        let old = tree.create_text("old");
        let new = tree.create_text("new");
        tree.append_child(root, marker);
        tree.append_child(root, old);

        tree.replace(&old, &new);
        assert_eq!(tree.labels(root), vec!["<if>", "new"]);
        assert_eq!(tree.parent(&old), None);

        tree.remove(&new);
        tree.remove(&new);
        assert_eq!(tree.labels(root), vec!["<if>"]);
        assert_eq!(tree.removal_count(), 1);
    }
}
