//! Reusable list of scene graph node handles

use crate::pool::Poolable;
use crate::scene::NodeHandle;

/// Growable list of node handles that keeps its allocation between uses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeList {
    nodes: Vec<NodeHandle>,
}

impl NodeList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node
    pub fn push(&mut self, node: NodeHandle) {
        self.nodes.push(node);
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove all nodes, keeping the allocation
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Nodes in insertion order
    pub fn as_slice(&self) -> &[NodeHandle] {
        &self.nodes
    }

    /// Iterate over the nodes
    pub fn iter(&self) -> std::slice::Iter<'_, NodeHandle> {
        self.nodes.iter()
    }

    /// Whether `node` is in the list
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.nodes.contains(&node)
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a NodeHandle;
    type IntoIter = std::slice::Iter<'a, NodeHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Poolable for NodeList {
    fn reset(&mut self) {
        self.clear();
    }
}
