//! Tree traversal and node queries

use std::collections::HashMap;

use crate::{NodeId, NodePath, NodeRef, SourceTree};

impl SourceTree {
    /// Visit every node in pre-order (document order) with its path.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&NodePath, NodeRef<'a>)) {
        for (index, item) in self.unit().items.iter().enumerate() {
            walk_node(NodePath::root().child(index), NodeRef::Item(item), &mut visit);
        }
    }

    /// All nodes satisfying `predicate`, in pre-order.
    pub fn find_all<'a>(&'a self, mut predicate: impl FnMut(NodeRef<'a>) -> bool) -> Vec<NodeRef<'a>> {
        let mut found = Vec::new();
        self.walk(|_, node| {
            if predicate(node) {
                found.push(node);
            }
        });
        found
    }

    /// Method declarations in document order, nested types included.
    pub fn methods(&self) -> Vec<NodeRef<'_>> {
        self.find_all(|node| node.is_method())
    }

    /// Map from node id to its current position.
    pub fn index(&self) -> HashMap<NodeId, NodePath> {
        let mut index = HashMap::new();
        self.walk(|path, node| {
            index.insert(node.id(), path.clone());
        });
        index
    }
}

fn walk_node<'a>(path: NodePath, node: NodeRef<'a>, visit: &mut impl FnMut(&NodePath, NodeRef<'a>)) {
    visit(&path, node);
    for (index, child) in node.children().into_iter().enumerate() {
        walk_node(path.child(index), child, visit);
    }
}
