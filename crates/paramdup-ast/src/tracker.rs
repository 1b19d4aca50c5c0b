//! Node tracking across successive tree versions
//!
//! Tracking a set of nodes yields a [`TrackedTree`] and one [`TrackedNode`]
//! handle per node. Replacing a tracked node produces a new version of the
//! same lineage in which the replacement inherits the node's identity, so
//! handles to the other tracked nodes keep resolving no matter in which
//! order the replacements happen.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::{Node, NodeId, NodePath, NodeRef, ReplaceError, SourceTree};

static NEXT_LINEAGE: AtomicU64 = AtomicU64::new(1);

/// Identity shared by a tracked tree and all versions derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lineage(u64);

impl Lineage {
    fn fresh() -> Self {
        Lineage(NEXT_LINEAGE.fetch_add(1, Ordering::Relaxed))
    }
}

/// A handle to a tracked node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedNode {
    lineage: Lineage,
    id: NodeId,
    path: NodePath,
}

impl TrackedNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("node {0} is not in the tree")]
    UnknownNode(NodeId),

    #[error("node {id} no longer exists at {path}")]
    Stale { id: NodeId, path: NodePath },

    #[error("handle for node {0} belongs to a different tree")]
    ForeignHandle(NodeId),

    #[error(transparent)]
    Replace(#[from] ReplaceError),
}

/// A tree version that can resolve [`TrackedNode`] handles
#[derive(Debug, Clone)]
pub struct TrackedTree {
    tree: SourceTree,
    lineage: Lineage,
}

/// Start tracking `ids` in `tree`.
///
/// Handles are returned in the order of `ids`.
pub fn track(
    tree: SourceTree,
    ids: impl IntoIterator<Item = NodeId>,
) -> Result<(TrackedTree, Vec<TrackedNode>), TrackError> {
    let lineage = Lineage::fresh();
    let index = tree.index();
    let handles = ids
        .into_iter()
        .map(|id| {
            let path = index.get(&id).cloned().ok_or(TrackError::UnknownNode(id))?;
            Ok(TrackedNode { lineage, id, path })
        })
        .collect::<Result<Vec<_>, TrackError>>()?;
    Ok((TrackedTree { tree, lineage }, handles))
}

impl TrackedTree {
    pub fn tree(&self) -> &SourceTree {
        &self.tree
    }

    pub fn into_tree(self) -> SourceTree {
        self.tree
    }

    /// The node `handle` stands for in this version.
    ///
    /// Fails with [`TrackError::Stale`] when the node was replaced by way of
    /// an ancestor, since the new ancestor no longer carries it.
    pub fn resolve(&self, handle: &TrackedNode) -> Result<NodeRef<'_>, TrackError> {
        if handle.lineage != self.lineage {
            return Err(TrackError::ForeignHandle(handle.id));
        }
        match self.tree.node(&handle.path) {
            Some(node) if node.id() == handle.id => Ok(node),
            _ => Err(TrackError::Stale {
                id: handle.id,
                path: handle.path.clone(),
            }),
        }
    }

    /// A new version where the node behind `handle` is `replacement`.
    ///
    /// The replacement takes over the handle's identity; this version is
    /// left untouched.
    pub fn replace(&self, handle: &TrackedNode, replacement: impl Into<Node>) -> Result<TrackedTree, TrackError> {
        self.resolve(handle)?;
        let mut node = replacement.into();
        node.set_id(handle.id);
        let tree = self.tree.replace(&handle.path, node)?;
        Ok(TrackedTree {
            tree,
            lineage: self.lineage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompilationUnit, Item, ItemKind, MethodBody, MethodDecl, Parameter, TypeDecl, TypeExpr};
    use std::sync::Arc;

    fn method(name: &str) -> Arc<Item> {
        Arc::new(Item::new(ItemKind::Method(MethodDecl {
            modifiers: vec![],
            return_type: TypeExpr::named("void"),
            name: name.to_string(),
            type_params: vec![],
            params: vec![Arc::new(Parameter::new(TypeExpr::named("int"), "x"))],
            constraints: vec![],
            body: MethodBody::None,
        })))
    }

    fn class(members: Vec<Arc<Item>>) -> Item {
        Item::new(ItemKind::Type(TypeDecl {
            header: vec![],
            members,
            trailing: vec![],
            has_body: true,
            semicolon: false,
        }))
    }

    fn sample() -> SourceTree {
        let unit = CompilationUnit {
            items: vec![Arc::new(class(vec![method("A"), method("B"), method("C")]))],
            ..Default::default()
        };
        SourceTree::new(unit, None)
    }

    fn renamed(tree: &TrackedTree, handle: &TrackedNode, name: &str) -> Item {
        let mut item = tree.resolve(handle).unwrap().as_item().unwrap().clone();
        if let ItemKind::Method(method) = &mut item.kind {
            method.name = name.to_string();
        }
        item
    }

    fn method_names(tree: &TrackedTree) -> Vec<String> {
        tree.tree()
            .methods()
            .iter()
            .filter_map(|m| m.as_method())
            .map(|m| m.name.clone())
            .collect()
    }

    #[test]
    fn test_handles_survive_replacement_in_any_order() {
        let tree = sample();
        let ids: Vec<NodeId> = tree.methods().iter().map(|m| m.id()).collect();
        let (mut tracked, handles) = track(tree, ids).unwrap();

        for i in [2, 0, 1] {
            let replacement = renamed(&tracked, &handles[i], &format!("M{}", i));
            tracked = tracked.replace(&handles[i], replacement).unwrap();
        }

        assert_eq!(method_names(&tracked), vec!["M0", "M1", "M2"]);
        for handle in &handles {
            assert!(tracked.resolve(handle).is_ok());
        }
    }

    #[test]
    fn test_old_version_unchanged() {
        let tree = sample();
        let ids: Vec<NodeId> = tree.methods().iter().map(|m| m.id()).collect();
        let (tracked, handles) = track(tree, ids).unwrap();

        let replacement = renamed(&tracked, &handles[0], "Renamed");
        let next = tracked.replace(&handles[0], replacement).unwrap();

        assert_eq!(method_names(&tracked), vec!["A", "B", "C"]);
        assert_eq!(method_names(&next), vec!["Renamed", "B", "C"]);
    }

    #[test]
    fn test_stale_after_ancestor_replaced() {
        let tree = sample();
        let class_id = tree.unit().items[0].id;
        let method_id = tree.methods()[1].id();
        let (tracked, handles) = track(tree, [class_id, method_id]).unwrap();

        let next = tracked.replace(&handles[0], class(vec![method("Z")])).unwrap();

        assert!(next.resolve(&handles[0]).is_ok());
        assert!(matches!(next.resolve(&handles[1]), Err(TrackError::Stale { .. })));
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let (first, handles) = track(sample(), Vec::new()).unwrap();
        assert!(handles.is_empty());

        let tree = sample();
        let id = tree.methods()[0].id();
        let (_, other_handles) = track(tree, [id]).unwrap();

        assert_eq!(
            first.resolve(&other_handles[0]).unwrap_err(),
            TrackError::ForeignHandle(id)
        );
    }

    #[test]
    fn test_unknown_node() {
        let err = track(sample(), [NodeId::DETACHED]).unwrap_err();
        assert_eq!(err, TrackError::UnknownNode(NodeId::DETACHED));
    }
}
