//! Immutable source trees and whole-subtree replacement
//!
//! A [`SourceTree`] is never mutated. Children are shared between tree
//! versions through `Arc`, and [`SourceTree::replace`] copies only the items
//! on the path from the root to the replaced node, so every earlier version
//! stays valid.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CompilationUnit, Item, ItemKind, MethodDecl, Parameter};

/// Identity of a node within one tree lineage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Id of a node built outside the parser and not yet inserted in a tree
    pub const DETACHED: NodeId = NodeId(u32::MAX);

    pub fn is_detached(self) -> bool {
        self == Self::DETACHED
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            write!(f, "#detached")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Position of a node: child indices from the compilation unit down.
///
/// Items are children of the unit, of namespaces and of types; parameters
/// are the children of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// `true` if `self` is a strict prefix of `other`
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(steps: Vec<usize>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        let steps: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", steps.join("/"))
    }
}

/// A borrowed view of an addressable node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Item(&'a Item),
    Parameter(&'a Parameter),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Item(item) => item.id,
            NodeRef::Parameter(param) => param.id,
        }
    }

    pub fn as_item(&self) -> Option<&'a Item> {
        match self {
            NodeRef::Item(item) => Some(item),
            NodeRef::Parameter(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&'a MethodDecl> {
        self.as_item().and_then(|item| item.as_method())
    }

    pub fn as_parameter(&self) -> Option<&'a Parameter> {
        match self {
            NodeRef::Parameter(param) => Some(param),
            NodeRef::Item(_) => None,
        }
    }

    pub fn is_method(&self) -> bool {
        self.as_method().is_some()
    }

    /// Children in source order
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match self {
            NodeRef::Item(item) => match &item.kind {
                ItemKind::Method(method) => method
                    .params
                    .iter()
                    .map(|p| NodeRef::Parameter(p.as_ref()))
                    .collect(),
                _ => item.items().iter().map(|i| NodeRef::Item(i.as_ref())).collect(),
            },
            NodeRef::Parameter(_) => vec![],
        }
    }

    /// Owned copy of the node, keeping its id
    pub fn to_node(&self) -> Node {
        match self {
            NodeRef::Item(item) => Node::Item((*item).clone()),
            NodeRef::Parameter(param) => Node::Parameter((*param).clone()),
        }
    }
}

/// An owned replacement node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Item(Item),
    Parameter(Parameter),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Item(item) => item.id,
            Node::Parameter(param) => param.id,
        }
    }

    pub fn set_id(&mut self, id: NodeId) {
        match self {
            Node::Item(item) => item.id = id,
            Node::Parameter(param) => param.id = id,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Node::Item(_) => "item",
            Node::Parameter(_) => "parameter",
        }
    }

    fn assign_ids(&mut self, next: &mut u32) -> Result<(), ReplaceError> {
        match self {
            Node::Item(item) => assign_item_ids(item, next),
            Node::Parameter(param) => assign_param_id(param, next),
        }
    }
}

impl From<Item> for Node {
    fn from(item: Item) -> Self {
        Node::Item(item)
    }
}

impl From<Parameter> for Node {
    fn from(param: Parameter) -> Self {
        Node::Parameter(param)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplaceError {
    #[error("cannot replace the compilation unit itself")]
    EmptyPath,

    #[error("no node at {path}")]
    InvalidPath { path: NodePath },

    #[error("cannot put a {found} where a {expected} is")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("no node ids left in this tree")]
    IdsExhausted,
}

/// An immutable parsed file
#[derive(Debug, Clone)]
pub struct SourceTree {
    unit: Arc<CompilationUnit>,
    path: Option<Arc<Path>>,
    next_id: u32,
}

impl SourceTree {
    /// Wrap a compilation unit, giving every detached node an id.
    ///
    /// Ids are handed out in pre-order, so for a freshly parsed unit they
    /// follow source order. When the ids already in use leave no room
    /// above them, the whole unit is renumbered from zero. A unit cannot
    /// hold more than `u32::MAX - 1` nodes; any beyond that stay detached.
    pub fn new(mut unit: CompilationUnit, path: Option<PathBuf>) -> Self {
        let mut next_id = max_id(&unit).map_or(0, |id| id.saturating_add(1));
        if assign_unit_ids(&mut unit, &mut next_id).is_err() {
            detach_unit(&mut unit);
            next_id = 0;
            if assign_unit_ids(&mut unit, &mut next_id).is_err() {
                next_id = NodeId::DETACHED.0;
            }
        }
        Self {
            unit: Arc::new(unit),
            path: path.map(Arc::from),
            next_id,
        }
    }

    pub fn unit(&self) -> &CompilationUnit {
        &self.unit
    }

    /// The file this tree was parsed from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(Arc::from(path.into()));
        self
    }

    /// The node at `path`, if there is one
    pub fn node(&self, path: &NodePath) -> Option<NodeRef<'_>> {
        let (&first, rest) = path.steps().split_first()?;
        let mut current = NodeRef::Item(self.unit.items.get(first)?.as_ref());
        for &step in rest {
            current = current.children().get(step).copied()?;
        }
        Some(current)
    }

    /// A new tree where the node at `path` is `node`.
    ///
    /// The replacement keeps its own id (the tracker stamps the id of the
    /// node it stands in for); detached nodes inside it get fresh ids.
    pub fn replace(&self, path: &NodePath, node: impl Into<Node>) -> Result<SourceTree, ReplaceError> {
        let mut node = node.into();
        let (&first, rest) = path.steps().split_first().ok_or(ReplaceError::EmptyPath)?;

        let mut next_id = self.next_id;
        node.assign_ids(&mut next_id)?;

        let mut unit = Arc::clone(&self.unit);
        let slot = Arc::make_mut(&mut unit)
            .items
            .get_mut(first)
            .ok_or_else(|| ReplaceError::InvalidPath { path: path.clone() })?;
        replace_in_item(slot, rest, node, path)?;

        Ok(SourceTree {
            unit,
            path: self.path.clone(),
            next_id,
        })
    }

    /// `true` if both trees share the same root allocation
    pub fn ptr_eq(&self, other: &SourceTree) -> bool {
        Arc::ptr_eq(&self.unit, &other.unit)
    }
}

impl PartialEq for SourceTree {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit
    }
}

fn replace_in_item(
    slot: &mut Arc<Item>,
    rest: &[usize],
    node: Node,
    full: &NodePath,
) -> Result<(), ReplaceError> {
    let Some((&index, tail)) = rest.split_first() else {
        return match node {
            Node::Item(item) => {
                *slot = Arc::new(item);
                Ok(())
            }
            other => Err(ReplaceError::KindMismatch {
                expected: "item",
                found: other.kind_name(),
            }),
        };
    };

    let invalid = || ReplaceError::InvalidPath { path: full.clone() };
    let item = Arc::make_mut(slot);

    if let ItemKind::Method(method) = &mut item.kind {
        if !tail.is_empty() {
            return Err(invalid());
        }
        let param = method.params.get_mut(index).ok_or_else(invalid)?;
        return match node {
            Node::Parameter(new_param) => {
                *param = Arc::new(new_param);
                Ok(())
            }
            other => Err(ReplaceError::KindMismatch {
                expected: "parameter",
                found: other.kind_name(),
            }),
        };
    }

    let child = item
        .items_mut()
        .and_then(|items| items.get_mut(index))
        .ok_or_else(invalid)?;
    replace_in_item(child, tail, node, full)
}

fn assign_unit_ids(unit: &mut CompilationUnit, next: &mut u32) -> Result<(), ReplaceError> {
    for item in &mut unit.items {
        if subtree_has_detached(item) {
            assign_item_ids(Arc::make_mut(item), next)?;
        }
    }
    Ok(())
}

fn assign_item_ids(item: &mut Item, next: &mut u32) -> Result<(), ReplaceError> {
    if item.id.is_detached() {
        item.id = fresh_id(next)?;
    }
    if let ItemKind::Method(method) = &mut item.kind {
        for param in &mut method.params {
            if param.id.is_detached() {
                assign_param_id(Arc::make_mut(param), next)?;
            }
        }
    }
    if let Some(children) = item.items_mut() {
        for child in children {
            if subtree_has_detached(child) {
                assign_item_ids(Arc::make_mut(child), next)?;
            }
        }
    }
    Ok(())
}

fn assign_param_id(param: &mut Parameter, next: &mut u32) -> Result<(), ReplaceError> {
    if param.id.is_detached() {
        param.id = fresh_id(next)?;
    }
    Ok(())
}

/// The next id, never [`NodeId::DETACHED`]
fn fresh_id(next: &mut u32) -> Result<NodeId, ReplaceError> {
    if *next >= NodeId::DETACHED.0 {
        return Err(ReplaceError::IdsExhausted);
    }
    let id = NodeId(*next);
    *next += 1;
    Ok(id)
}

fn detach_unit(unit: &mut CompilationUnit) {
    fn detach(item: &mut Item) {
        item.id = NodeId::DETACHED;
        if let ItemKind::Method(method) = &mut item.kind {
            for param in &mut method.params {
                Arc::make_mut(param).id = NodeId::DETACHED;
            }
        }
        if let Some(children) = item.items_mut() {
            for child in children {
                detach(Arc::make_mut(child));
            }
        }
    }
    for item in &mut unit.items {
        detach(Arc::make_mut(item));
    }
}

fn subtree_has_detached(item: &Item) -> bool {
    item.id.is_detached()
        || item
            .as_method()
            .is_some_and(|m| m.params.iter().any(|p| p.id.is_detached()))
        || item.items().iter().any(|child| subtree_has_detached(child))
}

fn max_id(unit: &CompilationUnit) -> Option<u32> {
    fn visit(item: &Item, max: &mut Option<u32>) {
        let mut note = |id: NodeId| {
            if !id.is_detached() {
                *max = Some(max.map_or(id.0, |m| m.max(id.0)));
            }
        };
        note(item.id);
        if let Some(method) = item.as_method() {
            for param in &method.params {
                note(param.id);
            }
        }
        for child in item.items() {
            visit(child, max);
        }
    }

    let mut max = None;
    for item in &unit.items {
        visit(item, &mut max);
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MethodBody, OtherDecl, Stmt, TypeDecl, TypeExpr};

    fn method(name: &str, params: &[&str]) -> Item {
        Item::new(ItemKind::Method(MethodDecl {
            modifiers: vec!["public".into()],
            return_type: TypeExpr::named("void"),
            name: name.into(),
            type_params: vec![],
            params: params
                .iter()
                .map(|p| Arc::new(Parameter::new(TypeExpr::named("int"), *p)))
                .collect(),
            constraints: vec![],
            body: MethodBody::None,
        }))
    }

    fn class(members: Vec<Item>) -> Item {
        Item::new(ItemKind::Type(TypeDecl {
            header: vec![],
            members: members.into_iter().map(Arc::new).collect(),
            trailing: vec![],
            has_body: true,
            semicolon: false,
        }))
    }

    fn sample_tree() -> SourceTree {
        let unit = CompilationUnit {
            items: vec![Arc::new(class(vec![method("a", &["x"]), method("b", &["y", "z"])]))],
            ..Default::default()
        };
        SourceTree::new(unit, None)
    }

    #[test]
    fn test_ids_follow_preorder() {
        let tree = sample_tree();
        let ids: Vec<u32> = [
            vec![0],
            vec![0, 0],
            vec![0, 0, 0],
            vec![0, 1],
            vec![0, 1, 0],
            vec![0, 1, 1],
        ]
        .into_iter()
        .map(|p| tree.node(&NodePath::from(p)).map(|n| n.id().index()).unwrap())
        .collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_replace_keeps_old_version() {
        let tree = sample_tree();
        let path = NodePath::from(vec![0, 0]);
        let replaced = tree.replace(&path, method("renamed", &[])).unwrap();

        assert_eq!(tree.node(&path).and_then(|n| n.as_method()).unwrap().name, "a");
        assert_eq!(replaced.node(&path).and_then(|n| n.as_method()).unwrap().name, "renamed");
        // The untouched sibling is shared, not copied
        let before = tree.unit().items[0].items()[1].clone();
        let after = replaced.unit().items[0].items()[1].clone();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_replace_assigns_fresh_ids() {
        let tree = sample_tree();
        let replaced = tree
            .replace(&NodePath::from(vec![0, 0]), method("c", &["p", "q"]))
            .unwrap();
        let node = replaced.node(&NodePath::from(vec![0, 0])).unwrap();
        assert!(!node.id().is_detached());
        assert!(node.id().index() >= 6);
        let children: Vec<NodeId> = node.children().iter().map(|c| c.id()).collect();
        assert_eq!(children.len(), 2);
        assert_ne!(children[0], children[1]);
    }

    #[test]
    fn test_replace_parameter() {
        let tree = sample_tree();
        let path = NodePath::from(vec![0, 1, 1]);
        let replaced = tree
            .replace(&path, Parameter::new(TypeExpr::named("string"), "w"))
            .unwrap();
        assert_eq!(replaced.node(&path).and_then(|n| n.as_parameter()).unwrap().name, "w");
    }

    #[test]
    fn test_replace_rejects_bad_paths() {
        let tree = sample_tree();
        assert_eq!(
            tree.replace(&NodePath::root(), method("x", &[])).unwrap_err(),
            ReplaceError::EmptyPath
        );
        assert!(matches!(
            tree.replace(&NodePath::from(vec![0, 7]), method("x", &[])),
            Err(ReplaceError::InvalidPath { .. })
        ));
        assert!(matches!(
            tree.replace(&NodePath::from(vec![0, 0]), Parameter::new(TypeExpr::named("int"), "p")),
            Err(ReplaceError::KindMismatch { .. })
        ));
        let other = Item::new(ItemKind::Other(OtherDecl {
            statements: vec![Stmt::Line(vec![])],
        }));
        assert!(matches!(
            tree.replace(&NodePath::from(vec![0, 0, 5]), other),
            Err(ReplaceError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_replace_refuses_when_ids_run_out() {
        let tree = SourceTree {
            next_id: u32::MAX - 1,
            ..sample_tree()
        };
        let path = NodePath::from(vec![0, 0]);
        // One fresh id fits, the second would collide with DETACHED
        assert!(tree.replace(&path, method("c", &[])).is_ok());
        assert_eq!(
            tree.replace(&path, method("c", &["p"])).unwrap_err(),
            ReplaceError::IdsExhausted
        );
    }

    #[test]
    fn test_new_renumbers_when_ids_run_out() {
        let mut high = method("high", &[]);
        high.id = NodeId(u32::MAX - 1);
        let unit = CompilationUnit {
            items: vec![Arc::new(class(vec![high, method("b", &["y"])]))],
            ..Default::default()
        };
        let tree = SourceTree::new(unit, None);
        let ids: Vec<u32> = [vec![0], vec![0, 0], vec![0, 1], vec![0, 1, 0]]
            .into_iter()
            .map(|p| tree.node(&NodePath::from(p)).map(|n| n.id().index()).unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
