//! Assembly trees and the traversal capability consumed by the converter.

use cadex_doc::Rgba;
use cadex_math::Location;
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from building an assembly tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// A node with this name already exists somewhere in the tree.
    ///
    /// Names key the converter's subassembly map, so they must be
    /// unique tree-wide, not just among siblings.
    #[error("duplicate assembly node name: {0}")]
    DuplicateName(String),

    /// The parent node id does not belong to this tree.
    #[error("unknown parent node")]
    UnknownParent,
}

/// Read-only view of an assembly tree.
///
/// Node ids are cheap copyable handles valid only for the tree that
/// produced them. [`AssemblyTree::traverse`] defines the build order
/// for document conversion: it yields every node exactly once, as
/// `(qualified name, node)` pairs, with each node's children appearing
/// strictly before the node itself. That ordering is what lets a
/// converter look up a child's already-built label while wiring its
/// parent.
pub trait AssemblyTree {
    /// Opaque geometry carried by leaf parts.
    type Shape: Clone;
    /// Handle identifying a node within this tree.
    type NodeId: Copy + Eq;

    /// The root node.
    fn root(&self) -> Self::NodeId;

    /// The node's qualified name, unique across the whole tree.
    fn name(&self, node: Self::NodeId) -> &str;

    /// The node's placement relative to its parent.
    fn loc(&self, node: Self::NodeId) -> &Location;

    /// The node's own color, if assigned.
    fn color(&self, node: Self::NodeId) -> Option<&Rgba>;

    /// The node's own shapes (not including children's).
    fn shapes(&self, node: Self::NodeId) -> &[Self::Shape];

    /// The node's direct children.
    fn children(&self, node: Self::NodeId) -> &[Self::NodeId];

    /// The node's parent, `None` for the root.
    fn parent(&self, node: Self::NodeId) -> Option<Self::NodeId>;

    /// Every node exactly once, children before parents.
    fn traverse(&self) -> Vec<(String, Self::NodeId)>;
}

new_key_type! {
    /// Handle to a node in an [`Assembly`].
    pub struct NodeKey;
}

#[derive(Debug)]
struct NodeData<S> {
    name: String,
    loc: Location,
    color: Option<Rgba>,
    shapes: Vec<S>,
    children: Vec<NodeKey>,
    parent: Option<NodeKey>,
}

/// An arena-backed assembly tree.
///
/// The canonical [`AssemblyTree`] implementation: nodes live in a
/// slotmap and reference each other by [`NodeKey`], which keeps parent
/// back-references trivial. Names are enforced unique at insertion.
#[derive(Debug)]
pub struct Assembly<S> {
    nodes: SlotMap<NodeKey, NodeData<S>>,
    by_name: HashMap<String, NodeKey>,
    root: NodeKey,
}

impl<S> Assembly<S> {
    /// Create a tree holding a single root node.
    pub fn new(
        name: impl Into<String>,
        shapes: Vec<S>,
        loc: Location,
        color: Option<Rgba>,
    ) -> Self {
        let name = name.into();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData {
            name: name.clone(),
            loc,
            color,
            shapes,
            children: Vec::new(),
            parent: None,
        });
        let mut by_name = HashMap::new();
        by_name.insert(name, root);
        Self {
            nodes,
            by_name,
            root,
        }
    }

    /// Add a child node under `parent` and return its key.
    pub fn add_child(
        &mut self,
        parent: NodeKey,
        name: impl Into<String>,
        shapes: Vec<S>,
        loc: Location,
        color: Option<Rgba>,
    ) -> Result<NodeKey, AssemblyError> {
        if !self.nodes.contains_key(parent) {
            return Err(AssemblyError::UnknownParent);
        }
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(AssemblyError::DuplicateName(name));
        }
        let child = self.nodes.insert(NodeData {
            name: name.clone(),
            loc,
            color,
            shapes,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent].children.push(child);
        self.by_name.insert(name, child);
        Ok(child)
    }

    /// Look up a node by name.
    pub fn find(&self, name: &str) -> Option<NodeKey> {
        self.by_name.get(name).copied()
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (never true; a tree always has a root).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn postorder(&self, node: NodeKey, out: &mut Vec<(String, NodeKey)>) {
        for &child in &self.nodes[node].children {
            self.postorder(child, out);
        }
        out.push((self.nodes[node].name.clone(), node));
    }
}

impl<S: Clone> AssemblyTree for Assembly<S> {
    type Shape = S;
    type NodeId = NodeKey;

    fn root(&self) -> NodeKey {
        self.root
    }

    fn name(&self, node: NodeKey) -> &str {
        &self.nodes[node].name
    }

    fn loc(&self, node: NodeKey) -> &Location {
        &self.nodes[node].loc
    }

    fn color(&self, node: NodeKey) -> Option<&Rgba> {
        self.nodes[node].color.as_ref()
    }

    fn shapes(&self, node: NodeKey) -> &[S] {
        &self.nodes[node].shapes
    }

    fn children(&self, node: NodeKey) -> &[NodeKey] {
        &self.nodes[node].children
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.nodes[node].parent
    }

    fn traverse(&self) -> Vec<(String, NodeKey)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.postorder(self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level() -> (Assembly<&'static str>, NodeKey, NodeKey) {
        let mut assy = Assembly::new("root", vec![], Location::identity(), None);
        let root = assy.root();
        let child = assy
            .add_child(root, "leg", vec!["cylinder"], Location::identity(), None)
            .unwrap();
        (assy, root, child)
    }

    #[test]
    fn builds_parent_child_links() {
        let (assy, root, child) = two_level();
        assert_eq!(assy.len(), 2);
        assert_eq!(assy.children(root), &[child]);
        assert_eq!(assy.parent(child), Some(root));
        assert_eq!(assy.parent(root), None);
        assert_eq!(assy.name(child), "leg");
        assert_eq!(assy.shapes(child), &["cylinder"]);
        assert_eq!(assy.find("leg"), Some(child));
    }

    #[test]
    fn duplicate_names_rejected_tree_wide() {
        let (mut assy, root, child) = two_level();
        assert_eq!(
            assy.add_child(root, "leg", vec![], Location::identity(), None),
            Err(AssemblyError::DuplicateName("leg".to_string()))
        );
        // Also across levels, not just among siblings
        assert_eq!(
            assy.add_child(child, "root", vec![], Location::identity(), None),
            Err(AssemblyError::DuplicateName("root".to_string()))
        );
        assert_eq!(assy.len(), 2);
    }

    #[test]
    fn unknown_parent_rejected() {
        let (mut assy, _, _) = two_level();
        assert_eq!(
            assy.add_child(NodeKey::default(), "x", vec![], Location::identity(), None),
            Err(AssemblyError::UnknownParent)
        );
    }

    #[test]
    fn traverse_visits_children_before_parents() {
        let mut assy: Assembly<&str> = Assembly::new("top", vec![], Location::identity(), None);
        let top = assy.root();
        let a = assy
            .add_child(top, "a", vec![], Location::identity(), None)
            .unwrap();
        assy.add_child(a, "a1", vec![], Location::identity(), None)
            .unwrap();
        assy.add_child(top, "b", vec![], Location::identity(), None)
            .unwrap();

        let order: Vec<String> = assy.traverse().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, ["a1", "a", "b", "top"]);

        // Every node's children appear before it
        for (name, node) in assy.traverse() {
            let pos = order.iter().position(|n| *n == name).unwrap();
            for &ch in assy.children(node) {
                let ch_pos = order.iter().position(|n| n == assy.name(ch)).unwrap();
                assert!(ch_pos < pos, "{} visited after its parent {name}", assy.name(ch));
            }
        }
    }
}
