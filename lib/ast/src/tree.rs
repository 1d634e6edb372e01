//! Node storage
//!
//! The [Tree] is an arena: it owns every node of a compilation unit,
//! and they are all dropped together. Parent links are plain [`NodeId`]s,
//! so they never own anything.

use core::fmt;
use core::ptr;

use span::Span;
use thiserror::Error;

use crate::kind::{Accepts, Family, NodeKind};
use crate::ops::{BinaryOperator, UnaryOperator};
use crate::visitor::{self, Visitor};

/// Identifies a node inside its [Tree]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const fn index(self) -> usize { self.0 }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} doesn't belong to this tree")]
    UnknownNode(NodeId),
    #[error("node {child} is already a child of {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },
    #[error("the root of the tree can't be attached to another node")]
    AttachRoot,
    #[error("attaching {child} to {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("{kind} node doesn't take any more children")]
    ShapeComplete { kind: &'static str },
    #[error("child {slot} of {kind} must be {expected}, found {found}")]
    WrongFamily {
        kind: &'static str,
        slot: usize,
        expected: Accepts,
        found: &'static str,
    },
    #[error("child {slot} of {kind} is required")]
    MissingChild { kind: &'static str, slot: usize },
    #[error("the root of the tree must be a Program node")]
    RootNotProgram,
    #[error("the root of the tree can't have a parent")]
    RootHasParent,
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    children: Vec<Option<NodeId>>,
    parent: Option<NodeId>,
}

/// Owns all the nodes of a syntax tree
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self { Self::default() }

    /// Creates a new node of the given kind, attaching `children` to it
    /// in order.
    ///
    /// Trailing optional slots that are not given are filled as absent.
    /// If the children don't fit the shape of `kind`, nothing is modified:
    /// the children that were already attached are released and the node
    /// is discarded.
    ///
    /// # Errors
    /// See [`Tree::attach_child`]. Also fails with
    /// [`TreeError::MissingChild`] if a required slot was left unfilled.
    pub fn alloc(
        &mut self,
        kind: NodeKind,
        span: Span,
        children: impl IntoIterator<Item = Option<NodeId>>,
    ) -> Result<NodeId, TreeError> {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            span,
            children: Vec::new(),
            parent: None,
        });

        let result = children
            .into_iter()
            .try_for_each(|child| self.attach_child(id, child))
            .and_then(|()| self.fill_optional_slots(id));

        if let Err(err) = result {
            self.discard(id);
            return Err(err);
        }

        tracing::trace!(node = %id, kind = self.nodes[id.0].kind.name(), "allocated node");
        Ok(id)
    }

    fn fill_optional_slots(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = &mut self.nodes[id.0];
        let shape = node.kind.shape();
        for slot in node.children.len()..shape.slots.len() {
            if !shape.slots[slot].optional {
                return Err(TreeError::MissingChild { kind: node.kind.name(), slot });
            }
            node.children.push(None);
        }
        Ok(())
    }

    /// Undoes a failed [`Tree::alloc`]. The node is always the last one.
    pub(crate) fn discard(&mut self, id: NodeId) {
        debug_assert_eq!(id.0 + 1, self.nodes.len());
        if let Some(data) = self.nodes.pop() {
            for child in data.children.into_iter().flatten() {
                self.nodes[child.0].parent = None;
            }
        }
    }

    /// Appends `child` to the next slot of `parent`
    ///
    /// A `None` child marks the slot as absent, which only
    /// optional slots allow.
    ///
    /// # Errors
    /// - [`TreeError::UnknownNode`] if any of the ids is not from this tree
    /// - [`TreeError::ShapeComplete`] if `parent` has no free slots
    /// - [`TreeError::MissingChild`] if `child` is `None` and the slot is required
    /// - [`TreeError::AttachRoot`] if `child` is the root of the tree
    /// - [`TreeError::AlreadyAttached`] if `child` already has a parent
    /// - [`TreeError::Cycle`] if `child` is `parent`, or one of its ancestors
    /// - [`TreeError::WrongFamily`] if the slot doesn't admit `child`'s kind
    pub fn attach_child(&mut self, parent: NodeId, child: Option<NodeId>) -> Result<(), TreeError> {
        let pdata = self.nodes.get(parent.0).ok_or(TreeError::UnknownNode(parent))?;
        let slot_index = pdata.children.len();
        let slot = pdata
            .kind
            .shape()
            .slot(slot_index)
            .ok_or(TreeError::ShapeComplete { kind: pdata.kind.name() })?;

        let Some(child) = child else {
            if !slot.optional {
                return Err(TreeError::MissingChild {
                    kind: pdata.kind.name(),
                    slot: slot_index,
                });
            }
            self.nodes[parent.0].children.push(None);
            return Ok(());
        };

        let cdata = self.nodes.get(child.0).ok_or(TreeError::UnknownNode(child))?;
        if self.root == Some(child) {
            return Err(TreeError::AttachRoot);
        }
        if let Some(other) = cdata.parent {
            return Err(TreeError::AlreadyAttached { child, parent: other });
        }
        if child == parent || self.node(parent).ancestors().any(|a| a.id == child) {
            return Err(TreeError::Cycle { parent, child });
        }
        if !slot.accepts.admits(&cdata.kind) {
            return Err(TreeError::WrongFamily {
                kind: pdata.kind.name(),
                slot: slot_index,
                expected: slot.accepts,
                found: cdata.kind.name(),
            });
        }

        self.nodes[parent.0].children.push(Some(child));
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Sets the root of the tree
    ///
    /// # Errors
    /// If `program` is not a parentless [Program](NodeKind::Program) node
    pub fn set_root(&mut self, program: NodeId) -> Result<(), TreeError> {
        let data = self.nodes.get(program.0).ok_or(TreeError::UnknownNode(program))?;
        if !matches!(data.kind, NodeKind::Program) {
            return Err(TreeError::RootNotProgram);
        }
        if data.parent.is_some() {
            return Err(TreeError::RootHasParent);
        }
        self.root = Some(program);
        Ok(())
    }

    pub fn root(&self) -> Option<Node<'_>> {
        self.root.map(|id| self.node(id))
    }

    /// Gets a handle to the node, if it's part of this tree
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.nodes.len()).then_some(Node { tree: self, id })
    }

    /// Gets a handle to the node
    ///
    /// # Panics
    /// If the node is not part of this tree
    pub fn node(&self, id: NodeId) -> Node<'_> {
        self.get(id).unwrap_or_else(|| unreachable!("node {id} is not part of this tree"))
    }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Iterates over every node of the tree, in allocation order
    pub fn iter(&self) -> impl Iterator<Item = Node<'_>> {
        (0..self.nodes.len()).map(|i| Node { tree: self, id: NodeId(i) })
    }

    fn data(&self, id: NodeId) -> &NodeData { &self.nodes[id.0] }
}

/// Read-only handle to a node of a [Tree]
#[derive(Clone, Copy)]
pub struct Node<'ast> {
    tree: &'ast Tree,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?} {}", self.kind().name(), self.id, self.span())
    }
}

impl<'ast> Node<'ast> {
    pub fn id(self) -> NodeId { self.id }

    pub fn tree(self) -> &'ast Tree { self.tree }

    pub fn kind(self) -> &'ast NodeKind { &self.tree.data(self.id).kind }

    pub fn span(self) -> Span { self.tree.data(self.id).span }

    pub fn family(self) -> Family { self.kind().family() }

    pub fn parent(self) -> Option<Node<'ast>> {
        self.tree.data(self.id).parent.map(|id| self.tree.node(id))
    }

    /// Iterates over the children of this node, in order. Absent
    /// children are yielded as `None`.
    pub fn children(self) -> impl ExactSizeIterator<Item = Option<Node<'ast>>> + 'ast {
        let tree = self.tree;
        tree.data(self.id)
            .children
            .iter()
            .map(move |c| c.map(|id| tree.node(id)))
    }

    /// Gets the i-th child. Returns `None` both if it's absent
    /// and if the node doesn't have that many children
    pub fn child(self, i: usize) -> Option<Node<'ast>> {
        self.tree
            .data(self.id)
            .children
            .get(i)
            .copied()
            .flatten()
            .map(|id| self.tree.node(id))
    }

    pub fn present_children(self) -> impl Iterator<Item = Node<'ast>> + 'ast {
        self.children().flatten()
    }

    /// Number of child slots, absent ones included
    pub fn n_children(self) -> usize { self.tree.data(self.id).children.len() }

    /// Iterates from this node's parent up to the root
    pub fn ancestors(self) -> impl Iterator<Item = Node<'ast>> + 'ast {
        core::iter::successors(self.parent(), |n| n.parent())
    }

    /// Gets the closest ancestor that matches `pred`
    pub fn enclosing(self, mut pred: impl FnMut(&NodeKind) -> bool) -> Option<Node<'ast>> {
        self.ancestors().find(|n| pred(n.kind()))
    }

    /// Position of this node among its parent's children
    pub fn index_in_parent(self) -> Option<usize> {
        let parent = self.parent()?;
        parent
            .tree
            .data(parent.id)
            .children
            .iter()
            .position(|c| *c == Some(self.id))
    }

    pub fn is_root(self) -> bool { self.tree.root == Some(self.id) }

    pub fn unary_op(self) -> Option<UnaryOperator> {
        match self.kind() {
            NodeKind::UnaryOp(op) => Some(*op),
            _ => None,
        }
    }

    pub fn binary_op(self) -> Option<BinaryOperator> {
        match self.kind() {
            NodeKind::BinaryOp(op) => Some(*op),
            _ => None,
        }
    }

    /// The display string of an operator leaf
    pub fn op_str(self) -> Option<&'static str> {
        match self.kind() {
            NodeKind::UnaryOp(op) => Some(op.as_str()),
            NodeKind::BinaryOp(op) => Some(op.as_str()),
            _ => None,
        }
    }

    /// Dispatches `v` on the runtime kind of this node
    pub fn accept<V: Visitor<'ast> + ?Sized>(self, v: &mut V) -> V::Result {
        visitor::accept(v, self)
    }

    /// The children of this node from position `start` onwards
    pub fn list_from(self, start: usize) -> NodeList<'ast> {
        let ids = &self.tree.data(self.id).children;
        NodeList {
            tree: self.tree,
            ids: ids.get(start..).unwrap_or_default(),
        }
    }
}

/// A run of sibling nodes
#[derive(Clone, Copy)]
pub struct NodeList<'ast> {
    tree: &'ast Tree,
    ids: &'ast [Option<NodeId>],
}

impl<'ast> NodeList<'ast> {
    /// Iterates over the present nodes of the list
    pub fn iter(self) -> impl Iterator<Item = Node<'ast>> + 'ast {
        let tree = self.tree;
        self.ids.iter().flatten().map(move |id| tree.node(*id))
    }

    pub fn len(self) -> usize { self.ids.len() }

    pub fn is_empty(self) -> bool { self.ids.is_empty() }

    pub fn get(self, i: usize) -> Option<Node<'ast>> {
        self.ids.get(i).copied().flatten().map(|id| self.tree.node(id))
    }
}

impl fmt::Debug for NodeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
