//! Semantic information
//!
//! This crate holds the [type lattice](types), the [class table](classes)
//! and the annotation tables passes fill while they walk the tree.
//!
//! Annotations are not stored in the nodes. [Semantic] keeps them on side
//! tables keyed by [`NodeId`], so the tree stays immutable once it's built.
//!
//! Every node has two annotation slots:
//! - Its type, which goes from unset to [unresolved](Type::Unresolved), and
//!   then to a resolved type. Every node a pass resolves must have been
//!   marked first, so [`Semantic::unresolved_nodes`] sees all of them.
//! - Its symbol: the declaration that a name refers to.
//!
//! Both slots can only be written once.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;

use ast::NodeId;

pub mod classes;
pub mod errors;
pub mod rules;
pub mod type_lowering;
pub mod types;

pub use classes::ClassTable;
pub use errors::{AnnotationError, PassError};
pub use type_lowering::*;
pub use types::*;

/// State of the type slot of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeState {
    Unset,
    Unresolved,
    Resolved(Type),
}

#[derive(Default)]
pub struct Semantic {
    types: RefCell<HashMap<NodeId, Type>>,
    symbols: RefCell<HashMap<NodeId, NodeId>>,
    classes: RefCell<ClassTable>,
}

impl Semantic {
    pub fn new() -> Self { Self::default() }

    pub fn type_state(&self, node: NodeId) -> TypeState {
        match self.types.borrow().get(&node) {
            None => TypeState::Unset,
            Some(Type::Unresolved) => TypeState::Unresolved,
            Some(ty) => TypeState::Resolved(ty.clone()),
        }
    }

    /// Marks the type of `node` as pending
    pub fn mark_unresolved(&self, node: NodeId) -> Result<(), AnnotationError> {
        let mut types = self.types.borrow_mut();
        match types.get(&node) {
            None => {
                types.insert(node, Type::Unresolved);
                Ok(())
            }
            Some(Type::Unresolved) => Err(AnnotationError::AlreadyMarked { node }),
            Some(previous) => Err(AnnotationError::AlreadyResolved {
                node,
                previous: previous.clone(),
            }),
        }
    }

    /// Sets the type of `node`. This can only happen once, and only
    /// after the node was [marked](Semantic::mark_unresolved).
    pub fn resolve_type(&self, node: NodeId, ty: Type) -> Result<(), AnnotationError> {
        if ty.is_unresolved() {
            return Err(AnnotationError::ResolveToUnresolved { node });
        }
        let mut types = self.types.borrow_mut();
        match types.get(&node) {
            None => Err(AnnotationError::NotMarked { node }),
            Some(Type::Unresolved) => {
                tracing::debug!(%node, %ty, "type resolved");
                types.insert(node, ty);
                Ok(())
            }
            Some(previous) => Err(AnnotationError::AlreadyResolved {
                node,
                previous: previous.clone(),
            }),
        }
    }

    /// Gets the resolved type of `node`
    pub fn type_of(&self, node: NodeId) -> Option<Type> {
        match self.types.borrow().get(&node) {
            Some(Type::Unresolved) | None => None,
            Some(ty) => Some(ty.clone()),
        }
    }

    /// Nodes whose type is still unresolved, in ascending order
    pub fn unresolved_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .types
            .borrow()
            .iter()
            .filter(|(_, ty)| ty.is_unresolved())
            .map(|(node, _)| *node)
            .collect();
        nodes.sort_unstable();
        nodes
    }

    /// Links `node` with the declaration `decl`
    pub fn bind_symbol(&self, node: NodeId, decl: NodeId) -> Result<(), AnnotationError> {
        let mut symbols = self.symbols.borrow_mut();
        if let Some(previous) = symbols.get(&node) {
            return Err(AnnotationError::AlreadyBound { node, previous: *previous });
        }
        tracing::debug!(%node, %decl, "symbol bound");
        symbols.insert(node, decl);
        Ok(())
    }

    pub fn symbol_of(&self, node: NodeId) -> Option<NodeId> {
        self.symbols.borrow().get(&node).copied()
    }

    pub fn classes(&self) -> Ref<'_, ClassTable> { self.classes.borrow() }

    pub fn classes_mut(&self) -> RefMut<'_, ClassTable> { self.classes.borrow_mut() }
}
