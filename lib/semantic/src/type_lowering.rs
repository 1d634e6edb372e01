//! Type lowering
//!
//! Types written on the program are nodes of the tree, and hold no
//! semantic meaning by themselves.
//!
//! # Example
//! ```text
//! int foo() {
//!   int a;
//!   ...
//! }
//! ```
//!
//! In the example above, `foo`'s return type and `a`'s type are two
//! different `TypeName` nodes. Lowering maps both of them into the same
//! member of the lattice, [`Type::INT`].

use ast::{Node, NodeKind};

use crate::classes::ClassTable;
use crate::types::Type;

/// Maps a type node into the lattice
///
/// Builtin names lower to their scalar or discrete type, and the names
/// of declared classes to a class type. Unknown names, which the
/// identification pass already reported, lower to [`Type::Error`].
pub fn lower_type_node(node: Node<'_>, classes: &ClassTable) -> Type {
    match node.kind() {
        NodeKind::TypeName(name) => name
            .borrow(Type::builtin)
            .or_else(|| classes.contains(*name).then(|| Type::class(*name)))
            .unwrap_or(Type::Error),
        NodeKind::ListType => match node.child(0) {
            Some(elem) => Type::list(lower_type_node(elem, classes)),
            None => Type::Error,
        },
        kind => {
            tracing::warn!(node = %node.id(), kind = kind.name(), "lowering a non-type node");
            Type::Error
        }
    }
}

/// Types of the parameters and return value of a function
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub ret_ty: Type,
}

impl Signature {
    /// Lowers the signature of the given function declaration
    ///
    /// Every name on a parameter declaration counts as one parameter.
    pub fn of(func: Node<'_>, classes: &ClassTable) -> Option<Signature> {
        if !matches!(func.kind(), NodeKind::FuncDecl { .. }) {
            return None;
        }
        let ret_ty = func.child(0).map_or(Type::Error, |ty| lower_type_node(ty, classes));
        let mut params = Vec::new();
        for param in func.list_from(2).iter() {
            let NodeKind::VarDecl { names, .. } = param.kind() else { continue };
            let ty = param.child(0).map_or(Type::Error, |ty| lower_type_node(ty, classes));
            params.extend(names.iter().map(|_| ty.clone()));
        }
        Some(Signature { params, ret_ty })
    }
}

/// The declared type of a variable declaration
pub fn declared_type(decl: Node<'_>, classes: &ClassTable) -> Option<Type> {
    match decl.kind() {
        NodeKind::VarDecl { .. } => decl.child(0).map(|ty| lower_type_node(ty, classes)),
        _ => None,
    }
}
