//! Typing rules
//!
//! Each rule checks one construct of the language, reports the problems
//! it finds to the [`ErrorManager`] and computes its result. Rules read
//! the types of the nodes they look at from the [Semantic] tables, so the
//! operands of a construct must be typed before the rule is applied.

use ast::Node;
use error_manager::ErrorManager;

use crate::errors::{AnnotationError, SemanticError, SemanticErrorKind};
use crate::{Semantic, Type, TypeState};

pub mod expr;
pub mod stmt;

pub trait SemanticRule {
    type Result;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result;
}

/// Reads the type of a node that must be already resolved
///
/// If it isn't, reports it once and resolves it to [`Type::Error`],
/// so later reads of the same node don't report it again.
pub struct RequireResolved<'ast> {
    pub node: Node<'ast>,
}

impl SemanticRule for RequireResolved<'_> {
    type Result = Result<Type, AnnotationError>;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        match sem.type_state(self.node.id()) {
            TypeState::Resolved(ty) => Ok(ty),
            state @ (TypeState::Unset | TypeState::Unresolved) => {
                em.emit_error(SemanticError {
                    kind: SemanticErrorKind::UnresolvedType,
                    span: self.node.span(),
                });
                if state == TypeState::Unset {
                    sem.mark_unresolved(self.node.id())?;
                }
                sem.resolve_type(self.node.id(), Type::Error)?;
                Ok(Type::Error)
            }
        }
    }
}

pub(crate) fn type_of(
    node: Node<'_>,
    sem: &Semantic,
    em: &mut ErrorManager,
) -> Result<Type, AnnotationError> {
    RequireResolved { node }.apply(sem, em)
}
