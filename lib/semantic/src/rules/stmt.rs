use ast::{Modifier, Node, NodeKind};
use error_manager::ErrorManager;
use span::Span;

use super::expr::Lvalue;
use super::{SemanticRule, type_of};
use crate::errors::{AnnotationError, SemanticError, SemanticErrorKind};
use crate::type_lowering::lower_type_node;
use crate::{Semantic, Type};

/// Conditions of `while` and `if` statements must be booleans
pub struct ValidateCondition<'ast> {
    pub cond: Node<'ast>,
    pub construct: &'static str,
}

impl SemanticRule for ValidateCondition<'_> {
    type Result = Result<(), AnnotationError>;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        let ty = type_of(self.cond, sem, em)?;
        if !ty.is_error() && !ty.is_boolean() {
            em.emit_error(SemanticError {
                kind: SemanticErrorKind::NonBooleanCondition(self.construct),
                span: self.cond.span(),
            });
        }
        Ok(())
    }
}

/// Checks the initializer of a variable declaration, and
/// returns the declared type
pub struct ValidateVarDecl<'ast> {
    pub ty: Node<'ast>,
    pub init: Option<Node<'ast>>,
}

impl SemanticRule for ValidateVarDecl<'_> {
    type Result = Result<Type, AnnotationError>;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        let declared = lower_type_node(self.ty, &sem.classes());
        if let Some(init) = self.init {
            let found = type_of(init, sem, em)?;
            if !found.assignable_to(&declared, &*sem.classes()) {
                em.emit_error(SemanticError {
                    kind: SemanticErrorKind::NotAssignable { from: found, to: declared.clone() },
                    span: init.span(),
                });
            }
        }
        Ok(declared)
    }
}

pub struct ValidateAssignment<'ast> {
    pub target: Node<'ast>,
    pub value: Node<'ast>,
    pub span: Span,
}

impl ValidateAssignment<'_> {
    /// The name of the constant that `target` refers to, if any
    fn assigned_const(&self, sem: &Semantic) -> Option<interner::Symbol> {
        let NodeKind::Ident(name) = self.target.kind() else { return None };
        let decl = self.target.tree().node(sem.symbol_of(self.target.id())?);
        match decl.kind() {
            NodeKind::VarDecl { modifiers, .. } if modifiers.contains(Modifier::Const) => {
                Some(*name)
            }
            _ => None,
        }
    }
}

impl SemanticRule for ValidateAssignment<'_> {
    type Result = Result<(), AnnotationError>;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        if !self.target.is_lvalue() {
            em.emit_error(SemanticError {
                kind: SemanticErrorKind::LValue,
                span: self.target.span(),
            });
        } else if let Some(name) = self.assigned_const(sem) {
            em.emit_error(SemanticError {
                kind: SemanticErrorKind::AssignToConst(name),
                span: self.target.span(),
            });
        }

        let target = type_of(self.target, sem, em)?;
        let value = type_of(self.value, sem, em)?;

        if !value.assignable_to(&target, &*sem.classes()) {
            em.emit_error(SemanticError {
                kind: SemanticErrorKind::NotAssignable { from: value, to: target },
                span: self.span,
            });
        }
        Ok(())
    }
}

pub struct CheckReturnStmt<'ast> {
    /// The function this statement returns from
    pub func: Option<Node<'ast>>,
    pub value: Option<Node<'ast>>,
    pub span: Span,
}

impl SemanticRule for CheckReturnStmt<'_> {
    type Result = Result<(), AnnotationError>;

    fn apply(&self, sem: &Semantic, em: &mut ErrorManager) -> Self::Result {
        let found = self.value.map(|v| type_of(v, sem, em)).transpose()?;

        let Some(func) = self.func else {
            em.emit_error(SemanticError {
                kind: SemanticErrorKind::ReturnOutsideFunction,
                span: self.span,
            });
            return Ok(());
        };

        let expected = func
            .child(0)
            .map_or(Type::Error, |ty| lower_type_node(ty, &sem.classes()));

        let ok = expected.is_error()
            || found
                .as_ref()
                .is_some_and(|found| found.assignable_to(&expected, &*sem.classes()));

        if !ok {
            em.emit_error(SemanticError {
                kind: SemanticErrorKind::MismatchedReturn { expected, found },
                span: self.span,
            });
        }
        Ok(())
    }
}
