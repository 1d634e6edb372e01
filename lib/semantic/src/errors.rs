use ast::NodeId;
use ast::visitor::{Cancelled, DispatchError};
use error_manager::Category;
use interner::Symbol;
use span::Span;
use thiserror::Error;

use crate::types::{Type, TypeCastError};

/// Misuse of the annotation tables. It means there's a bug in
/// one of the passes, not in the program being compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("type of {node} was already resolved to {previous}")]
    AlreadyResolved { node: NodeId, previous: Type },
    #[error("type of {node} was already marked as unresolved")]
    AlreadyMarked { node: NodeId },
    #[error("type of {node} was resolved without being marked as unresolved")]
    NotMarked { node: NodeId },
    #[error("can't resolve the type of {node} to the unresolved type")]
    ResolveToUnresolved { node: NodeId },
    #[error("{node} is already bound to {previous}")]
    AlreadyBound { node: NodeId, previous: NodeId },
}

/// A failure that aborts the running pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    TypeCast(#[from] TypeCastError),
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticErrorKind {
    UnresolvedType,
    LValue,
    StopOutsideLoop,
    ReturnOutsideFunction,
    AssignToConst(Symbol),
    NonBooleanCondition(&'static str),
    Unary { op: &'static str, operand: Type },
    Binary { op: &'static str, left: Type, right: Type },
    NotAssignable { from: Type, to: Type },
    MismatchedReturn { expected: Type, found: Option<Type> },
    MismatchedArgsNum { expected: usize, received: usize },
    ArgumentType { index: usize, expected: Type, found: Type },
    NotAFunction(Symbol),
    NotAValue(Symbol),
    TypeTestOperand,
    IndexToNonList(Type),
    NonIntegerIndex(Type),
    AccessToNonClass(Type),
    NonExistingField { class: Symbol, field: Symbol },
    MismatchedListElems { expected: Type, found: Type },
}

impl SemanticErrorKind {
    pub fn category(&self) -> Category {
        match self {
            Self::UnresolvedType
            | Self::LValue
            | Self::StopOutsideLoop
            | Self::ReturnOutsideFunction => Category::Semantic,
            Self::AssignToConst(_) => Category::Modifier,
            Self::NonBooleanCondition(_)
            | Self::Unary { .. }
            | Self::Binary { .. }
            | Self::NotAssignable { .. }
            | Self::MismatchedReturn { .. }
            | Self::MismatchedArgsNum { .. }
            | Self::ArgumentType { .. }
            | Self::NotAFunction(_)
            | Self::NotAValue(_)
            | Self::TypeTestOperand
            | Self::IndexToNonList(_)
            | Self::NonIntegerIndex(_)
            | Self::AccessToNonClass(_)
            | Self::NonExistingField { .. }
            | Self::MismatchedListElems { .. } => Category::Type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub span: Span,
}

impl error_manager::Error for SemanticError {
    fn get_span(&self) -> Span { self.span }

    fn category(&self) -> Category { self.kind.category() }

    fn write_msg(&self, out: &mut dyn core::fmt::Write) -> core::fmt::Result {
        match &self.kind {
            SemanticErrorKind::UnresolvedType => {
                write!(out, "Couldn't infer the type of this expression")
            }
            SemanticErrorKind::LValue => write!(out, "Attempt to assign to non-lvalue"),
            SemanticErrorKind::StopOutsideLoop => write!(out, "\"stop\" outside of a loop"),
            SemanticErrorKind::ReturnOutsideFunction => {
                write!(out, "\"return\" outside of a function")
            }
            SemanticErrorKind::AssignToConst(name) => {
                write!(out, "Can't assign to constant '{name}'")
            }
            SemanticErrorKind::NonBooleanCondition(name) => {
                write!(out, "Non boolean condition on {name} statement")
            }
            SemanticErrorKind::Unary { op, operand } => {
                write!(out, "Can't apply operator '{op}' to {operand}")
            }
            SemanticErrorKind::Binary { op, left, right } => {
                write!(out, "Can't apply operator '{op}' between {left} and {right}")
            }
            SemanticErrorKind::NotAssignable { from, to } => {
                write!(out, "Can't assign a value of type {from} to {to}")
            }
            SemanticErrorKind::MismatchedReturn { expected, found: Some(found) } => {
                write!(out, "Mismatched return type. Expected {expected}, got {found}")
            }
            SemanticErrorKind::MismatchedReturn { expected, found: None } => {
                write!(out, "Missing return value. Expected {expected}")
            }
            SemanticErrorKind::MismatchedArgsNum { expected, received } => {
                write!(
                    out,
                    "Mismatched number of arguments on function call. Expected {expected} received {received}"
                )
            }
            SemanticErrorKind::ArgumentType { index, expected, found } => {
                write!(out, "Argument {index} should be {expected}, found {found}")
            }
            SemanticErrorKind::NotAFunction(name) => write!(out, "'{name}' is not a function"),
            SemanticErrorKind::NotAValue(name) => write!(out, "'{name}' can't be used as a value"),
            SemanticErrorKind::TypeTestOperand => {
                write!(out, "The right side of 'is' must be a class name")
            }
            SemanticErrorKind::IndexToNonList(ty) => {
                write!(out, "Attempt to index a non-list type {ty}")
            }
            SemanticErrorKind::NonIntegerIndex(ty) => {
                write!(out, "Attempt to index a list with a non-integer expression ({ty})")
            }
            SemanticErrorKind::AccessToNonClass(ty) => {
                write!(out, "Attempt to perform field access on a non-class type \"{ty}\"")
            }
            SemanticErrorKind::NonExistingField { class, field } => {
                write!(out, "Class {class} doesn't have a field named {field}")
            }
            SemanticErrorKind::MismatchedListElems { expected, found } => {
                write!(out, "Unexpected type on list literal. Expected {expected}, found {found}")
            }
        }
    }
}
