use core::fmt;

use ast::Modifier;
use error_manager::Category;
use interner::Symbol;
use span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentificationErrorKind {
    Undeclared(Symbol),
    UndeclaredClass(Symbol),
    UnknownType(Symbol),
    Redefinition { name: Symbol, what: &'static str },
    CyclicInheritance(Symbol),
    ConflictingModifiers(Modifier, Modifier),
    ModifierNotAllowed { modifier: Modifier, on: &'static str },
    ConstWithoutInit(Symbol),
}

impl IdentificationErrorKind {
    pub fn category(&self) -> Category {
        match self {
            Self::Undeclared(_)
            | Self::UndeclaredClass(_)
            | Self::UnknownType(_)
            | Self::Redefinition { .. } => Category::Scope,
            Self::CyclicInheritance(_) => Category::Semantic,
            Self::ConflictingModifiers(..)
            | Self::ModifierNotAllowed { .. }
            | Self::ConstWithoutInit(_) => Category::Modifier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationError {
    pub kind: IdentificationErrorKind,
    pub span: Span,
}

impl error_manager::Error for IdentificationError {
    fn get_span(&self) -> Span { self.span }

    fn category(&self) -> Category { self.kind.category() }

    fn write_msg(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        use IdentificationErrorKind as K;
        match &self.kind {
            K::Undeclared(name) => write!(out, "Undefined symbol '{name}'"),
            K::UndeclaredClass(name) => write!(out, "Undefined class '{name}'"),
            K::UnknownType(name) => write!(out, "Unknown type '{name}'"),
            K::Redefinition { name, what } => write!(out, "Redefinition of {what} '{name}'"),
            K::CyclicInheritance(name) => {
                write!(out, "Class '{name}' inherits from itself")
            }
            K::ConflictingModifiers(a, b) => write!(
                out,
                "Modifiers \"{}\" and \"{}\" can't be used together",
                a.as_str(),
                b.as_str()
            ),
            K::ModifierNotAllowed { modifier, on } => {
                write!(out, "Modifier \"{}\" is not allowed on {on}", modifier.as_str())
            }
            K::ConstWithoutInit(name) => {
                write!(out, "Constant '{name}' must be initialized")
            }
        }
    }
}
