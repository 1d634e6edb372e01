//! Abstract Syntax Tree
//!
//! This crate contains the syntax tree of the language and the
//! [visitor] mechanism every compiler pass is written against.
//!
//! All the nodes of a compilation unit live inside a [Tree], which owns
//! them. Nodes are addressed by [`NodeId`]s, and read through the
//! [`Node`] handle, which exposes the node's [kind](NodeKind), its
//! [span](Span), its ordered children and its parent.
//!
//! # Example
//! ```
//! use ast::{LitValue, Tree, ops::BinaryOperator};
//! use span::{Span, Spanned};
//!
//! let mut tree = Tree::new();
//! let one = tree.literal(LitValue::Int(1), Span::point(1, 1)).unwrap();
//! let two = tree.literal(LitValue::Int(2), Span::point(1, 5)).unwrap();
//! let plus = Spanned::new(BinaryOperator::Add, Span::point(1, 3));
//! let sum = tree.binary(one, plus, two, Span::point(1, 1)).unwrap();
//!
//! let sum = tree.node(sum);
//! assert_eq!(sum.n_children(), 3);
//! assert_eq!(sum.child(1).and_then(|op| op.binary_op()), Some(BinaryOperator::Add));
//! assert_eq!(tree.node(one).parent(), Some(sum));
//! ```

use core::fmt;

pub mod build;
pub mod kind;
pub mod ops;
pub mod tree;
pub mod visitor;

pub use interner::Symbol;
pub use kind::{Accepts, Family, NodeKind};
pub use span::Span;
pub use tree::{Node, NodeId, NodeList, Tree, TreeError};
pub use visitor::Visitor;

/// A name, plus the span where it was written
#[derive(Debug, Clone, Copy)]
pub struct Ident {
    pub sym: Symbol,
    pub span: Span,
}

impl Ident {
    pub fn new(name: &str, span: Span) -> Self {
        Self { sym: Symbol::new(name), span }
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.sym == other.sym
    }
}

#[derive(Clone, Debug)]
pub enum LitValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(Symbol),
}

impl PartialEq for LitValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

/// A single declaration modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Const,
    Static,
    Public,
    Private,
}

impl Modifier {
    const ALL: [Modifier; 4] = [Modifier::Const, Modifier::Static, Modifier::Public, Modifier::Private];

    const fn bit(self) -> u8 { 1 << self as u8 }

    pub const fn as_str(self) -> &'static str {
        match self {
            Modifier::Const => "const",
            Modifier::Static => "static",
            Modifier::Public => "public",
            Modifier::Private => "private",
        }
    }
}

/// The set of modifiers written on a declaration
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Modifiers(0);

    pub const fn of(m: Modifier) -> Self { Modifiers(m.bit()) }

    #[must_use]
    pub const fn with(self, m: Modifier) -> Self { Modifiers(self.0 | m.bit()) }

    pub const fn contains(self, m: Modifier) -> bool { self.0 & m.bit() != 0 }

    pub const fn is_empty(self) -> bool { self.0 == 0 }

    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl From<Modifier> for Modifiers {
    fn from(value: Modifier) -> Self { Modifiers::of(value) }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<T: IntoIterator<Item = Modifier>>(iter: T) -> Self {
        iter.into_iter().fold(Modifiers::NONE, Modifiers::with)
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Modifier::as_str)).finish()
    }
}

#[cfg(test)]
mod test;
