//! Node kinds
//!
//! [`NodeKind`] is the closed set of syntactic constructs. Besides its
//! leaf payload, every kind fixes the *shape* of its children: an
//! ordered list of slots, each of them admitting a given family of
//! nodes, optionally followed by a repeated trailing slot.

use core::fmt;

use interner::Symbol;

use crate::ops::{BinaryOperator, UnaryOperator};
use crate::{Ident, LitValue, Modifiers};

/// The disjoint families nodes are grouped into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Program,
    Declaration,
    Expression,
    Statement,
    Operator,
    Type,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program,

    /* Declarations */
    VarDecl { modifiers: Modifiers, names: Box<[Ident]> },
    FuncDecl { name: Ident, modifiers: Modifiers },
    ClassDecl { name: Ident, superclass: Option<Ident> },

    /* Expressions */
    Unary,
    Binary,
    Literal(LitValue),
    Ident(Symbol),
    Call { callee: Ident },
    New { class: Ident },
    Member { field: Ident },
    Index,
    ListLit,

    /* Statements */
    Block,
    While,
    If,
    Stop,
    Return,
    ExprStmt,
    Assign,

    /* Operators */
    UnaryOp(UnaryOperator),
    BinaryOp(BinaryOperator),

    /* Types */
    TypeName(Symbol),
    ListType,
}

impl NodeKind {
    pub const fn name(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::VarDecl { .. } => "VarDecl",
            NodeKind::FuncDecl { .. } => "FuncDecl",
            NodeKind::ClassDecl { .. } => "ClassDecl",
            NodeKind::Unary => "Unary",
            NodeKind::Binary => "Binary",
            NodeKind::Literal(_) => "Literal",
            NodeKind::Ident(_) => "Ident",
            NodeKind::Call { .. } => "Call",
            NodeKind::New { .. } => "New",
            NodeKind::Member { .. } => "Member",
            NodeKind::Index => "Index",
            NodeKind::ListLit => "ListLit",
            NodeKind::Block => "Block",
            NodeKind::While => "While",
            NodeKind::If => "If",
            NodeKind::Stop => "Stop",
            NodeKind::Return => "Return",
            NodeKind::ExprStmt => "ExprStmt",
            NodeKind::Assign => "Assign",
            NodeKind::UnaryOp(_) => "UnaryOp",
            NodeKind::BinaryOp(_) => "BinaryOp",
            NodeKind::TypeName(_) => "TypeName",
            NodeKind::ListType => "ListType",
        }
    }

    pub const fn family(&self) -> Family {
        match self {
            NodeKind::Program => Family::Program,
            NodeKind::VarDecl { .. } | NodeKind::FuncDecl { .. } | NodeKind::ClassDecl { .. } => {
                Family::Declaration
            }
            NodeKind::Unary
            | NodeKind::Binary
            | NodeKind::Literal(_)
            | NodeKind::Ident(_)
            | NodeKind::Call { .. }
            | NodeKind::New { .. }
            | NodeKind::Member { .. }
            | NodeKind::Index
            | NodeKind::ListLit => Family::Expression,
            NodeKind::Block
            | NodeKind::While
            | NodeKind::If
            | NodeKind::Stop
            | NodeKind::Return
            | NodeKind::ExprStmt
            | NodeKind::Assign => Family::Statement,
            NodeKind::UnaryOp(_) | NodeKind::BinaryOp(_) => Family::Operator,
            NodeKind::TypeName(_) | NodeKind::ListType => Family::Type,
        }
    }

    pub(crate) const fn shape(&self) -> Shape {
        use Accepts as A;
        /* Plain struct literals, so the slot arrays get promoted to 'static */
        macro_rules! req {
            ($a:expr) => { Slot { accepts: $a, optional: false } };
        }
        macro_rules! opt {
            ($a:expr) => { Slot { accepts: $a, optional: true } };
        }

        match self {
            NodeKind::Program => Shape::list(A::Declaration),
            NodeKind::VarDecl { .. } => Shape::fixed(&[req!(A::Type), opt!(A::Expression)]),
            NodeKind::FuncDecl { .. } => Shape {
                slots: &[req!(A::Type), req!(A::Block)],
                rest: Some(A::Parameter),
            },
            NodeKind::ClassDecl { .. } => Shape::list(A::Member),
            NodeKind::Unary => Shape::fixed(&[req!(A::UnaryOperator), req!(A::Expression)]),
            NodeKind::Binary => Shape::fixed(&[
                req!(A::Expression),
                req!(A::BinaryOperator),
                req!(A::Expression),
            ]),
            NodeKind::Call { .. } | NodeKind::ListLit => Shape::list(A::Expression),
            NodeKind::Member { .. } | NodeKind::ExprStmt => Shape::fixed(&[req!(A::Expression)]),
            NodeKind::Index | NodeKind::Assign => {
                Shape::fixed(&[req!(A::Expression), req!(A::Expression)])
            }
            NodeKind::Block => Shape::list(A::Statement),
            NodeKind::While => Shape::fixed(&[
                req!(A::Expression),
                opt!(A::Expression),
                req!(A::Block),
            ]),
            NodeKind::If => Shape::fixed(&[req!(A::Expression), req!(A::Block), opt!(A::Statement)]),
            NodeKind::Return => Shape::fixed(&[opt!(A::Expression)]),
            NodeKind::ListType => Shape::fixed(&[req!(A::Type)]),
            NodeKind::Literal(_)
            | NodeKind::Ident(_)
            | NodeKind::New { .. }
            | NodeKind::Stop
            | NodeKind::UnaryOp(_)
            | NodeKind::BinaryOp(_)
            | NodeKind::TypeName(_) => Shape::LEAF,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a child slot admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepts {
    Declaration,
    /// Members of a class: variables and functions
    Member,
    /// Function parameters: variable declarations
    Parameter,
    Expression,
    /// Statements, plus local variable declarations
    Statement,
    Block,
    Type,
    UnaryOperator,
    BinaryOperator,
}

impl Accepts {
    pub fn admits(self, kind: &NodeKind) -> bool {
        match self {
            Accepts::Declaration => kind.family() == Family::Declaration,
            Accepts::Member => matches!(kind, NodeKind::VarDecl { .. } | NodeKind::FuncDecl { .. }),
            Accepts::Parameter => matches!(kind, NodeKind::VarDecl { .. }),
            Accepts::Expression => kind.family() == Family::Expression,
            Accepts::Statement => {
                kind.family() == Family::Statement || matches!(kind, NodeKind::VarDecl { .. })
            }
            Accepts::Block => matches!(kind, NodeKind::Block),
            Accepts::Type => kind.family() == Family::Type,
            Accepts::UnaryOperator => matches!(kind, NodeKind::UnaryOp(_)),
            Accepts::BinaryOperator => matches!(kind, NodeKind::BinaryOp(_)),
        }
    }
}

impl fmt::Display for Accepts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Accepts::Declaration => "a declaration",
            Accepts::Member => "a class member",
            Accepts::Parameter => "a parameter declaration",
            Accepts::Expression => "an expression",
            Accepts::Statement => "a statement",
            Accepts::Block => "a block",
            Accepts::Type => "a type",
            Accepts::UnaryOperator => "a unary operator",
            Accepts::BinaryOperator => "a binary operator",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    pub accepts: Accepts,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Shape {
    pub slots: &'static [Slot],
    pub rest: Option<Accepts>,
}

impl Shape {
    const LEAF: Shape = Shape { slots: &[], rest: None };

    const fn fixed(slots: &'static [Slot]) -> Shape { Shape { slots, rest: None } }

    const fn list(rest: Accepts) -> Shape { Shape { slots: &[], rest: Some(rest) } }

    /// Gets the slot at the given position, if the shape has one
    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied().or_else(|| {
            self.rest.map(|accepts| Slot { accepts, optional: false })
        })
    }
}
