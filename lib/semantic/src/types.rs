use core::fmt;

use interner::Symbol;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Float,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscreteKind {
    Bool,
    Char,
    Byte,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub name: Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListType {
    pub elem: Box<Type>,
}

/// A member of the type lattice
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Floating point numbers
    Scalar(ScalarKind),
    /// Integer-like values
    Discrete(DiscreteKind),
    Class(ClassType),
    List(ListType),
    /// Placeholder for a type that hasn't been computed yet
    Unresolved,
    /// The type of an erroneous expression. It's compatible with
    /// everything, so one error doesn't cascade into many.
    Error,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
        })
    }
}

impl fmt::Display for DiscreteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiscreteKind::Bool => "bool",
            DiscreteKind::Char => "char",
            DiscreteKind::Byte => "byte",
            DiscreteKind::Int => "int",
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(s) => write!(f, "{s}"),
            Type::Discrete(d) => write!(f, "{d}"),
            Type::Class(c) => write!(f, "{}", c.name),
            Type::List(l) => write!(f, "[{}]", l.elem),
            Type::Unresolved => write!(f, "<unresolved>"),
            Type::Error => write!(f, "<error>"),
        }
    }
}

/// Tells if a class inherits from another
///
/// Assignability between classes depends on the class hierarchy of the
/// program. Passing it explicitly keeps [`Type::assignable_to`] a pure
/// function of its arguments.
pub trait SubtypeRelation {
    /// Must be reflexive: every class is a subclass of itself
    fn is_subclass_of(&self, sub: Symbol, sup: Symbol) -> bool;
}

/// A relation where classes are only related to themselves
pub struct NoSubtyping;

impl SubtypeRelation for NoSubtyping {
    fn is_subclass_of(&self, sub: Symbol, sup: Symbol) -> bool { sub == sup }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeCastError {
    #[error("expected {expected} type, found {found}")]
    Mismatch { expected: &'static str, found: Type },
    #[error("expected {expected} type, but the type is still unresolved")]
    Unresolved { expected: &'static str },
}

impl Type {
    pub const BOOL: Type = Type::Discrete(DiscreteKind::Bool);
    pub const CHAR: Type = Type::Discrete(DiscreteKind::Char);
    pub const BYTE: Type = Type::Discrete(DiscreteKind::Byte);
    pub const INT: Type = Type::Discrete(DiscreteKind::Int);
    pub const FLOAT: Type = Type::Scalar(ScalarKind::Float);
    pub const DOUBLE: Type = Type::Scalar(ScalarKind::Double);

    pub fn list(elem: Type) -> Type {
        Type::List(ListType { elem: Box::new(elem) })
    }

    pub fn class(name: Symbol) -> Type {
        Type::Class(ClassType { name })
    }

    /// Gets the builtin type with the given name
    pub fn builtin(name: &str) -> Option<Type> {
        Some(match name {
            "bool" => Type::BOOL,
            "char" => Type::CHAR,
            "byte" => Type::BYTE,
            "int" => Type::INT,
            "float" => Type::FLOAT,
            "double" => Type::DOUBLE,
            _ => return None,
        })
    }

    #[inline]
    pub const fn is_error(&self) -> bool { matches!(self, Type::Error) }

    #[inline]
    pub const fn is_unresolved(&self) -> bool { matches!(self, Type::Unresolved) }

    #[inline]
    pub const fn is_boolean(&self) -> bool { matches!(self, Type::Discrete(DiscreteKind::Bool)) }

    /// Char, byte and int
    #[inline]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Type::Discrete(DiscreteKind::Char | DiscreteKind::Byte | DiscreteKind::Int)
        )
    }

    /// Integers and scalars
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Type::Scalar(_))
    }

    /// Tells if a value of type `self` can be implicitly converted
    /// into `other` without losing information
    ///
    /// - Every type widens to itself, except [`Type::Unresolved`]
    /// - `byte` and `char` widen to `int`
    /// - Any integer widens to any scalar
    /// - `float` widens to `double`
    ///
    /// Nothing widens to `bool`, other than `bool` itself.
    pub fn widens_to(&self, other: &Type) -> bool {
        use DiscreteKind as D;
        use ScalarKind as S;

        match (self, other) {
            (Type::Unresolved, _) | (_, Type::Unresolved) => false,
            (Type::Discrete(D::Byte | D::Char), Type::Discrete(D::Int))
            | (Type::Scalar(S::Float), Type::Scalar(S::Double)) => true,
            (Type::Discrete(d), Type::Scalar(_)) => *d != D::Bool,
            (a, b) => a == b,
        }
    }

    /// Symmetric relation between types that can meet in the same
    /// expression
    pub fn compatible_with(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Unresolved, _) | (_, Type::Unresolved) => false,
            (Type::Error, _) | (_, Type::Error) => true,
            (a, b) => a.widens_to(b) || b.widens_to(a),
        }
    }

    /// The wider of two compatible types
    ///
    /// Returns [`Type::Error`] if any of them is erroneous, and `None`
    /// if they are not compatible.
    pub fn common_type(&self, other: &Type) -> Option<Type> {
        if !self.compatible_with(other) {
            return None;
        }
        if self.is_error() || other.is_error() {
            Some(Type::Error)
        } else if self.widens_to(other) {
            Some(other.clone())
        } else {
            Some(self.clone())
        }
    }

    /// Tells if a value of type `self` can be stored into a location
    /// of type `target`
    ///
    /// - Scalars and discretes are assignable through widening
    /// - A class is assignable to itself and its ancestors
    /// - `[A]` is assignable to `[B]` if `A` is assignable to `B`
    /// - Lists are never assignable to anything but other lists
    /// - [`Type::Error`] is assignable in both directions
    /// - [`Type::Unresolved`] is never assignable
    pub fn assignable_to(&self, target: &Type, subtypes: &impl SubtypeRelation) -> bool {
        match (self, target) {
            (Type::Unresolved, _) | (_, Type::Unresolved) => false,
            (Type::Error, _) | (_, Type::Error) => true,
            (Type::Class(sub), Type::Class(sup)) => subtypes.is_subclass_of(sub.name, sup.name),
            (Type::List(src), Type::List(tgt)) => src.elem.assignable_to(&tgt.elem, subtypes),
            (Type::List(_), _) | (_, Type::List(_)) => false,
            (src, tgt) => src.widens_to(tgt),
        }
    }

    fn narrowing_error(&self, expected: &'static str) -> TypeCastError {
        match self {
            Type::Unresolved => TypeCastError::Unresolved { expected },
            found => TypeCastError::Mismatch { expected, found: found.clone() },
        }
    }

    pub fn as_scalar_type(&self) -> Result<ScalarKind, TypeCastError> {
        match self {
            Type::Scalar(s) => Ok(*s),
            _ => Err(self.narrowing_error("a scalar")),
        }
    }

    pub fn as_discrete_type(&self) -> Result<DiscreteKind, TypeCastError> {
        match self {
            Type::Discrete(d) => Ok(*d),
            _ => Err(self.narrowing_error("a discrete")),
        }
    }

    pub fn as_class_type(&self) -> Result<&ClassType, TypeCastError> {
        match self {
            Type::Class(c) => Ok(c),
            _ => Err(self.narrowing_error("a class")),
        }
    }

    pub fn as_list_type(&self) -> Result<&ListType, TypeCastError> {
        match self {
            Type::List(l) => Ok(l),
            _ => Err(self.narrowing_error("a list")),
        }
    }
}
