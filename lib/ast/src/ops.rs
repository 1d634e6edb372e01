//! Operators
//!
//! Each operator enum is generated, together with its display table,
//! from a single list of `Tag => "text", Class` entries. The enum
//! discriminant of every tag is its position on that list, so the table
//! can't get out of sync with the enum.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// The family an operator belongs to. Type checking picks its
/// rule based on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    Equality,
    Relational,
    Arithmetic,
    Exponent,
    Shift,
    TypeTest,
    Bitwise,
    Logical,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator \"{0}\"")]
pub struct UnknownOperator(pub String);

macro_rules! operator_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $tag:ident => $text:literal, $class:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $( $tag ),+
        }

        impl $name {
            /// Every operator, paired with its display string and class,
            /// in declaration order
            pub const ALL: &'static [($name, &'static str, OperatorClass)] = &[
                $( ($name::$tag, $text, OperatorClass::$class) ),+
            ];

            pub const fn as_str(self) -> &'static str {
                Self::ALL[self as usize].1
            }

            pub const fn class(self) -> OperatorClass {
                Self::ALL[self as usize].2
            }
        }

        impl FromStr for $name {
            type Err = UnknownOperator;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .find(|(_, text, _)| *text == s)
                    .map(|(op, _, _)| *op)
                    .ok_or_else(|| UnknownOperator(s.to_owned()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operator_table! {
    pub enum UnaryOperator {
        Not    => "!", Logical,
        BitNot => "~", Bitwise,
    }
}

operator_table! {
    pub enum BinaryOperator {
        Eq     => "==",  Equality,
        Ne     => "!=",  Equality,
        Lt     => "<",   Relational,
        Le     => "<=",  Relational,
        Gt     => ">",   Relational,
        Ge     => ">=",  Relational,
        Add    => "+",   Arithmetic,
        Sub    => "-",   Arithmetic,
        Mul    => "*",   Arithmetic,
        Div    => "/",   Arithmetic,
        IntDiv => "//",  Arithmetic,
        Mod    => "%",   Arithmetic,
        Pow    => "**",  Exponent,
        Shl    => "<<",  Shift,
        Shr    => ">>",  Shift,
        UShr   => ">>>", Shift,
        Is     => "is",  TypeTest,
        BitAnd => "&",   Bitwise,
        BitOr  => "|",   Bitwise,
        BitXor => "^",   Bitwise,
        And    => "&&",  Logical,
        Or     => "||",  Logical,
    }
}
