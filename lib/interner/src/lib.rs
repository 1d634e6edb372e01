//! Name interner
//!
//! Every name that appears in the tree (variables, functions, classes,
//! fields, type names) is stored as a [Symbol]. Symbols are plain
//! indices into a global interner, so they are [Copy], cheap to hash,
//! and two symbols compare equal exactly when their strings do.
//!
//! # Example
//! ```
//! use interner::Symbol;
//!
//! let point = Symbol::new("Point");
//! let same = Symbol::new("Point");
//! assert_eq!(point, same);
//! assert_eq!(point, "Point");
//!
//! point.borrow(|s| assert_eq!(s.len(), 5));
//! ```

use core::fmt::{Debug, Display};
use core::str::FromStr;
use std::sync::{LazyLock, RwLock};

use interns::StringInterner;

/// Identifies an interned name.
#[derive(Clone, Copy, Hash, Eq, PartialEq)]
#[repr(transparent)]
pub struct Symbol(interns::Symbol<str>);

impl Symbol {
    /// Gets the symbol for the given string, interning it if it's
    /// the first time we see it.
    #[inline]
    pub fn new(s: &str) -> Self {
        GLOBAL_INTERNER.get_or_intern(s)
    }

    /// Borrows the string behind this symbol and applies
    /// the given closure to it
    #[inline]
    pub fn borrow<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        GLOBAL_INTERNER.resolve_unchecked(*self, f)
    }

    /// Copies the string behind this symbol into an owned [String]
    pub fn to_owned_string(&self) -> String {
        self.borrow(str::to_owned)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self { Self::new(value) }
}

impl FromStr for Symbol {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        GLOBAL_INTERNER.resolve(*self, |s| s == Some(*other))
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        GLOBAL_INTERNER.resolve(*self, |sym| match sym {
            Some(s) => write!(f, "{s:?}"),
            None => write!(f, "{:?}", self.0),
        })
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        GLOBAL_INTERNER.resolve_unchecked(*self, |s| write!(f, "{s}"))
    }
}

struct Interner(RwLock<StringInterner>);

static GLOBAL_INTERNER: LazyLock<Interner> =
    LazyLock::new(|| Interner(RwLock::new(StringInterner::new())));

impl Interner {
    #[inline]
    fn get_or_intern(&self, src: &str) -> Symbol {
        let mut guard = self.0.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        Symbol(guard.get_or_intern(src))
    }

    #[inline]
    fn resolve<R>(&self, sym: Symbol, f: impl FnOnce(Option<&str>) -> R) -> R {
        let guard = self.0.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(guard.resolve(sym.0))
    }

    fn resolve_unchecked<R>(&self, sym: Symbol, f: impl FnOnce(&str) -> R) -> R {
        self.resolve(sym, |s| {
            let s = s.unwrap_or_else(|| {
                /* Symbols are only built through Symbol::new, so the
                 * interner always knows them. */
                unreachable!("Attempt to resolve an unknown symbol: {:?}", sym.0)
            });
            f(s)
        })
    }
}
