//! Utilities to represent spans inside a file

use std::{fmt, fmt::Debug, ops::Deref};

/// A line/column position inside a source file.
///
/// Lines and columns are 1-based. A default position (`0:0`) is used
/// for synthesized nodes that don't come from the source.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub const fn new(line: u32, col: u32) -> Self { Self { line, col } }
}

impl Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Represents a region of a source file, bounded by its
/// start and end [positions](Position)
///
/// Spans are produced by the lexer and attached to every node when
/// it's built. The compiler core never looks inside them, other than
/// to order them or to check if one contains another.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Span { start, end } = self;
        write!(f, "Span {{ {start:?}, {end:?} }}")
    }
}

impl Span {
    /// Builds a span from its start and end positions.
    ///
    /// If `end` comes before `start`, they are swapped
    pub fn new(start: Position, end: Position) -> Span {
        if end < start {
            Span { start: end, end: start }
        } else {
            Span { start, end }
        }
    }

    /// A zero-width span at the given line and column
    pub const fn point(line: u32, col: u32) -> Span {
        let pos = Position::new(line, col);
        Span { start: pos, end: pos }
    }

    pub const fn dummy() -> Span {
        Span { start: Position::new(0, 0), end: Position::new(0, 0) }
    }

    pub fn is_dummy(&self) -> bool { *self == Span::dummy() }

    /// Joins two spans together.
    /// Returns the smallest Span that covers both.
    ///
    /// # Example
    /// ```
    /// use span::{Position, Span};
    ///
    /// let a = Span::new(Position::new(1, 4), Position::new(1, 8));
    /// let b = Span::new(Position::new(2, 1), Position::new(2, 3));
    /// let joined = a.join(&b);
    /// assert_eq!(joined.start, Position::new(1, 4));
    /// assert_eq!(joined.end, Position::new(2, 3));
    /// ```
    #[must_use]
    pub fn join(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns true if `other` lies completely inside `self`
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns true if `self` ends before `other` starts
    pub fn is_before(&self, other: &Span) -> bool {
        self.end <= other.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.start.line, self.start.col)
    }
}

/// A value tagged with the [`Span`] it came from
#[derive(Debug)]
pub struct Spanned<T> {
    pub val: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub const fn new(val: T, span: Span) -> Self { Self { val, span } }
}

impl<T> Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target { &self.val }
}

impl<T: Clone> Clone for Spanned<T> {
    fn clone(&self) -> Self {
        Self {
            val: self.val.clone(),
            span: self.span,
        }
    }
}

impl<T: Copy> Copy for Spanned<T> {}

impl<T: PartialEq> PartialEq for Spanned<T> {
    fn eq(&self, other: &Self) -> bool { self.val == other.val }
}

#[cfg(test)]
mod test;
