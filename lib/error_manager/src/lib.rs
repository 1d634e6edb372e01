//! Diagnostic sink
//!
//! Passes never print anything. When they find a problem in the user's
//! program they build a value implementing [Error] and hand it to an
//! [`ErrorManager`]. The manager keeps them around, counts them, and
//! decides whether the compilation should stop after the current pass.

use core::any::Any;
use core::fmt;
use std::borrow::Cow;
use std::io;

pub use span::{Position, Span};

/// How serious a reported problem is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        })
    }
}

/// Which part of the language rules a problem violates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Syntax,
    Semantic,
    Type,
    Scope,
    Modifier,
    Runtime,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Syntax => "syntax",
            Category::Semantic => "semantic",
            Category::Type => "type",
            Category::Scope => "scope",
            Category::Modifier => "modifier",
            Category::Runtime => "runtime",
        })
    }
}

/// A problem sent to the [`ErrorManager`]
///
/// # Rationale for `Error: Any`
/// [`ErrorManager`] stores errors on a `Box<dyn Error>`, so every pass can
/// emit its own error type into the same manager. Extending [Any] lets
/// tests get the concrete type back with `downcast_ref`.
///
/// ## Example
/// ```
/// use error_manager::{Category, Error, ErrorManager, Span};
/// use core::fmt;
///
/// struct Undeclared(Span);
///
/// impl Error for Undeclared {
///     fn get_span(&self) -> Span { self.0 }
///     fn category(&self) -> Category { Category::Scope }
///     fn write_msg(&self, out: &mut dyn fmt::Write) -> fmt::Result {
///         write!(out, "undeclared name")
///     }
/// }
///
/// let mut em = ErrorManager::new();
/// em.emit_error(Undeclared(Span::point(3, 7)));
///
/// let err = em.errors_iterator_cast::<Undeclared>().next().unwrap();
/// assert_eq!(err.0, Span::point(3, 7));
/// assert_eq!(em.count_in(Category::Scope), 1);
/// ```
pub trait Error: Any {
    fn get_span(&self) -> Span;
    fn category(&self) -> Category;
    fn write_msg(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

/// An [Error] made of a plain message
pub struct StringError {
    pub msg: Cow<'static, str>,
    pub category: Category,
    pub span: Span,
}

impl Error for StringError {
    fn get_span(&self) -> Span { self.span }

    fn category(&self) -> Category { self.category }

    fn write_msg(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{}", self.msg)
    }
}

/// Collects [errors](Error) and warnings
pub struct ErrorManager {
    errors: Vec<Box<dyn Error>>,
    warnings: Vec<Box<dyn Error>>,
    error_limit: Option<usize>,
}

fn print_error(sev: Severity, err: &dyn Error, out: &mut dyn fmt::Write) -> fmt::Result {
    write!(out, "{sev} {} ({}): ", err.get_span(), err.category())?;
    err.write_msg(out)?;
    writeln!(out)
}

fn print_all(sev: Severity, errs: &[Box<dyn Error>], out: &mut dyn io::Write) -> io::Result<()> {
    let mut buf = String::new();
    for err in errs {
        print_error(sev, &**err, &mut buf).map_err(io::Error::other)?;
        out.write_all(buf.as_bytes())?;
        buf.clear();
    }
    Ok(())
}

impl ErrorManager {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            error_limit: None,
        }
    }

    /// Builds an [`ErrorManager`] that asks the compilation to halt once
    /// `limit` errors have been collected
    pub fn with_error_limit(limit: usize) -> Self {
        Self {
            error_limit: Some(limit),
            ..Self::new()
        }
    }

    pub fn report(&mut self, severity: Severity, err: impl Error + 'static) {
        match severity {
            Severity::Error => self.emit_error(err),
            Severity::Warning => self.emit_warning(err),
        }
    }

    pub fn emit_error(&mut self, err: impl Error + 'static) {
        tracing::debug!(span = %err.get_span(), category = %err.category(), "error emitted");
        self.errors.push(Box::new(err));
    }

    pub fn emit_warning(&mut self, err: impl Error + 'static) {
        tracing::debug!(span = %err.get_span(), category = %err.category(), "warning emitted");
        self.warnings.push(Box::new(err));
    }

    pub fn n_errors(&self) -> usize { self.errors.len() }

    pub fn has_errors(&self) -> bool { !self.errors.is_empty() }

    pub fn errors(&self) -> &[Box<dyn Error>] { &self.errors }

    pub fn n_warnings(&self) -> usize { self.warnings.len() }

    pub fn warnings(&self) -> &[Box<dyn Error>] { &self.warnings }

    pub fn clear_warnings(&mut self) { self.warnings.clear(); }

    /// Number of errors of the given [Category]
    pub fn count_in(&self, category: Category) -> usize {
        self.errors.iter().filter(|e| e.category() == category).count()
    }

    /// Decides if the compilation should stop after the pass that
    /// is currently running.
    ///
    pub fn error_limit(&self) -> Option<usize> { self.error_limit }

    pub fn set_error_limit(&mut self, limit: Option<usize>) { self.error_limit = limit; }

    /// Without an error limit, any error halts the compilation. With a
    /// limit, it only halts once the limit has been reached.
    pub fn should_halt(&self) -> bool {
        match self.error_limit {
            None => self.has_errors(),
            Some(limit) => self.n_errors() >= limit,
        }
    }

    /// Gets an iterator over the errors inside `self`, casting them to the
    /// concrete error type specified
    ///
    /// Errors of a different type are skipped
    pub fn errors_iterator_cast<E: Error>(&self) -> impl Iterator<Item = &E> {
        self.errors.iter().filter_map(|err| {
            let err: &dyn Any = &**err;
            err.downcast_ref::<E>()
        })
    }

    pub fn print_errors(&self, out: &mut dyn io::Write) -> io::Result<()> {
        print_all(Severity::Error, &self.errors, out)
    }

    pub fn print_warnings(&self, out: &mut dyn io::Write) -> io::Result<()> {
        print_all(Severity::Warning, &self.warnings, out)
    }
}

impl Default for ErrorManager {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod test;
