//! Compiler driver
//!
//! Runs the semantic passes over a tree, in a fixed order:
//! [identification](PassKind::Identification) first, and then
//! [type checking](PassKind::TypeCheck).
//!
//! After each pass the [`ErrorManager`] decides if the compilation
//! should go on. The driver itself never looks at the errors.

use core::fmt;

use ast::Tree;
use ast::visitor::{CancelFlag, Cancelled};
use error_manager::ErrorManager;
use semantic::{PassError, Semantic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassKind {
    Identification,
    TypeCheck,
}

impl PassKind {
    /// Every pass, in the order they run
    pub const ALL: [PassKind; 2] = [PassKind::Identification, PassKind::TypeCheck];

    pub const fn name(self) -> &'static str {
        match self {
            PassKind::Identification => "identification",
            PassKind::TypeCheck => "type checking",
        }
    }

    fn run(
        self,
        tree: &Tree,
        sem: &Semantic,
        em: &mut ErrorManager,
        cancel: &CancelFlag,
    ) -> Result<(), PassError> {
        let cancel = Some(cancel.clone());
        match self {
            PassKind::Identification => identification::identify(tree, sem, em, cancel),
            PassKind::TypeCheck => typecheck::check_types(tree, sem, em, cancel),
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Last pass to run
    pub stop_after: Option<PassKind>,
    /// Number of errors after which the compilation halts.
    /// Without it, any error halts the compilation.
    ///
    /// [`Compiler::run`] applies it to the [`ErrorManager`] it's given.
    /// When it's `None`, the manager keeps its own limit.
    pub error_limit: Option<usize>,
}

impl Config {
    #[must_use]
    pub fn stop_after(mut self, pass: PassKind) -> Self {
        self.stop_after = Some(pass);
        self
    }

    #[must_use]
    pub fn error_limit(mut self, limit: usize) -> Self {
        self.error_limit = Some(limit);
        self
    }

    /// Builds an [`ErrorManager`] that follows this configuration
    pub fn error_manager(&self) -> ErrorManager {
        match self.error_limit {
            Some(limit) => ErrorManager::with_error_limit(limit),
            None => ErrorManager::new(),
        }
    }
}

/// Summary of a compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOutcome {
    pub completed: Vec<PassKind>,
    /// The pass after which the [`ErrorManager`] asked to halt
    pub halted_after: Option<PassKind>,
    pub errors: usize,
    pub warnings: usize,
}

impl DriverOutcome {
    pub fn halted(&self) -> bool { self.halted_after.is_some() }

    pub fn exit_code(&self) -> i32 {
        i32::from(self.errors > 0)
    }
}

pub struct Compiler {
    config: Config,
    cancel: CancelFlag,
}

impl Compiler {
    pub fn new(config: Config) -> Self {
        Self { config, cancel: CancelFlag::new() }
    }

    pub fn config(&self) -> &Config { &self.config }

    /// A handle that can be used to cancel the compilation,
    /// possibly from another thread
    pub fn cancel_flag(&self) -> CancelFlag { self.cancel.clone() }

    /// Runs every pass over `tree`
    ///
    /// Failures that abort a pass, including cancellation, are returned
    /// as an `Err`. Problems found in the program are collected in `em`,
    /// which takes the configured [error limit](Config::error_limit).
    #[tracing::instrument(skip_all)]
    pub fn run(
        &self,
        tree: &Tree,
        sem: &Semantic,
        em: &mut ErrorManager,
    ) -> Result<DriverOutcome, PassError> {
        if let Some(limit) = self.config.error_limit {
            em.set_error_limit(Some(limit));
        }

        let mut completed = Vec::new();
        let mut halted_after = None;

        for pass in PassKind::ALL {
            if self.cancel.is_cancelled() {
                tracing::warn!(%pass, "compilation cancelled");
                return Err(Cancelled.into());
            }

            tracing::info!(%pass, "running pass");
            pass.run(tree, sem, em, &self.cancel)?;
            completed.push(pass);
            tracing::info!(%pass, errors = em.n_errors(), warnings = em.n_warnings(), "pass finished");

            if em.should_halt() {
                tracing::warn!(%pass, errors = em.n_errors(), "halting compilation");
                halted_after = Some(pass);
                break;
            }
            if self.config.stop_after == Some(pass) {
                break;
            }
        }

        Ok(DriverOutcome {
            completed,
            halted_after,
            errors: em.n_errors(),
            warnings: em.n_warnings(),
        })
    }
}

impl Default for Compiler {
    fn default() -> Self { Self::new(Config::default()) }
}
