//! Executability oracle
//!
//! The oracle decides the baseline label of a unit: it evaluates the unit's
//! definition and reports whether that raised.
//!
//! # Verdicts
//!
//! | Verdict | Meaning | Label |
//! |---------|---------|-------|
//! | `Clean` | evaluation completed | `0` |
//! | `Buggy` | evaluation raised (any exception) | `1` |
//! | `Indeterminate` | killed, timed out, or exited abnormally | none |
//!
//! Evaluating a `def` only binds the name, so the body of a function is
//! never run. Class bodies do run at definition time. A Clean verdict
//! therefore means "valid and executable at definition time", nothing more.
//!
//! # Example
//!
//! ```rust,no_run
//! use bugsynth::oracle::{ExecutabilityCheck, PythonOracle, Verdict};
//!
//! let oracle = PythonOracle::new();
//! let verdict = oracle.check("def add(a, b):\n    return a + b")?;
//! assert_eq!(verdict, Verdict::Clean);
//! # Ok::<(), bugsynth::Error>(())
//! ```

mod executor;

pub use executor::{OracleConfig, PythonOracle};

use crate::data::Label;
use crate::grammar::PythonGrammar;
use crate::Result;

/// Outcome of checking one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Evaluated without raising
    Clean,
    /// Evaluation raised
    Buggy {
        /// Exception summary, e.g. `ZeroDivisionError: division by zero`
        error: String,
    },
    /// The oracle could not decide
    Indeterminate {
        /// Why no decision was reached
        reason: String,
    },
}

impl Verdict {
    /// Label for this verdict, `None` when indeterminate
    #[must_use]
    pub fn label(&self) -> Option<Label> {
        match self {
            Self::Clean => Some(Label::Clean),
            Self::Buggy { .. } => Some(Label::Buggy),
            Self::Indeterminate { .. } => None,
        }
    }

    /// Whether the verdict is [`Verdict::Clean`]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// Anything that can classify source text as clean or buggy
///
/// The pipeline only talks to this trait, so the execution-based
/// [`PythonOracle`] can be replaced by a static check such as
/// [`SyntaxOracle`].
pub trait ExecutabilityCheck: Send + Sync {
    /// Classify one unit
    ///
    /// Evaluation failures are reported as [`Verdict::Buggy`]; an `Err`
    /// means the check itself could not run.
    ///
    /// # Errors
    ///
    /// Returns an error if the checking machinery is unavailable
    fn check(&self, code: &str) -> Result<Verdict>;

    /// Parse a whole source file with the language's own parser
    ///
    /// Returns the parser's message when the file is rejected, `None` when
    /// it is accepted. Nothing is executed. The default accepts everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the checking machinery is unavailable
    fn syntax_error(&self, source: &str) -> Result<Option<String>> {
        let _ = source;
        Ok(None)
    }

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Static oracle: Clean iff the unit parses
///
/// Much weaker than [`PythonOracle`] (it never sees a `NameError` in a
/// class body) but needs no interpreter.
#[derive(Debug)]
pub struct SyntaxOracle {
    grammar: PythonGrammar,
}

impl SyntaxOracle {
    /// Create a syntax-only oracle
    ///
    /// # Errors
    ///
    /// Returns an error if the Python grammar fails to load
    pub fn new() -> Result<Self> {
        Ok(Self {
            grammar: PythonGrammar::new()?,
        })
    }
}

impl ExecutabilityCheck for SyntaxOracle {
    fn check(&self, code: &str) -> Result<Verdict> {
        if code.trim().is_empty() {
            return Ok(Verdict::Clean);
        }
        Ok(match self.grammar.first_error(code) {
            None => Verdict::Clean,
            Some((line, column)) => Verdict::Buggy {
                error: format!("SyntaxError: invalid syntax (line {line}, column {column})"),
            },
        })
    }

    fn name(&self) -> &'static str {
        "syntax"
    }
}
