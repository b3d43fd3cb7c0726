//! Fault injection
//!
//! Turns a unit the oracle found Clean into a Buggy variant by applying one
//! fault archetype. The archetype is picked uniformly at random from the
//! injector's registry.
//!
//! # Archetypes
//!
//! | Archetype | Preferred edit | Fallback |
//! |-----------|----------------|----------|
//! | identifier-corruption | first name read `x` → `x_bug` | none (text unchanged) |
//! | type-mismatch-injection | `return e` → `return str('bug') + e` | append `str('bug') + 1` |
//! | out-of-bounds-injection | `xs[i]` → `xs[100]` | append `[1, 2][100]` |
//! | division-by-zero-injection | `a / b` → `a / 0`, `a /= b` → `a /= 0` | append `1 / 0` |
//! | attribute-misuse-injection | none | append `(5).append(3)` |
//!
//! Targets are located on the tree-sitter parse of the unit, so an edit only
//! touches real code (never a string literal or comment) and changes exactly
//! one place. Appended statements run at module level, which makes every
//! fallback raise as soon as the variant is defined.
//!
//! The injector never re-runs the oracle: a variant is Buggy by construction.
//!
//! ```rust
//! use bugsynth::mutator::{FaultArchetype, FaultInjector};
//!
//! let injector = FaultInjector::new()?;
//! let fault = injector.apply("def add(a, b):\n    return a + b", FaultArchetype::TypeMismatch)?;
//! assert_eq!(fault.mutated, "def add(a, b):\n    return str('bug') + a + b");
//! # Ok::<(), bugsynth::Error>(())
//! ```

mod archetype;
mod sites;

pub use archetype::FaultArchetype;

use rand::prelude::*;
use tracing::debug;

use crate::grammar::PythonGrammar;
use crate::{Error, Result};

/// Where an injected fault landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionSite {
    /// Edited in place at a 1-based line and column of the unit
    InPlace {
        /// Line of the edit
        line: usize,
        /// Column of the edit
        column: usize,
    },
    /// Statement appended at module level
    Appended,
    /// No target and no fallback; the text is unchanged
    Unchanged,
}

/// Buggy variant with metadata
#[derive(Debug, Clone)]
pub struct InjectedFault {
    /// Clean unit text
    pub original: String,
    /// Variant text
    pub mutated: String,
    /// Archetype applied
    pub archetype: FaultArchetype,
    /// Location of the edit
    pub site: InjectionSite,
    /// Description of the edit
    pub description: String,
}

/// Applies fault archetypes to clean units
#[derive(Debug)]
pub struct FaultInjector {
    grammar: PythonGrammar,
    /// Enabled archetypes
    enabled_archetypes: Vec<FaultArchetype>,
}

impl FaultInjector {
    /// Create an injector with every archetype enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the Python grammar fails to load
    pub fn new() -> Result<Self> {
        Self::with_archetypes(FaultArchetype::all())
    }

    /// Create an injector with specific archetypes enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or the grammar fails to load
    pub fn with_archetypes(archetypes: Vec<FaultArchetype>) -> Result<Self> {
        if archetypes.is_empty() {
            return Err(Error::Configuration(
                "at least one fault archetype must be enabled".to_string(),
            ));
        }
        Ok(Self {
            grammar: PythonGrammar::new()?,
            enabled_archetypes: archetypes,
        })
    }

    /// Enabled archetypes, in selection order
    #[must_use]
    pub fn archetypes(&self) -> &[FaultArchetype] {
        &self.enabled_archetypes
    }

    /// Pick an archetype uniformly at random and apply it
    ///
    /// # Errors
    ///
    /// Returns an error if `code` is empty
    pub fn inject<R: Rng + ?Sized>(&self, code: &str, rng: &mut R) -> Result<InjectedFault> {
        let archetype = *self
            .enabled_archetypes
            .choose(rng)
            .ok_or_else(|| Error::Mutation("no archetypes enabled".to_string()))?;
        self.apply(code, archetype)
    }

    /// Apply one archetype
    ///
    /// # Errors
    ///
    /// Returns an error if `code` is empty
    pub fn apply(&self, code: &str, archetype: FaultArchetype) -> Result<InjectedFault> {
        if code.trim().is_empty() {
            return Err(Error::Mutation("cannot mutate empty code".to_string()));
        }

        let edit = self.grammar.parse(code).and_then(|tree| match archetype {
            FaultArchetype::IdentifierCorruption => sites::corrupt_identifier(&tree, code),
            FaultArchetype::TypeMismatch => sites::type_mismatch(&tree, code),
            FaultArchetype::OutOfBounds => sites::out_of_bounds(&tree, code),
            FaultArchetype::DivisionByZero => sites::division_by_zero(&tree, code),
            FaultArchetype::AttributeMisuse => None,
        });

        let (mutated, site, description) = match (edit, archetype.fallback_statement()) {
            (Some(edit), _) => {
                let (line, column) = edit.position;
                (
                    edit.apply(code),
                    InjectionSite::InPlace { line, column },
                    edit.description,
                )
            }
            (None, Some(statement)) => (
                sites::append_statement(code, statement),
                InjectionSite::Appended,
                format!("Append `{statement}`"),
            ),
            (None, None) => (
                code.to_string(),
                InjectionSite::Unchanged,
                "No eligible target".to_string(),
            ),
        };

        debug!(%archetype, ?site, "injected fault");
        Ok(InjectedFault {
            original: code.to_string(),
            mutated,
            archetype,
            site,
            description,
        })
    }
}
