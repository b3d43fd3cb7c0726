//! Fault archetype catalog

use serde::{Deserialize, Serialize};

/// One of the fixed fault archetypes
///
/// Each archetype targets a runtime error class Python raises for a
/// common programming mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaultArchetype {
    /// Rename a referenced name so it is undefined
    /// `return total` → `return total_bug` (`NameError`)
    #[serde(rename = "identifier-corruption")]
    IdentifierCorruption,

    /// Concatenate a string onto the returned value
    /// `return a + b` → `return str('bug') + a + b` (`TypeError`)
    #[serde(rename = "type-mismatch-injection")]
    TypeMismatch,

    /// Index far past the end of a sequence
    /// `xs[i]` → `xs[100]` (`IndexError`)
    #[serde(rename = "out-of-bounds-injection")]
    OutOfBounds,

    /// Divide by a literal zero
    /// `a / b` → `a / 0` (`ZeroDivisionError`)
    #[serde(rename = "division-by-zero-injection")]
    DivisionByZero,

    /// Call a method that numbers do not have
    /// appends `(5).append(3)` (`AttributeError`)
    #[serde(rename = "attribute-misuse-injection")]
    AttributeMisuse,
}

impl FaultArchetype {
    /// Get all archetypes, in registry order
    #[must_use]
    pub fn all() -> Vec<Self> {
        vec![
            Self::IdentifierCorruption,
            Self::TypeMismatch,
            Self::OutOfBounds,
            Self::DivisionByZero,
            Self::AttributeMisuse,
        ]
    }

    /// Statement appended at module level when the preferred target is absent
    ///
    /// `None` for identifier corruption, which has no fallback.
    #[must_use]
    pub fn fallback_statement(&self) -> Option<&'static str> {
        match self {
            Self::IdentifierCorruption => None,
            Self::TypeMismatch => Some("str('bug') + 1"),
            Self::OutOfBounds => Some("[1, 2][100]"),
            Self::DivisionByZero => Some("1 / 0"),
            Self::AttributeMisuse => Some("(5).append(3)"),
        }
    }

    /// Python exception the archetype is meant to provoke
    #[must_use]
    pub fn expected_exception(&self) -> &'static str {
        match self {
            Self::IdentifierCorruption => "NameError",
            Self::TypeMismatch => "TypeError",
            Self::OutOfBounds => "IndexError",
            Self::DivisionByZero => "ZeroDivisionError",
            Self::AttributeMisuse => "AttributeError",
        }
    }

    /// Get description of the archetype
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::IdentifierCorruption => "Identifier Corruption",
            Self::TypeMismatch => "Type Mismatch Injection",
            Self::OutOfBounds => "Out-of-Bounds Injection",
            Self::DivisionByZero => "Division-by-Zero Injection",
            Self::AttributeMisuse => "Attribute Misuse Injection",
        }
    }
}

impl std::fmt::Display for FaultArchetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdentifierCorruption => write!(f, "identifier-corruption"),
            Self::TypeMismatch => write!(f, "type-mismatch-injection"),
            Self::OutOfBounds => write!(f, "out-of-bounds-injection"),
            Self::DivisionByZero => write!(f, "division-by-zero-injection"),
            Self::AttributeMisuse => write!(f, "attribute-misuse-injection"),
        }
    }
}
