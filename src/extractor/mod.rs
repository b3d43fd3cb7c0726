//! Source-unit extraction
//!
//! Splits one Python file into its top-level `def` and `class` definitions,
//! returning the exact source text of each.
//!
//! # Rules
//!
//! - Only direct children of the module body are units; nested definitions
//!   stay inside their parent's text.
//! - A decorated definition yields the definition itself. Decorator lines
//!   are not part of the unit.
//! - `async def` is not a unit.
//! - A unit ends at the last token of its last statement; comments the
//!   parser attaches after it are left out.
//!
//! # Failure policy
//!
//! [`UnitExtractor::extract`] never fails: a file that does not parse is
//! logged at `warn` and contributes no units. Use
//! [`UnitExtractor::try_extract`] to observe the error.
//!
//! tree-sitter-python is a permissive grammar: it accepts Python 2 `print`
//! and `exec` statements, `except E, e:` clauses, legacy octal literals and
//! ambiguous tab/space indentation. [`UnitExtractor::try_extract_checked`]
//! additionally runs the whole file past an [`ExecutabilityCheck`]'s own
//! parser and rejects what it rejects.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use tree_sitter::Node;

use crate::grammar::PythonGrammar;
use crate::oracle::ExecutabilityCheck;
use crate::{Error, Result};

/// Kind of top-level definition a unit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// `def name(...):`
    Function,
    /// `class Name:`
    Class,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Class => write!(f, "class"),
        }
    }
}

/// One top-level definition extracted from a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Exact source text of the definition
    pub text: String,
    /// File the unit was extracted from
    pub origin: PathBuf,
    /// Function or class
    pub kind: UnitKind,
    /// 1-based line of the `def`/`class` keyword in the file
    pub start_line: usize,
}

/// Extracts top-level units from Python source
#[derive(Debug)]
pub struct UnitExtractor {
    grammar: PythonGrammar,
}

impl UnitExtractor {
    /// Create an extractor with its own Python parser
    ///
    /// # Errors
    ///
    /// Returns an error if the Python grammar fails to load
    pub fn new() -> Result<Self> {
        Ok(Self {
            grammar: PythonGrammar::new()?,
        })
    }

    /// Extract units from `source`, failing soft on syntax errors
    pub fn extract(&self, source: &str, origin: &Path) -> Vec<SourceUnit> {
        match self.try_extract(source, origin) {
            Ok(units) => units,
            Err(e) => {
                warn!(error = %e, "skipping unparseable file");
                Vec::new()
            }
        }
    }

    /// Extract units from `source`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not valid Python.
    pub fn try_extract(&self, source: &str, origin: &Path) -> Result<Vec<SourceUnit>> {
        let parse_error = |message: String| Error::Parse {
            origin: origin.display().to_string(),
            message,
        };

        let tree = self
            .grammar
            .parse(source)
            .ok_or_else(|| parse_error("parser unavailable".to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            let message = match self.grammar.first_error(source) {
                Some((line, column)) => format!("invalid syntax at line {line}, column {column}"),
                None => "invalid syntax".to_string(),
            };
            return Err(parse_error(message));
        }

        let mut units = Vec::new();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            let Some((definition, kind)) = top_level_definition(node) else {
                continue;
            };
            let span = &source[definition.start_byte()..content_end(definition)];
            units.push(SourceUnit {
                text: span.to_string(),
                origin: origin.to_path_buf(),
                kind,
                start_line: definition.start_position().row + 1,
            });
        }

        debug!(origin = %origin.display(), units = units.len(), "extracted units");
        Ok(units)
    }

    /// Read a file and extract its units, failing soft on any error
    ///
    /// Line endings are normalized to `\n` before parsing.
    pub fn extract_file(&self, path: &Path) -> Vec<SourceUnit> {
        match read_source(path) {
            Ok(source) => self.extract(&source, path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                Vec::new()
            }
        }
    }

    /// Like [`Self::extract_file`] but reports read and parse failures
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, [`Error::Parse`] if
    /// it is not UTF-8 or not valid Python.
    pub fn try_extract_file(&self, path: &Path) -> Result<Vec<SourceUnit>> {
        let source = read_source(path)?;
        self.try_extract(&source, path)
    }

    /// Extract units from `source` after `checker` has accepted the file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if either tree-sitter or `checker` rejects
    /// the text, and passes through any error from `checker` itself.
    pub fn try_extract_checked(
        &self,
        source: &str,
        origin: &Path,
        checker: &dyn ExecutabilityCheck,
    ) -> Result<Vec<SourceUnit>> {
        if let Some(message) = checker.syntax_error(source)? {
            return Err(Error::Parse {
                origin: origin.display().to_string(),
                message,
            });
        }
        self.try_extract(source, origin)
    }

    /// Read a file and extract its units through [`Self::try_extract_checked`]
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_extract_file`], plus any rejection or failure of
    /// `checker`.
    pub fn try_extract_file_checked(
        &self,
        path: &Path,
        checker: &dyn ExecutabilityCheck,
    ) -> Result<Vec<SourceUnit>> {
        let source = read_source(path)?;
        self.try_extract_checked(&source, path, checker)
    }
}

/// Read a source file as UTF-8 with normalized line endings
fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| Error::Parse {
        origin: path.display().to_string(),
        message: format!("not valid UTF-8: {e}"),
    })?;
    Ok(normalize_newlines(&text))
}

fn normalize_newlines(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    }
}

fn top_level_definition(node: Node<'_>) -> Option<(Node<'_>, UnitKind)> {
    let definition = if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition")?
    } else {
        node
    };
    match definition.kind() {
        "function_definition" if !is_async(definition) => Some((definition, UnitKind::Function)),
        "class_definition" => Some((definition, UnitKind::Class)),
        _ => None,
    }
}

fn is_async(function: Node<'_>) -> bool {
    let mut cursor = function.walk();
    let first = function.children(&mut cursor).next();
    first.is_some_and(|child| child.kind() == "async")
}

/// Byte offset just past the last non-comment token under `node`
fn content_end(node: Node<'_>) -> usize {
    let mut cursor = node.walk();
    let last = node
        .children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .last();
    last.map_or(node.end_byte(), content_end)
}
