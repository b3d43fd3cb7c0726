//! Python grammar backed by tree-sitter-python

use std::sync::Mutex;

use tree_sitter::{Node, Parser, Tree};

use crate::{Error, Result};

/// Python grammar for parsing source files and units
///
/// The parser is behind a mutex so a single grammar can be shared by the
/// extractor, the fault injector and the syntax oracle.
pub struct PythonGrammar {
    parser: Mutex<Parser>,
}

impl std::fmt::Debug for PythonGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonGrammar")
            .field("language", &"python")
            .finish()
    }
}

impl PythonGrammar {
    /// Create a new Python grammar
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`] if tree-sitter rejects the compiled
    /// Python language (ABI mismatch between `tree-sitter` crates).
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::Grammar(format!("failed to load Python grammar: {e}")))?;
        Ok(Self {
            parser: Mutex::new(parser),
        })
    }

    /// Parse Python code and return the syntax tree
    ///
    /// Returns `None` if the parser lock is poisoned or parsing was cancelled.
    /// A tree is returned even for invalid code; use [`Self::has_errors`] or
    /// [`Self::first_error`] to check it.
    pub fn parse(&self, code: &str) -> Option<Tree> {
        let mut parser = self.parser.lock().ok()?;
        parser.parse(code, None)
    }

    /// Check if the parsed code has any syntax errors
    pub fn has_errors(&self, code: &str) -> bool {
        self.parse(code)
            .map_or(true, |tree| tree.root_node().has_error())
    }

    /// Check that code is non-empty and free of syntax errors
    pub fn validate(&self, code: &str) -> bool {
        !code.trim().is_empty() && !self.has_errors(code)
    }

    /// Locate the first syntax error as a 1-based `(line, column)` pair
    pub fn first_error(&self, code: &str) -> Option<(usize, usize)> {
        let tree = self.parse(code)?;
        let root = tree.root_node();
        if !root.has_error() {
            return None;
        }
        let node = first_error_node(root).unwrap_or(root);
        let pos = node.start_position();
        Some((pos.row + 1, pos.column + 1))
    }
}

fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(Node::has_error)
        .find_map(first_error_node)
}
