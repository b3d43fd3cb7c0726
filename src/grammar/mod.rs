//! Grammar definitions for source languages
//!
//! Only Python is supported: units are extracted from `.py` files and the
//! fault archetypes locate their targets in a tree-sitter-python tree.

mod python;

pub use python::PythonGrammar;

/// File extension (without the dot) of files the pipeline reads
pub const SOURCE_EXTENSION: &str = "py";
