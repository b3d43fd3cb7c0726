//! Error types for bugsynth
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

/// Result type alias for bugsynth operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a corpus
#[derive(Error, Debug)]
pub enum Error {
    /// Grammar could not be loaded into the parser
    #[error("grammar error: {0}")]
    Grammar(String),

    /// Source text could not be parsed into a syntax tree
    #[error("parse error in {origin}: {message}")]
    Parse {
        /// File (or pseudo-file) the text came from
        origin: String,
        /// What went wrong
        message: String,
    },

    /// Executability oracle could not run at all
    #[error("oracle error: {0}")]
    Oracle(String),

    /// Fault injection error
    #[error("mutation error: {0}")]
    Mutation(String),

    /// Repository could not be materialized locally
    #[error("failed to acquire {locator}: {message}")]
    Acquisition {
        /// Repository locator (URL or path)
        locator: String,
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}
