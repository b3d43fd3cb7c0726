//! bugsynth - Clean/Buggy Python Corpus Builder
//!
//! bugsynth builds a labeled training corpus for bug classifiers. It splits
//! Python files into top-level function and class definitions, labels each
//! one by evaluating it in a fresh interpreter, and pairs every clean unit
//! with a buggy variant produced by one of five fault archetypes. The
//! shuffled result is written as JSON and CSV.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          BUGSYNTH CORE                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  Source  →  Extractor  →  Oracle  →  Mutator  →  Corpus → Export │
//! │  (git)      (units)       (label)    (variant)   (shuffle)       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bugsynth::data::DataPipeline;
//! use bugsynth::oracle::PythonOracle;
//! use bugsynth::source::GitMaterializer;
//!
//! let pipeline = DataPipeline::new().seed(42);
//! let materializer = GitMaterializer::new(&pipeline.config().repos_dir);
//! let stats = pipeline.run_and_export(&materializer, &PythonOracle::new())?;
//! println!("{} examples", stats.total_examples());
//! # Ok::<(), bugsynth::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`grammar`] - tree-sitter Python parser
//! - [`extractor`] - top-level unit extraction
//! - [`oracle`] - executability oracle (fresh interpreter per unit)
//! - [`mutator`] - fault archetypes and injection
//! - [`data`] - corpus, assembly pipeline, JSON/CSV export
//! - [`source`] - repository acquisition and file walking

// Note: Lint configuration is in Cargo.toml [lints]
#![forbid(unsafe_code)]

pub mod data;
pub mod error;
pub mod extractor;
pub mod grammar;
pub mod mutator;
pub mod oracle;
pub mod source;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::{
        CorpusAssembler, DataPipeline, Label, LabeledExample, PipelineConfig, PipelineStats,
        ShuffledCorpus,
    };
    pub use crate::extractor::{SourceUnit, UnitExtractor};
    pub use crate::mutator::{FaultArchetype, FaultInjector, InjectedFault};
    pub use crate::oracle::{ExecutabilityCheck, OracleConfig, PythonOracle, SyntaxOracle, Verdict};
    pub use crate::source::{GitMaterializer, LocalMaterializer, Materializer};
    pub use crate::{Error, Result};
}
