//! Book example validation tests
//!
//! Every example shown in the documentation has a test here.
//!
//! ## Structure
//!
//! - `extraction/` - splitting files into top-level units
//! - `oracle/` - labeling units by evaluation
//! - `fault_injection/` - the five fault archetypes
//! - `corpus/` - assembly, shuffling, and export
//!
//! Tests that need a Python interpreter return early when `python3` is
//! not installed.

mod corpus;
mod extraction;
mod fault_injection;
mod oracle;

use bugsynth::oracle::PythonOracle;

/// The default oracle, if its interpreter can be run here
pub(crate) fn python_oracle() -> Option<PythonOracle> {
    let oracle = PythonOracle::new();
    oracle.is_available().then_some(oracle)
}
