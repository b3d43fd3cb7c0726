//! Corpus assembly pipeline
//!
//! Runs extraction, labeling, and fault injection over every file of every
//! repository, one unit at a time, then shuffles the result once.
//!
//! # Flow
//!
//! ```text
//! repository ─► files ─► units ─► oracle ─┬─ Clean ─► (unit, 0) + (variant, 1)
//!                                         ├─ Buggy ─► (unit, 1)
//!                                         └─ Indeterminate ─► skipped
//! ```
//!
//! Everything is sequential. A single seeded [`StdRng`] drives archetype
//! selection and the final shuffle, so a fixed seed over fixed inputs gives
//! a fixed corpus.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use tracing::{debug, info, warn};

use super::{export, Corpus, Label, LabeledExample, ShuffledCorpus};
use crate::extractor::{SourceUnit, UnitExtractor};
use crate::grammar::SOURCE_EXTENSION;
use crate::mutator::{FaultArchetype, FaultInjector};
use crate::oracle::{ExecutabilityCheck, Verdict};
use crate::source::{source_files, Materializer};
use crate::Result;

/// Repositories processed when none are configured
pub const DEFAULT_REPOSITORIES: [&str; 7] = [
    "https://github.com/jagritiS/pythonProgramming",
    "https://github.com/jagritiS/all-captcha",
    "https://github.com/jagritiS/AIMLN-Projects",
    "https://github.com/jagritiS/mini-python-projects",
    "https://github.com/jagritiS/django_auth_package",
    "https://github.com/jagritiS/python_package_cleaner",
    "https://github.com/jagritiS/NamedEntityRecognitionExamples",
];

/// Default JSON artifact path
pub const DEFAULT_JSON_PATH: &str = "dataset_realistic_bug.json";

/// Default CSV artifact path
pub const DEFAULT_CSV_PATH: &str = "dataset_realistic_bug.csv";

/// Default clone directory
pub const DEFAULT_REPOS_DIR: &str = "repos";

/// Configuration for the corpus pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Repository locators, processed in order
    pub repositories: Vec<String>,
    /// Directory remote repositories are cloned into
    pub repos_dir: PathBuf,
    /// JSON artifact path
    pub json_path: PathBuf,
    /// CSV artifact path
    pub csv_path: PathBuf,
    /// Random seed; `None` draws one from entropy
    pub seed: Option<u64>,
    /// Show a progress spinner
    pub show_progress: bool,
    /// Extension of source files to scan
    pub extension: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            repositories: DEFAULT_REPOSITORIES.iter().map(ToString::to_string).collect(),
            repos_dir: PathBuf::from(DEFAULT_REPOS_DIR),
            json_path: PathBuf::from(DEFAULT_JSON_PATH),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            seed: None,
            show_progress: false,
            extension: SOURCE_EXTENSION.to_string(),
        }
    }
}

/// Statistics from one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Repositories scanned
    pub repositories: usize,
    /// Repositories that could not be acquired
    pub repositories_failed: usize,
    /// Source files visited
    pub files_scanned: usize,
    /// Files skipped because they could not be read or parsed
    pub parse_failures: usize,
    /// Units extracted
    pub units_extracted: usize,
    /// Units the oracle labeled Clean
    pub clean: usize,
    /// Units the oracle labeled Buggy
    pub buggy_baseline: usize,
    /// Variants synthesized from Clean units
    pub variants_injected: usize,
    /// Units skipped on an Indeterminate verdict
    pub indeterminate: usize,
    /// Units skipped because the oracle could not run
    pub oracle_errors: usize,
    /// Variants per archetype
    pub per_archetype: BTreeMap<FaultArchetype, usize>,
    /// Seed that drove selection and shuffling
    pub seed: u64,
    /// Wall-clock time in milliseconds
    pub elapsed_ms: u64,
}

impl PipelineStats {
    /// Total examples in the corpus
    #[must_use]
    pub fn total_examples(&self) -> usize {
        self.clean + self.buggy_baseline + self.variants_injected
    }

    /// Share of labeled units the oracle found Clean, as a percentage
    #[must_use]
    pub fn clean_rate(&self) -> f64 {
        let labeled = self.clean + self.buggy_baseline;
        if labeled == 0 {
            return 0.0;
        }
        (self.clean as f64 / labeled as f64) * 100.0
    }
}

/// Accumulates labeled examples unit by unit
///
/// Usable on its own for in-memory sources; [`DataPipeline`] drives it over
/// materialized repositories.
pub struct CorpusAssembler<'o> {
    extractor: UnitExtractor,
    oracle: &'o dyn ExecutabilityCheck,
    injector: FaultInjector,
    rng: StdRng,
    corpus: Corpus,
    stats: PipelineStats,
    progress: Option<ProgressBar>,
    started: Instant,
}

impl std::fmt::Debug for CorpusAssembler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusAssembler")
            .field("oracle", &self.oracle.name())
            .field("examples", &self.corpus.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<'o> CorpusAssembler<'o> {
    /// Create an assembler with every archetype enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the Python grammar fails to load
    pub fn new(oracle: &'o dyn ExecutabilityCheck, seed: u64) -> Result<Self> {
        Self::with_injector(oracle, FaultInjector::new()?, seed)
    }

    /// Create an assembler with a custom injector
    ///
    /// # Errors
    ///
    /// Returns an error if the Python grammar fails to load
    pub fn with_injector(
        oracle: &'o dyn ExecutabilityCheck,
        injector: FaultInjector,
        seed: u64,
    ) -> Result<Self> {
        Ok(Self {
            extractor: UnitExtractor::new()?,
            oracle,
            injector,
            rng: StdRng::seed_from_u64(seed),
            corpus: Corpus::new(),
            stats: PipelineStats {
                seed,
                ..PipelineStats::default()
            },
            progress: None,
            started: Instant::now(),
        })
    }

    /// Enable or disable the progress spinner
    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.progress = show.then(|| {
            let pb = ProgressBar::new_spinner();
            // Template is hardcoded and known to be valid
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}")
            {
                pb.set_style(style);
            }
            pb
        });
        self
    }

    /// Examples collected so far, in collection order
    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Statistics so far
    #[must_use]
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Scan every matching file under a repository root
    pub fn add_repository(&mut self, root: &Path, extension: &str) {
        self.stats.repositories += 1;
        if let Some(pb) = &self.progress {
            pb.set_message(root.display().to_string());
        }
        let before = self.corpus.len();
        for path in source_files(root, extension) {
            self.add_file(&path);
        }
        info!(
            path = %root.display(),
            examples = self.corpus.len() - before,
            "repository processed"
        );
    }

    /// Record a repository that could not be acquired
    pub fn skip_repository(&mut self, locator: &str, error: &crate::Error) {
        warn!(repository = locator, error = %error, "skipping repository");
        self.stats.repositories_failed += 1;
    }

    /// Process one file
    pub fn add_file(&mut self, path: &Path) {
        self.stats.files_scanned += 1;
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
        let extracted = self.extractor.try_extract_file_checked(path, self.oracle);
        match extracted {
            Ok(units) => self.add_units(&units),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                self.record_file_failure(&e);
            }
        }
    }

    /// Process in-memory source text as if it were a file at `origin`
    pub fn add_source(&mut self, source: &str, origin: &Path) {
        self.stats.files_scanned += 1;
        let extracted = self.extractor.try_extract_checked(source, origin, self.oracle);
        match extracted {
            Ok(units) => self.add_units(&units),
            Err(e) => {
                warn!(error = %e, "skipping source");
                self.record_file_failure(&e);
            }
        }
    }

    fn record_file_failure(&mut self, error: &crate::Error) {
        if matches!(error, crate::Error::Oracle(_)) {
            self.stats.oracle_errors += 1;
        } else {
            self.stats.parse_failures += 1;
        }
    }

    fn add_units(&mut self, units: &[SourceUnit]) {
        for unit in units {
            self.add_unit(unit);
        }
    }

    /// Label one unit and, if Clean, pair it with a Buggy variant
    pub fn add_unit(&mut self, unit: &SourceUnit) {
        self.stats.units_extracted += 1;
        let verdict = match self.oracle.check(&unit.text) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(origin = %unit.origin.display(), line = unit.start_line, error = %e, "oracle failed, skipping unit");
                self.stats.oracle_errors += 1;
                return;
            }
        };

        match verdict {
            Verdict::Clean => {
                let fault = match self.injector.inject(&unit.text, &mut self.rng) {
                    Ok(fault) => fault,
                    Err(e) => {
                        warn!(origin = %unit.origin.display(), error = %e, "injection failed, skipping unit");
                        return;
                    }
                };
                self.corpus.push(
                    LabeledExample::new(unit.text.clone(), Label::Clean).with_origin(&unit.origin),
                );
                self.corpus.push(
                    LabeledExample::new(fault.mutated, Label::Buggy)
                        .with_origin(&unit.origin)
                        .with_archetype(fault.archetype),
                );
                self.stats.clean += 1;
                self.stats.variants_injected += 1;
                *self.stats.per_archetype.entry(fault.archetype).or_insert(0) += 1;
                debug!(
                    origin = %unit.origin.display(),
                    line = unit.start_line,
                    kind = %unit.kind,
                    archetype = %fault.archetype,
                    "clean unit paired with variant"
                );
            }
            Verdict::Buggy { error } => {
                self.corpus.push(
                    LabeledExample::new(unit.text.clone(), Label::Buggy).with_origin(&unit.origin),
                );
                self.stats.buggy_baseline += 1;
                debug!(origin = %unit.origin.display(), line = unit.start_line, %error, "unit is buggy");
            }
            Verdict::Indeterminate { reason } => {
                warn!(origin = %unit.origin.display(), line = unit.start_line, %reason, "no verdict, skipping unit");
                self.stats.indeterminate += 1;
            }
        }
    }

    /// Shuffle the corpus and return it with final statistics
    #[must_use]
    pub fn finish(mut self) -> (ShuffledCorpus, PipelineStats) {
        if let Some(pb) = &self.progress {
            pb.finish_with_message("corpus assembled");
        }
        let shuffled = self.corpus.shuffle(&mut self.rng);
        self.stats.elapsed_ms =
            u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        (shuffled, self.stats)
    }
}

/// End-to-end corpus pipeline
#[derive(Debug, Clone, Default)]
pub struct DataPipeline {
    config: PipelineConfig,
}

impl DataPipeline {
    /// Create a pipeline with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create pipeline with custom configuration
    #[must_use]
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Set the repositories to process
    #[must_use]
    pub fn repositories<I, S>(mut self, repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.repositories = repositories.into_iter().map(Into::into).collect();
        self
    }

    /// Set the random seed
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set both artifact paths
    #[must_use]
    pub fn output_paths(mut self, json: impl Into<PathBuf>, csv: impl Into<PathBuf>) -> Self {
        self.config.json_path = json.into();
        self.config.csv_path = csv.into();
        self
    }

    /// Enable or disable the progress spinner
    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Build the shuffled corpus
    ///
    /// Repositories that cannot be acquired are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the Python grammar fails to load
    pub fn run(
        &self,
        materializer: &dyn Materializer,
        oracle: &dyn ExecutabilityCheck,
    ) -> Result<(ShuffledCorpus, PipelineStats)> {
        let seed = self.config.seed.unwrap_or_else(|| {
            let seed = rand::rng().random();
            info!(seed, "no seed configured, drew one from entropy");
            seed
        });
        info!(
            repositories = self.config.repositories.len(),
            oracle = oracle.name(),
            seed,
            "starting corpus build"
        );

        let mut assembler = CorpusAssembler::new(oracle, seed)?.show_progress(self.config.show_progress);
        for locator in &self.config.repositories {
            match materializer.materialize(locator) {
                Ok(root) => assembler.add_repository(&root, &self.config.extension),
                Err(e) => assembler.skip_repository(locator, &e),
            }
        }
        Ok(assembler.finish())
    }

    /// Build the corpus and write both artifacts
    ///
    /// Both files are written even when the corpus is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar fails to load or an artifact cannot
    /// be written
    pub fn run_and_export(
        &self,
        materializer: &dyn Materializer,
        oracle: &dyn ExecutabilityCheck,
    ) -> Result<PipelineStats> {
        let (corpus, stats) = self.run(materializer, oracle)?;
        export::export_all(&corpus, &self.config.json_path, &self.config.csv_path)?;
        Ok(stats)
    }
}
