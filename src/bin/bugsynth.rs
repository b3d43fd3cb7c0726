//! bugsynth CLI - build a clean/buggy Python corpus
//!
//! With no flags, clones the default repositories into `repos/` and writes
//! `dataset_realistic_bug.json` and `dataset_realistic_bug.csv`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use bugsynth::data::pipeline::{DEFAULT_CSV_PATH, DEFAULT_JSON_PATH, DEFAULT_REPOS_DIR};
use bugsynth::data::{DataPipeline, PipelineConfig, PipelineStats};
use bugsynth::oracle::{ExecutabilityCheck, OracleConfig, PythonOracle, SyntaxOracle};
use bugsynth::source::{GitMaterializer, LocalMaterializer, Materializer};
use bugsynth::{Error, Result};

/// bugsynth - labeled clean/buggy corpus builder for Python
#[derive(Parser)]
#[command(name = "bugsynth")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Repository to process (repeatable; defaults to the built-in list)
    #[arg(short, long = "repo", value_name = "LOCATOR")]
    repos: Vec<String>,

    /// Treat repository arguments as local directories instead of git URLs
    #[arg(long)]
    local: bool,

    /// Directory remote repositories are cloned into
    #[arg(long, default_value = DEFAULT_REPOS_DIR)]
    repos_dir: PathBuf,

    /// JSON output path
    #[arg(long, default_value = DEFAULT_JSON_PATH)]
    json: PathBuf,

    /// CSV output path
    #[arg(long, default_value = DEFAULT_CSV_PATH)]
    csv: PathBuf,

    /// Random seed for archetype selection and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// How units are labeled
    #[arg(long, value_enum, default_value_t = OracleKind::Python)]
    oracle: OracleKind,

    /// Python interpreter used by the python oracle
    #[arg(long, default_value = "python3")]
    interpreter: String,

    /// Kill evaluations that run longer than this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Show a progress spinner
    #[arg(long)]
    progress: bool,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OracleKind {
    /// Evaluate each unit in a fresh interpreter
    Python,
    /// Parse only, no interpreter needed
    Syntax,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let defaults = PipelineConfig::default();
    let config = PipelineConfig {
        repositories: if cli.repos.is_empty() {
            defaults.repositories
        } else {
            cli.repos.clone()
        },
        repos_dir: cli.repos_dir.clone(),
        json_path: cli.json.clone(),
        csv_path: cli.csv.clone(),
        seed: cli.seed,
        show_progress: cli.progress,
        extension: defaults.extension,
    };

    let oracle: Box<dyn ExecutabilityCheck> = match cli.oracle {
        OracleKind::Python => {
            let oracle = PythonOracle::with_config(OracleConfig {
                interpreter: cli.interpreter.clone(),
                timeout_ms: cli.timeout_ms,
            });
            if !oracle.is_available() {
                return Err(Error::Configuration(format!(
                    "python interpreter `{}` cannot be run",
                    cli.interpreter
                )));
            }
            Box::new(oracle)
        }
        OracleKind::Syntax => Box::new(SyntaxOracle::new()?),
    };

    let materializer: Box<dyn Materializer> = if cli.local {
        Box::new(LocalMaterializer)
    } else {
        Box::new(GitMaterializer::new(&config.repos_dir))
    };

    let pipeline = DataPipeline::with_config(config);
    let stats = pipeline.run_and_export(materializer.as_ref(), oracle.as_ref())?;
    print_summary(&stats, pipeline.config());
    Ok(())
}

fn print_summary(stats: &PipelineStats, config: &PipelineConfig) {
    println!("Corpus Summary");
    println!("==============");
    println!("Seed:               {}", stats.seed);
    println!("Repositories:       {} ({} failed)", stats.repositories, stats.repositories_failed);
    println!("Files scanned:      {}", stats.files_scanned);
    println!("Parse failures:     {}", stats.parse_failures);
    println!("Units extracted:    {}", stats.units_extracted);
    println!();
    println!("Labels:");
    println!("  Clean:            {} ({:.1}%)", stats.clean, stats.clean_rate());
    println!("  Buggy (baseline): {}", stats.buggy_baseline);
    println!("  Variants:         {}", stats.variants_injected);
    println!("  Indeterminate:    {}", stats.indeterminate);
    println!("  Oracle errors:    {}", stats.oracle_errors);
    if !stats.per_archetype.is_empty() {
        println!();
        println!("Archetypes:");
        for (archetype, count) in &stats.per_archetype {
            println!("  {:<28}{count}", archetype.to_string());
        }
    }
    println!();
    println!("Total examples collected: {}", stats.total_examples());
    println!("Wrote {}", config.json_path.display());
    println!("Wrote {}", config.csv_path.display());
    println!("Elapsed: {}ms", stats.elapsed_ms);
}
