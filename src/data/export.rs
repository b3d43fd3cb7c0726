//! Corpus serialization
//!
//! Two artifacts are written from the same [`ShuffledCorpus`], in the same
//! order:
//!
//! - **JSON**: an array of `{"snippet": ..., "label": 0|1}` objects,
//!   indented by four spaces.
//! - **CSV**: `id,snippet,label` with a 1-based positional id. Newlines in a
//!   snippet are written as the two characters `\n` so every record stays
//!   on one line.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use super::{LabeledExample, ShuffledCorpus};
use crate::{Error, Result};

/// Header row of the CSV artifact
pub const CSV_HEADER: [&str; 3] = ["id", "snippet", "label"];

/// Write the corpus as a JSON array to `path`
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn write_json(corpus: &ShuffledCorpus, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_json_to(corpus, &mut writer)?;
    writer.flush()?;
    info!(path = %path.display(), examples = corpus.len(), "wrote JSON corpus");
    Ok(())
}

/// Write the corpus as a JSON array to any writer
///
/// # Errors
///
/// Returns an error if serialization or the underlying write fails
pub fn write_json_to<W: Write>(corpus: &ShuffledCorpus, writer: W) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    corpus
        .examples()
        .serialize(&mut serializer)
        .map_err(|e| Error::Serialization(format!("JSON export failed: {e}")))
}

/// Write the corpus as CSV to `path`
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn write_csv(corpus: &ShuffledCorpus, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv_to(corpus, BufWriter::new(file))?;
    info!(path = %path.display(), rows = corpus.len(), "wrote CSV corpus");
    Ok(())
}

/// Write the corpus as CSV to any writer
///
/// # Errors
///
/// Returns an error if the underlying write fails
pub fn write_csv_to<W: Write>(corpus: &ShuffledCorpus, writer: W) -> Result<()> {
    let csv_error = |e: csv::Error| Error::Serialization(format!("CSV export failed: {e}"));
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for (index, example) in corpus.examples().iter().enumerate() {
        let id = (index + 1).to_string();
        let snippet = escape_newlines(&example.snippet);
        let label = example.label.to_string();
        writer
            .write_record([id.as_str(), snippet.as_str(), label.as_str()])
            .map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write both artifacts
///
/// # Errors
///
/// Returns an error if either file cannot be written
pub fn export_all(corpus: &ShuffledCorpus, json_path: &Path, csv_path: &Path) -> Result<()> {
    write_json(corpus, json_path)?;
    write_csv(corpus, csv_path)
}

/// Load examples from a JSON artifact
///
/// Provenance fields are not part of the artifact and come back as `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid corpus
pub fn read_json(path: &Path) -> Result<Vec<LabeledExample>> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| {
        Error::Serialization(format!("invalid corpus in {}: {e}", path.display()))
    })
}

fn escape_newlines(snippet: &str) -> String {
    snippet.replace('\n', "\\n")
}
