//! Source acquisition
//!
//! A [`Materializer`] turns a repository locator into a local directory;
//! [`source_files`] walks that directory for Python files.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::{Error, Result};

/// Resolves a repository locator to a local directory
pub trait Materializer {
    /// Make the repository available locally and return its root
    ///
    /// # Errors
    ///
    /// Returns [`Error::Acquisition`] if the repository cannot be made available
    fn materialize(&self, locator: &str) -> Result<PathBuf>;
}

/// Shallow-clones remote repositories into a base directory
///
/// A repository whose target directory already exists is reused as is,
/// without fetching.
#[derive(Debug, Clone)]
pub struct GitMaterializer {
    base_dir: PathBuf,
    git: String,
}

impl GitMaterializer {
    /// Clone into `base_dir` using `git` from `PATH`
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            git: "git".to_string(),
        }
    }

    /// Use a different git executable
    #[must_use]
    pub fn with_git(mut self, git: impl Into<String>) -> Self {
        self.git = git.into();
        self
    }

    /// Directory a locator is cloned into
    ///
    /// # Errors
    ///
    /// Returns [`Error::Acquisition`] if the locator has no usable name
    pub fn target_dir(&self, locator: &str) -> Result<PathBuf> {
        let name = repository_name(locator).ok_or_else(|| Error::Acquisition {
            locator: locator.to_string(),
            message: "cannot derive a directory name".to_string(),
        })?;
        Ok(self.base_dir.join(name))
    }
}

impl Materializer for GitMaterializer {
    fn materialize(&self, locator: &str) -> Result<PathBuf> {
        let target = self.target_dir(locator)?;
        if target.exists() {
            info!(repository = locator, path = %target.display(), "reusing existing clone");
            return Ok(target);
        }

        let acquisition_error = |message: String| Error::Acquisition {
            locator: locator.to_string(),
            message,
        };

        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| acquisition_error(format!("cannot create {}: {e}", self.base_dir.display())))?;

        info!(repository = locator, path = %target.display(), "cloning");
        let output = Command::new(&self.git)
            .args(["clone", "--depth", "1", locator])
            .arg(&target)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| acquisition_error(format!("failed to run {}: {e}", self.git)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
            return Err(acquisition_error(format!(
                "git clone exited with {}: {}",
                output.status,
                detail.trim()
            )));
        }
        Ok(target)
    }
}

/// Treats locators as paths to existing directories
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMaterializer;

impl Materializer for LocalMaterializer {
    fn materialize(&self, locator: &str) -> Result<PathBuf> {
        let path = PathBuf::from(locator);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(Error::Acquisition {
                locator: locator.to_string(),
                message: "not a directory".to_string(),
            })
        }
    }
}

/// Last path segment of a locator, without a `.git` suffix
fn repository_name(locator: &str) -> Option<&str> {
    let trimmed = locator.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty() && name != "." && name != "..").then_some(name)
}

/// Lazily yield files under `root` with the given extension
///
/// Entries are visited in file-name order, so repeated runs see files in
/// the same sequence. `.git` directories are skipped. Unreadable entries
/// are logged and skipped.
pub fn source_files<'a>(root: &Path, extension: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(move |entry| is_source_file(entry, extension))
        .map(|entry| {
            debug!(path = %entry.path().display(), "found source file");
            entry.into_path()
        })
}

fn is_source_file(entry: &DirEntry, extension: &str) -> bool {
    entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new(extension))
}
