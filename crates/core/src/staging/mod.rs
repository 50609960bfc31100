//! Source staging.
//!
//! Writes a snapshot of the editor buffer into a fresh, uniquely named
//! temporary directory so that compilers and interpreters have a file to
//! work on. The directory is removed when the [`StagedSource`] is dropped,
//! which happens on every exit path of a build or when the owning session
//! is replaced.

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::registry::descriptor_for;
use nc_protocol::Language;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of every staging directory.
pub const STAGING_PREFIX: &str = "nocopy";

/// A source snapshot written to disk.
#[derive(Debug)]
pub struct StagedSource {
    dir: TempDir,
    path: PathBuf,
    extension: &'static str,
    entry_point: Option<String>,
}

impl StagedSource {
    /// Directory holding the staged file; also the output directory for
    /// class files.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the staged source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> &'static str {
        self.extension
    }

    /// Name discovered from the source for name-matched languages.
    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }
}

/// Stage `source` for `language` under the configured work directory.
///
/// For name-matched languages the file is named after the discovered entry
/// point (`Greeter.java`); other languages use `main<ext>`. Each call
/// creates a new directory, so two calls never return the same path.
///
/// # Errors
///
/// Returns `HarnessError::Staging` if the work directory, the staging
/// directory or the file cannot be written.
pub fn stage(language: Language, source: &str, config: &HarnessConfig) -> HarnessResult<StagedSource> {
    let descriptor = descriptor_for(language);
    let entry_point = descriptor.entry_point.discover(source);

    let work_dir = config.work_dir();
    std::fs::create_dir_all(&work_dir).map_err(|source| HarnessError::Staging { source })?;

    let dir = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(&work_dir)
        .map_err(|source| HarnessError::Staging { source })?;

    let stem = entry_point.as_deref().unwrap_or("main");
    let path = dir.path().join(format!("{stem}{}", descriptor.extension));

    std::fs::write(&path, source).map_err(|source| HarnessError::Staging { source })?;

    tracing::debug!(
        language = %language,
        path = %path.display(),
        "staged source"
    );

    Ok(StagedSource {
        dir,
        path,
        extension: descriptor.extension,
        entry_point,
    })
}
