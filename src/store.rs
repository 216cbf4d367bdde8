//! The summary store: the text file bridging summarization and generation.
//!
//! A summarize run truncates the store and appends one block per file; the
//! generate step reads it back whole. Each block is terminated by a rule of
//! sixty `=` characters.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, ScribeError};

/// Separator written after every file summary.
pub fn block_separator() -> String {
    format!("\n\n{}\n\n", "=".repeat(60))
}

#[derive(Debug, Clone)]
pub struct SummaryStore {
    path: PathBuf,
}

impl SummaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.output.store_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the store or empties an existing one.
    pub fn truncate(&self) -> Result<()> {
        ensure_parent(&self.path)?;
        std::fs::File::create(&self.path).map_err(|e| ScribeError::io(&self.path, e))?;
        Ok(())
    }

    /// Appends one file summary followed by the block separator.
    pub fn append(&self, summary: &str) -> Result<()> {
        ensure_parent(&self.path)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ScribeError::io(&self.path, e))?;
        file.write_all(summary.as_bytes())
            .and_then(|_| file.write_all(block_separator().as_bytes()))
            .map_err(|e| ScribeError::io(&self.path, e))
    }

    /// Reads the whole store.
    pub fn read(&self) -> Result<String> {
        if !self.path.exists() {
            return Err(ScribeError::StoreMissing(self.path.clone()));
        }
        std::fs::read_to_string(&self.path).map_err(|e| ScribeError::io(&self.path, e))
    }
}

/// Creates the parent directory of `path` if it has one.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| ScribeError::io(parent, e))
        }
        _ => Ok(()),
    }
}
