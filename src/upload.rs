//! Upload root management.
//!
//! Uploaded files land under `[upload].root`. Replacing the previous upload
//! is an explicit step: callers invoke [`UploadStore::reset`] before saving a
//! new batch. Nothing else in the crate deletes the root.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, ScribeError};

/// Turns a client-supplied file name into a path relative to the upload root.
///
/// Removes every `..` sequence, then strips leading `/` and `\` characters,
/// so the result can never climb out of the root. Names that do not end in a
/// file name (empty, `.`, or a trailing separator) are rejected.
///
/// ```rust
/// use repo_scribe::upload::sanitize_relative_path;
///
/// assert_eq!(sanitize_relative_path("../../etc/passwd").unwrap(), "etc/passwd");
/// assert_eq!(sanitize_relative_path("/src/app.py").unwrap(), "src/app.py");
/// assert!(sanitize_relative_path("..").is_err());
/// ```
pub fn sanitize_relative_path(name: &str) -> Result<String> {
    let cleaned = name.replace("..", "");
    let cleaned = cleaned.trim_start_matches(&['/', '\\'][..]);
    let file_name = cleaned.rsplit(&['/', '\\'][..]).next().unwrap_or_default();
    if file_name.is_empty() || file_name == "." {
        return Err(ScribeError::InvalidPath(name.to_string()));
    }
    Ok(cleaned.to_string())
}

/// The directory holding the current upload.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.upload.root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deletes the upload root (if present) and recreates it empty.
    pub fn reset(&self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root).map_err(|e| ScribeError::io(&self.root, e))?;
        }
        std::fs::create_dir_all(&self.root).map_err(|e| ScribeError::io(&self.root, e))?;
        tracing::info!(root = %self.root.display(), "upload root reset");
        Ok(())
    }

    /// Writes one uploaded file under the root and returns its full path.
    pub fn save(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let relative = sanitize_relative_path(name)?;
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ScribeError::io(parent, e))?;
        }
        std::fs::write(&path, contents).map_err(|e| ScribeError::io(&path, e))?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "saved upload");
        Ok(path)
    }

    /// Copies every file under a local directory into the root, keeping
    /// relative paths. Does not reset first.
    pub fn import_dir(&self, source: &Path) -> Result<Vec<PathBuf>> {
        let mut saved = Vec::new();
        for entry in walkdir::WalkDir::new(source).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                ScribeError::io(
                    path,
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected")),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let contents =
                std::fs::read(entry.path()).map_err(|e| ScribeError::io(entry.path(), e))?;
            saved.push(self.save(&name, &contents)?);
        }
        Ok(saved)
    }
}
