//! Upload-root file discovery.
//!
//! Walks `[upload].root` and returns the files worth summarizing: noise
//! directories (`.git`, `node_modules`, ...) are never descended into, and a
//! file must carry an allow-listed extension and match no exclude glob.
//! Results are sorted by relative path for deterministic ordering.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{Config, DiscoveryConfig};
use crate::error::{Result, ScribeError};
use crate::models::Document;

/// A file found under the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Path relative to the upload root, `/` separated.
    pub relative: String,
}

/// Lists eligible files under the upload root. A missing root yields none.
pub fn discover_files(config: &Config) -> Result<Vec<DiscoveredFile>> {
    let root = &config.upload.root;
    if !root.exists() {
        tracing::warn!(root = %root.display(), "upload root does not exist");
        return Ok(Vec::new());
    }

    let discovery = &config.discovery;
    let exclude_set = build_globset(&discovery.exclude_globs)?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(discovery.follow_symlinks)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e, discovery));

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if !has_allowed_extension(path, &discovery.allowed_extensions) {
            continue;
        }
        if exclude_set.is_match(&rel_str) {
            continue;
        }

        files.push(DiscoveredFile {
            path: path.to_path_buf(),
            relative: rel_str,
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    tracing::debug!(count = files.len(), root = %root.display(), "discovered files");

    Ok(files)
}

/// Discovers files and reads each one. Invalid UTF-8 is replaced, never fatal.
pub fn load_documents(config: &Config) -> Result<Vec<Document>> {
    discover_files(config)?
        .into_iter()
        .map(|file| {
            let bytes = std::fs::read(&file.path).map_err(|e| ScribeError::io(&file.path, e))?;
            Ok(Document {
                path: file.relative,
                text: String::from_utf8_lossy(&bytes).into_owned(),
            })
        })
        .collect()
}

fn is_skipped_dir(entry: &walkdir::DirEntry, discovery: &DiscoveryConfig) -> bool {
    entry.file_type().is_dir()
        && discovery
            .skip_dirs
            .iter()
            .any(|d| entry.file_name().to_string_lossy() == d.as_str())
}

/// Case-insensitive match against extensions written with a leading dot.
fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    let ext = match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
        None => return false,
    };
    allowed.iter().any(|a| a.to_lowercase() == ext)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| ScribeError::Config(format!("bad exclude glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ScribeError::Config(format!("bad exclude globs: {}", e)))
}

fn walk_error(root: &Path, err: walkdir::Error) -> ScribeError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    ScribeError::io(path, source)
}
