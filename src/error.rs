//! Error taxonomy for the summarize and generate pipelines.
//!
//! Every library operation returns [`Result`]. The HTTP layer maps each
//! variant to a status code and a machine-readable error code (see
//! [`ScribeError::code`]); the CLI simply prints the message.

use std::path::PathBuf;

/// Errors produced by library operations.
#[derive(Debug, thiserror::Error)]
pub enum ScribeError {
    /// The intermediate summary store has not been written yet.
    #[error("summary store missing: {}", .0.display())]
    StoreMissing(PathBuf),

    /// The completion service failed (network, auth, quota, malformed reply).
    #[error("completion service failed: {0}")]
    Completion(String),

    /// Discovery found nothing to summarize under the upload root.
    #[error("no eligible files found under {}", .0.display())]
    NoFiles(PathBuf),

    /// An uploaded file name was empty after sanitizing.
    #[error("invalid upload path: {0:?}")]
    InvalidPath(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScribeError {
    /// Wraps an I/O error together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScribeError::Io {
            path: path.into(),
            source,
        }
    }

    /// Machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ScribeError::StoreMissing(_) => "store_missing",
            ScribeError::Completion(_) => "completion_failed",
            ScribeError::NoFiles(_) => "no_files",
            ScribeError::InvalidPath(_) => "bad_request",
            ScribeError::Config(_) | ScribeError::Io { .. } => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            ScribeError::StoreMissing("store.txt".into()).code(),
            "store_missing"
        );
        assert_eq!(
            ScribeError::Completion("timeout".into()).code(),
            "completion_failed"
        );
        assert_eq!(ScribeError::NoFiles("uploads".into()).code(), "no_files");
        assert_eq!(ScribeError::InvalidPath("..".into()).code(), "bad_request");
    }

    #[test]
    fn test_io_message_names_path() {
        let err = ScribeError::io(
            "uploads/a.py",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("uploads/a.py"), "{}", msg);
        assert!(msg.contains("gone"), "{}", msg);
    }
}
