//! Core data models used throughout Repo Scribe.
//!
//! These types represent the documents, chunks, chat messages and per-file
//! summaries that flow through the summarize pipeline.

use serde::{Deserialize, Serialize};

/// A single uploaded file's full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the upload root, `/` separated.
    pub path: String,
    pub text: String,
}

impl Document {
    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A window of a document's text.
///
/// Offsets are character offsets into the source text, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    /// Characters shared with the previous chunk (0 for the first).
    pub overlap: usize,
    pub text: String,
}

/// Chat message role in the OpenAI wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged message sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The combined summary of one file, as written to the summary store.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub chunks: usize,
    pub summary: String,
}
