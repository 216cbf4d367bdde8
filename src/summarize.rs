//! Summarization pipeline orchestration.
//!
//! Coordinates the per-file flow: discovery → chunking → one completion call
//! per chunk → summary store. Files and their chunks are processed strictly
//! in order. The first completion failure aborts the run; summaries already
//! appended to the store stay there.

use crate::chunk::{chunk_document, Splitter};
use crate::completion::CompletionClient;
use crate::config::Config;
use crate::discovery;
use crate::error::{Result, ScribeError};
use crate::models::{Document, FileSummary, Message};
use crate::prompts;
use crate::store::SummaryStore;

/// Summarizes every eligible file under the upload root.
///
/// Truncates the summary store first, then appends each file's combined
/// summary as soon as it is complete. Returns the summaries in file order.
///
/// # Errors
///
/// - [`ScribeError::NoFiles`] when discovery finds nothing.
/// - [`ScribeError::Completion`] on the first failed completion call.
pub async fn summarize_project(
    config: &Config,
    client: &dyn CompletionClient,
    splitter: &dyn Splitter,
) -> Result<Vec<FileSummary>> {
    let store = SummaryStore::from_config(config);
    store.truncate()?;

    let documents = discovery::load_documents(config)?;
    if documents.is_empty() {
        return Err(ScribeError::NoFiles(config.upload.root.clone()));
    }

    tracing::info!(
        files = documents.len(),
        splitter = splitter.name(),
        model = client.model_name(),
        "summarizing project"
    );

    let mut summaries = Vec::with_capacity(documents.len());
    for document in &documents {
        let summary = summarize_document(config, client, splitter, document).await?;
        store.append(&summary.summary)?;
        summaries.push(summary);
    }

    let total_chunks: usize = summaries.iter().map(|s| s.chunks).sum();
    tracing::info!(
        files = summaries.len(),
        chunks = total_chunks,
        store = %store.path().display(),
        "summary store written"
    );

    Ok(summaries)
}

/// Summarizes one document, one completion call per chunk. Replies are
/// concatenated, each followed by a newline.
pub async fn summarize_document(
    config: &Config,
    client: &dyn CompletionClient,
    splitter: &dyn Splitter,
    document: &Document,
) -> Result<FileSummary> {
    let chunks = chunk_document(splitter, document, config.chunking.single_chunk_limit);
    let mut combined = String::new();
    for chunk in &chunks {
        let messages = [
            Message::system(prompts::FILE_ANALYZER),
            Message::user(prompts::file_chunk_message(&document.path, &chunk.text)),
        ];
        let reply = client.complete(&messages).await.map_err(|e| {
            tracing::warn!(path = %document.path, chunk = chunk.index, error = %e, "chunk summary failed");
            e
        })?;
        combined.push_str(&reply);
        combined.push('\n');
    }

    tracing::debug!(path = %document.path, chunks = chunks.len(), "file summarized");

    Ok(FileSummary {
        path: document.path.clone(),
        chunks: chunks.len(),
        summary: combined,
    })
}
