//! README and documentation generation from the summary store.

use std::path::PathBuf;

use crate::completion::CompletionClient;
use crate::config::Config;
use crate::error::{Result, ScribeError};
use crate::models::Message;
use crate::prompts;
use crate::store::{ensure_parent, SummaryStore};

/// A generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Readme,
    Documentation,
}

impl Artifact {
    pub fn prompt(self) -> &'static str {
        match self {
            Artifact::Readme => prompts::README,
            Artifact::Documentation => prompts::DOCUMENTATION,
        }
    }

    pub fn output_path(self, config: &Config) -> PathBuf {
        match self {
            Artifact::Readme => config.output.readme_path.clone(),
            Artifact::Documentation => config.output.docs_path.clone(),
        }
    }

    /// Human-readable label used in status messages.
    pub fn label(self) -> &'static str {
        match self {
            Artifact::Readme => "README",
            Artifact::Documentation => "Documentation",
        }
    }
}

/// Generates one artifact from the whole summary store with a single
/// completion call, writes it to its output path and returns the text.
///
/// The output file is truncated before anything else, so a failed run
/// leaves it empty rather than stale.
pub async fn generate(
    config: &Config,
    client: &dyn CompletionClient,
    artifact: Artifact,
) -> Result<String> {
    let output = artifact.output_path(config);
    ensure_parent(&output)?;
    std::fs::File::create(&output).map_err(|e| ScribeError::io(&output, e))?;

    let content = SummaryStore::from_config(config).read()?;

    let messages = [Message::system(artifact.prompt()), Message::user(content)];
    let text = client.complete(&messages).await.map_err(|e| {
        tracing::warn!(artifact = artifact.label(), error = %e, "generation failed");
        e
    })?;

    std::fs::write(&output, &text).map_err(|e| ScribeError::io(&output, e))?;
    tracing::info!(
        artifact = artifact.label(),
        path = %output.display(),
        bytes = text.len(),
        "artifact generated"
    );

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FixedClient {
        reply: Option<String>,
        seen: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl CompletionClient for FixedClient {
        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, messages: &[Message]) -> Result<String> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            self.reply
                .clone()
                .ok_or_else(|| ScribeError::Completion("unauthorized".into()))
        }
    }

    fn client(reply: Option<&str>) -> FixedClient {
        FixedClient {
            reply: reply.map(str::to_string),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn config(tmp: &TempDir) -> Config {
        let mut config = Config::minimal();
        config.output.store_path = tmp.path().join("store.txt");
        config.output.readme_path = tmp.path().join("gen/README.md");
        config.output.docs_path = tmp.path().join("gen/DOCUMENTATION.md");
        config
    }

    #[tokio::test]
    async fn test_generate_readme_writes_file() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        std::fs::write(&config.output.store_path, "FILE: a.py\nsummary").unwrap();

        let client = client(Some("# Project"));
        let text = generate(&config, &client, Artifact::Readme).await.unwrap();
        assert_eq!(text, "# Project");
        assert_eq!(
            std::fs::read_to_string(&config.output.readme_path).unwrap(),
            "# Project"
        );

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].content, prompts::README);
        assert_eq!(seen[1].content, "FILE: a.py\nsummary");
    }

    #[tokio::test]
    async fn test_generate_docs_uses_docs_prompt() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        std::fs::write(&config.output.store_path, "s").unwrap();

        let client = client(Some("# Docs"));
        generate(&config, &client, Artifact::Documentation)
            .await
            .unwrap();
        assert_eq!(client.seen.lock().unwrap()[0].content, prompts::DOCUMENTATION);
        assert!(config.output.docs_path.exists());
        assert!(!config.output.readme_path.exists());
    }

    #[tokio::test]
    async fn test_missing_store() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        let client = client(Some("unused"));
        let err = generate(&config, &client, Artifact::Readme)
            .await
            .unwrap_err();
        assert!(matches!(err, ScribeError::StoreMissing(_)));
        assert!(client.seen.lock().unwrap().is_empty());
        // Truncated even though nothing was generated.
        assert_eq!(
            std::fs::read_to_string(&config.output.readme_path).unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn test_completion_failure_leaves_empty_output() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        std::fs::write(&config.output.store_path, "s").unwrap();
        std::fs::create_dir_all(config.output.readme_path.parent().unwrap()).unwrap();
        std::fs::write(&config.output.readme_path, "stale readme").unwrap();

        let err = generate(&config, &client(None), Artifact::Readme)
            .await
            .unwrap_err();
        assert!(matches!(err, ScribeError::Completion(_)));
        assert_eq!(
            std::fs::read_to_string(&config.output.readme_path).unwrap(),
            ""
        );
    }
}
