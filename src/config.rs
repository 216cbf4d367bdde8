//! TOML configuration.
//!
//! A [`Config`] is loaded once at startup and passed explicitly to every
//! operation; nothing in the crate reads global state apart from the API key
//! environment variable named in `[completion]`. Every section has defaults,
//! so an empty file (or [`Config::minimal`]) is a valid configuration.
//!
//! ```toml
//! [upload]
//! root = "./uploads"
//!
//! [chunking]
//! strategy = "recursive"
//! chunk_size = 2500
//! overlap = 200
//!
//! [completion]
//! provider = "openai"
//! base_url = "https://api.groq.com/openai/v1"
//! model = "llama-3.3-70b-versatile"
//!
//! [server]
//! bind = "127.0.0.1:8000"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_upload_root")]
    pub root: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root: default_upload_root(),
        }
    }
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("./uploads")
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            skip_dirs: default_skip_dirs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_allowed_extensions() -> Vec<String> {
    [
        ".py", ".js", ".ts", ".html", ".css", ".json", ".md", ".txt", ".yml", ".yaml",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_skip_dirs() -> Vec<String> {
    [".git", "__pycache__", "node_modules", ".idea", ".vscode"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Which [`Splitter`](crate::chunk::Splitter) implementation to build.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    /// Separator-aware recursive splitting (paragraph, line, word, char).
    #[default]
    Recursive,
    /// Fixed character windows with overlap.
    Window,
}

impl std::str::FromStr for SplitStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "recursive" => Ok(SplitStrategy::Recursive),
            "window" => Ok(SplitStrategy::Window),
            other => Err(format!(
                "unknown split strategy '{}'. Must be recursive or window.",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default)]
    pub strategy: SplitStrategy,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// Documents at most this many characters long are sent whole.
    #[serde(default = "default_single_chunk_limit")]
    pub single_chunk_limit: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::default(),
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            single_chunk_limit: default_single_chunk_limit(),
        }
    }
}

fn default_chunk_size() -> usize {
    2500
}
fn default_overlap() -> usize {
    200
}
fn default_single_chunk_limit() -> usize {
    3000
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_completion_tokens: default_max_completion_tokens(),
            top_p: default_top_p(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_temperature() -> f32 {
    1.0
}
fn default_max_completion_tokens() -> u32 {
    8192
}
fn default_top_p() -> f32 {
    1.0
}
fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default = "default_readme_path")]
    pub readme_path: PathBuf,
    #[serde(default = "default_docs_path")]
    pub docs_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            readme_path: default_readme_path(),
            docs_path: default_docs_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./output/store.txt")
}
fn default_readme_path() -> PathBuf {
    PathBuf::from("./output/README.md")
}
fn default_docs_path() -> PathBuf {
    PathBuf::from("./output/DOCUMENTATION.md")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Request body limit for `/save`.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

impl Config {
    /// All defaults; used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Checks cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            anyhow::bail!("chunking.chunk_size must be > 0");
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            anyhow::bail!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.overlap,
                self.chunking.chunk_size
            );
        }
        if self.discovery.allowed_extensions.is_empty() {
            anyhow::bail!("discovery.allowed_extensions must not be empty");
        }
        match self.completion.provider.as_str() {
            "disabled" | "openai" => {}
            other => anyhow::bail!(
                "Unknown completion provider: '{}'. Must be disabled or openai.",
                other
            ),
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.chunking.chunk_size, 2500);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.chunking.single_chunk_limit, 3000);
        assert_eq!(config.chunking.strategy, SplitStrategy::Recursive);
        assert_eq!(config.completion.model, "llama-3.3-70b-versatile");
        assert_eq!(config.completion.max_completion_tokens, 8192);
        assert_eq!(config.discovery.allowed_extensions.len(), 10);
        assert!(config.discovery.skip_dirs.contains(&".git".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sections() {
        let config: Config = toml::from_str(
            r#"
[upload]
root = "/tmp/up"

[chunking]
strategy = "window"
chunk_size = 100
overlap = 10

[completion]
provider = "disabled"
"#,
        )
        .unwrap();
        assert_eq!(config.upload.root, PathBuf::from("/tmp/up"));
        assert_eq!(config.chunking.strategy, SplitStrategy::Window);
        assert_eq!(config.chunking.chunk_size, 100);
        assert_eq!(config.completion.provider, "disabled");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let mut config = Config::minimal();
        config.chunking.overlap = config.chunking.chunk_size;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("overlap"), "{}", err);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = Config::minimal();
        config.chunking.chunk_size = 0;
        config.chunking.overlap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = Config::minimal();
        config.completion.provider = "carrier-pigeon".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_reports_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("window".parse::<SplitStrategy>(), Ok(SplitStrategy::Window));
        assert!("tokens".parse::<SplitStrategy>().is_err());
    }
}
