//! # Repo Scribe CLI (`scribe`)
//!
//! ## Usage
//!
//! ```bash
//! scribe --config ./config/scribe.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scribe serve` | Start the HTTP server |
//! | `scribe upload <dir>` | Replace the upload root with a local directory |
//! | `scribe reset` | Empty the upload root |
//! | `scribe files` | List files eligible for summarization |
//! | `scribe chunk <file>` | Show how a file would be chunked |
//! | `scribe summarize` | Summarize every uploaded file into the summary store |
//! | `scribe readme` | Generate the README from the summary store |
//! | `scribe docs` | Generate the technical documentation |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).
//! A `.env` file in the working directory is loaded before anything else,
//! which is the usual place for `GROQ_API_KEY`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use repo_scribe::chunk::{chunk_document, create_splitter};
use repo_scribe::completion::create_client;
use repo_scribe::config::{self, Config, SplitStrategy};
use repo_scribe::discovery;
use repo_scribe::generate::{generate, Artifact};
use repo_scribe::models::Document;
use repo_scribe::summarize::summarize_project;
use repo_scribe::upload::UploadStore;

/// Repo Scribe: summarize a project file by file with an LLM and generate
/// its README and technical documentation.
#[derive(Parser)]
#[command(name = "scribe", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When the file does not exist, built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/scribe.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Reset the upload root and copy a local directory into it.
    Upload {
        /// Project directory to upload.
        dir: PathBuf,
    },

    /// Delete everything under the upload root.
    Reset,

    /// List the files that `summarize` would process.
    Files,

    /// Show how a file would be chunked, without calling the completion service.
    Chunk {
        /// File to chunk.
        path: PathBuf,

        /// Override `[chunking].strategy` (`recursive` or `window`).
        #[arg(long)]
        strategy: Option<SplitStrategy>,

        /// Override `[chunking].chunk_size`.
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Override `[chunking].overlap`.
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Summarize every uploaded file into the summary store.
    Summarize,

    /// Generate the README from the summary store.
    Readme,

    /// Generate the technical documentation from the summary store.
    Docs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            repo_scribe::server::run_server(&cfg).await?;
        }
        Commands::Upload { dir } => {
            if !dir.is_dir() {
                anyhow::bail!("not a directory: {}", dir.display());
            }
            let uploads = UploadStore::from_config(&cfg);
            uploads.reset()?;
            let saved = uploads.import_dir(&dir)?;
            println!("uploaded {} files to {}", saved.len(), uploads.root().display());
        }
        Commands::Reset => {
            let uploads = UploadStore::from_config(&cfg);
            uploads.reset()?;
            println!("reset {}", uploads.root().display());
        }
        Commands::Files => {
            let files = discovery::discover_files(&cfg)?;
            for file in &files {
                println!("{}", file.relative);
            }
            println!("{} eligible files", files.len());
        }
        Commands::Chunk {
            path,
            strategy,
            chunk_size,
            overlap,
        } => {
            let mut chunking = cfg.chunking.clone();
            if let Some(s) = strategy {
                chunking.strategy = s;
            }
            if let Some(n) = chunk_size {
                chunking.chunk_size = n;
            }
            if let Some(n) = overlap {
                chunking.overlap = n;
            }
            let mut check = cfg.clone();
            check.chunking = chunking.clone();
            check.validate()?;

            let text = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let document = Document {
                path: path.display().to_string(),
                text: String::from_utf8_lossy(&text).into_owned(),
            };
            let splitter = create_splitter(&chunking);
            let chunks = chunk_document(splitter.as_ref(), &document, chunking.single_chunk_limit);

            println!(
                "{}: {} chars, {} chunks ({})",
                document.path,
                document.char_len(),
                chunks.len(),
                splitter.name()
            );
            for c in &chunks {
                println!(
                    "  #{:<3} {:>7}..{:<7} overlap {}",
                    c.index, c.start, c.end, c.overlap
                );
            }
        }
        Commands::Summarize => {
            let client = create_client(&cfg.completion)?;
            let splitter = create_splitter(&cfg.chunking);
            let summaries = summarize_project(&cfg, client.as_ref(), splitter.as_ref()).await?;
            for s in &summaries {
                println!("{} ({} chunks)", s.path, s.chunks);
            }
            println!(
                "summarized {} files into {}",
                summaries.len(),
                cfg.output.store_path.display()
            );
        }
        Commands::Readme => run_generate(&cfg, Artifact::Readme).await?,
        Commands::Docs => run_generate(&cfg, Artifact::Documentation).await?,
    }

    Ok(())
}

async fn run_generate(cfg: &Config, artifact: Artifact) -> anyhow::Result<()> {
    let client = create_client(&cfg.completion)?;
    generate(cfg, client.as_ref(), artifact).await?;
    println!(
        "{} generated successfully: {}",
        artifact.label(),
        artifact.output_path(cfg).display()
    );
    Ok(())
}

fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}
