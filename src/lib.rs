//! # Repo Scribe
//!
//! Turns an uploaded project into a generated README and technical
//! documentation with the help of an LLM completion service.
//!
//! Each eligible file is split into overlapping chunks that fit the model's
//! context budget, every chunk is summarized, and the per-file summaries are
//! accumulated in a summary store. The README and the documentation are each
//! generated from the whole store with a single completion call.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌─────────┐   ┌────────────┐   ┌──────────┐
//! │  Upload  │──▶│ Discovery │──▶│ Chunker │──▶│ Completion │──▶│  Summary │
//! │  root    │   │ walk+glob │   │         │   │  service   │   │  store   │
//! └──────────┘   └───────────┘   └─────────┘   └────────────┘   └────┬─────┘
//!                                                                    │
//!                                           ┌────────────────────────┤
//!                                           ▼                        ▼
//!                                     ┌──────────┐           ┌──────────────┐
//!                                     │ README.md│           │DOCUMENTATION │
//!                                     └──────────┘           └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! scribe upload ./my-project    # replace the upload root with a local folder
//! scribe summarize              # per-file summaries into the store
//! scribe readme                 # README from the store
//! scribe docs                   # documentation from the store
//! scribe serve                  # or do all of it over HTTP
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Error taxonomy |
//! | [`chunk`] | Overlapping text chunking |
//! | [`upload`] | Upload root reset and file saving |
//! | [`discovery`] | Upload root traversal and filtering |
//! | [`completion`] | Completion service abstraction |
//! | [`prompts`] | System prompts |
//! | [`store`] | Summary store |
//! | [`summarize`] | Per-file summarization pipeline |
//! | [`generate`] | README and documentation generation |
//! | [`server`] | HTTP server |

pub mod chunk;
pub mod completion;
pub mod config;
pub mod discovery;
pub mod error;
pub mod generate;
pub mod models;
pub mod prompts;
pub mod server;
pub mod store;
pub mod summarize;
pub mod upload;
