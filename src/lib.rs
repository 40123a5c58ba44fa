//! Command Clinic - local usage telemetry for a command launcher
//!
//! Records launcher input and command-launch events, keeps them for a
//! bounded window, and periodically asks an external LLM service for
//! optimization proposals (shortcuts, snippets, macros) plus hints about
//! extensions worth installing.
//!
//! # Architecture
//!
//! - **Types**: the shared data model (events, launch targets, aliases,
//!   proposals)
//! - **Storage**: the day-partitioned append-only event log and the
//!   bounded alias registry
//! - **Services**: the analysis pipeline (deterministic prompt, rate
//!   limit, bounded external call, fail-soft response parsing)
//!
//! # Example
//!
//! ```ignore
//! use command_clinic::{AnalysisPipeline, EventStore, Settings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let store = EventStore::new(&settings.support_dir);
//!
//!     store.log_input("search files").await?;
//!
//!     let events = store
//!         .read_recent(settings.lookback_days, settings.event_limit)
//!         .await?;
//!     let pipeline = AnalysisPipeline::from_settings(&settings);
//!     let analysis = pipeline.analyze(&events).await?;
//!
//!     for proposal in &analysis.proposals {
//!         println!("{}: {}", proposal.title, proposal.rationale);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::Settings;
pub use error::{ClinicError, Result};
pub use services::{AnalysisConfig, AnalysisPipeline, RateLimiter};
pub use storage::{AliasRegistry, EventStore, DEFAULT_ALIASES, MAX_ALIASES};
pub use types::{
    Alias, AliasUpdate, AnalysisResponse, Evidence, ExtensionHint, LaunchTarget, LogEvent,
    Proposal, ProposalKind, ProposalPayload,
};
