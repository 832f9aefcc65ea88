//! # stride-analysis
//!
//! Turns stored entries into interpretations.
//!
//! - [`Analyzer`] runs one analysis: active goals, provider call with its own
//!   retry loop, persistence, daily aggregation.
//! - [`AnalysisQueue`] drains jobs one at a time with job-level backoff.
//! - [`Journal`] is the facade used by the CLI: create entries, read them
//!   back, reanalyze one or many.

pub mod error;
pub mod executor;
pub mod journal;
pub mod prompts;
pub mod queue;
pub mod settings;

pub use error::AnalysisError;
pub use executor::{AnalyzeOptions, Analyzer, CallRetry};
pub use journal::Journal;
pub use queue::{AnalysisQueue, JobRunner, JobSnapshot, QueueConfig, QueueStatus};
pub use settings::{EnvLookup, ProviderResolver, SettingsSource, process_env};
