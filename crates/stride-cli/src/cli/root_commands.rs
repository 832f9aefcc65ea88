use chrono::NaiveDate;
use clap::{Args, Subcommand};
use stride_core::enums::ProviderKind;

use crate::cli::subcommands::{GoalCommands, PhaseCommands, SettingsCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Record a journal entry and analyze it.
    Add(AddArgs),
    /// List entries with their latest interpretation.
    List(ListArgs),
    /// Show one entry with every interpretation.
    Show { id: String },
    /// Analyze entries again, outside the queue.
    Reanalyze(ReanalyzeArgs),
    /// Entries that have not been analyzed yet.
    Pending,
    /// Analyze pending entries.
    Backfill(BackfillArgs),
    /// Per-day goal activity.
    Activity(ActivityArgs),
    /// Goals.
    Goal {
        #[command(subcommand)]
        action: GoalCommands,
    },
    /// Goal phases.
    Phase {
        #[command(subcommand)]
        action: PhaseCommands,
    },
    /// Stored provider preferences and credentials.
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct AddArgs {
    /// Entry text.
    pub text: String,
    /// Goal the entry is about (repeatable).
    #[arg(long)]
    pub goal: Vec<String>,
    /// Idempotency key; repeating it returns the stored entry.
    #[arg(long)]
    pub key: Option<String>,
    #[arg(long)]
    pub provider: Option<ProviderKind>,
    /// Return after storing; analysis is left for `backfill`.
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub goal: Option<String>,
    /// First UTC day to include (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last UTC day to include (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Clone, Debug, Args)]
pub struct ReanalyzeArgs {
    /// Entry ids; more than one runs as a batch.
    #[arg(required = true)]
    pub ids: Vec<String>,
    #[arg(long)]
    pub provider: Option<ProviderKind>,
}

#[derive(Clone, Debug, Args)]
pub struct BackfillArgs {
    #[arg(long)]
    pub provider: Option<ProviderKind>,
}

#[derive(Clone, Debug, Args)]
pub struct ActivityArgs {
    #[arg(long)]
    pub goal: Option<String>,
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
}
