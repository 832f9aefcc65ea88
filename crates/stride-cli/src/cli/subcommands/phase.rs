use chrono::NaiveDate;
use clap::Subcommand;

/// Phase commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PhaseCommands {
    /// Start a phase for a goal.
    Start {
        goal_id: String,
        #[arg(long)]
        name: String,
        /// light, steady or intense
        #[arg(long, default_value = "steady")]
        intensity: String,
        /// Free-form cadence, e.g. "3x per week".
        #[arg(long)]
        frequency: Option<String>,
        /// Defaults to today (UTC).
        #[arg(long)]
        starts_on: Option<NaiveDate>,
        #[arg(long)]
        ends_on: Option<NaiveDate>,
    },
    /// List a goal's phases.
    List { goal_id: String },
}
