use clap::Subcommand;

/// Goal commands.
#[derive(Clone, Debug, Subcommand)]
pub enum GoalCommands {
    /// Create an active goal.
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List goals.
    List {
        /// Include inactive goals.
        #[arg(long)]
        all: bool,
    },
    /// Make a goal active again.
    Activate { id: String },
    /// Stop tracking a goal without deleting it.
    Deactivate { id: String },
}
