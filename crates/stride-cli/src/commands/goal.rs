use stride_analysis::Journal;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::GoalCommands;
use crate::output::output;

/// Handle `stride goal`.
pub async fn handle(
    action: &GoalCommands,
    journal: &Journal,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let store = journal.store();
    match action {
        GoalCommands::Add { name, description } => {
            let goal = store.create_goal(name, description.as_deref()).await?;
            output(&goal, flags.format)
        }
        GoalCommands::List { all } => {
            let goals = store.list_goals(*all).await?;
            output(&goals, flags.format)
        }
        GoalCommands::Activate { id } => {
            let goal = store.set_goal_active(id, true).await?;
            output(&goal, flags.format)
        }
        GoalCommands::Deactivate { id } => {
            let goal = store.set_goal_active(id, false).await?;
            output(&goal, flags.format)
        }
    }
}
