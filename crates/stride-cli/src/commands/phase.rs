use chrono::Utc;
use stride_analysis::Journal;
use stride_core::enums::PhaseIntensity;
use stride_db::repos::goals::NewPhase;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::PhaseCommands;
use crate::commands::shared::parse::parse_enum;
use crate::output::output;

/// Handle `stride phase`.
pub async fn handle(
    action: &PhaseCommands,
    journal: &Journal,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        PhaseCommands::Start {
            goal_id,
            name,
            intensity,
            frequency,
            starts_on,
            ends_on,
        } => {
            let intensity: PhaseIntensity = parse_enum(intensity, "intensity")?;
            let phase = journal
                .store()
                .start_phase(NewPhase {
                    goal_id,
                    name,
                    intensity,
                    frequency: frequency.as_deref(),
                    starts_on: starts_on.unwrap_or_else(|| Utc::now().date_naive()),
                    ends_on: *ends_on,
                })
                .await?;
            output(&phase, flags.format)
        }
        PhaseCommands::List { goal_id } => {
            let phases = journal.store().list_phases(goal_id).await?;
            output(&phases, flags.format)
        }
    }
}
