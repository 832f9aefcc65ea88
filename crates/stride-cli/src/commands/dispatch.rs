use stride_analysis::Journal;
use stride_config::StrideConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    journal: &Journal,
    config: &StrideConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let default_limit = config.general.default_limit;
    match command {
        Commands::Add(args) => commands::entry::add::run(&args, journal, flags).await,
        Commands::List(args) => commands::entry::list::run(&args, journal, flags).await,
        Commands::Show { id } => commands::entry::show::run(&id, journal, flags).await,
        Commands::Reanalyze(args) => commands::analysis::reanalyze(&args, journal, flags).await,
        Commands::Pending => commands::analysis::pending(journal, flags, default_limit).await,
        Commands::Backfill(args) => {
            commands::analysis::backfill(&args, journal, flags, default_limit).await
        }
        Commands::Activity(args) => commands::activity::handle(&args, journal, flags).await,
        Commands::Goal { action } => commands::goal::handle(&action, journal, flags).await,
        Commands::Phase { action } => commands::phase::handle(&action, journal, flags).await,
        Commands::Settings { action } => commands::settings::handle(&action, journal, flags).await,
    }
}
