use stride_analysis::Journal;
use stride_db::repos::daily_activity::DailyActivityFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ActivityArgs;
use crate::output::output;

/// Handle `stride activity`.
pub async fn handle(
    args: &ActivityArgs,
    journal: &Journal,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = DailyActivityFilter {
        goal_id: args.goal.clone(),
        from: args.from,
        to: args.to,
        limit: flags.limit,
    };
    let records = journal.daily_activity(&filter).await?;
    output(&records, flags.format)
}
