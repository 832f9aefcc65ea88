use stride_analysis::Journal;
use stride_db::repos::entries::EntryFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ListArgs;
use crate::output::output;

pub async fn run(args: &ListArgs, journal: &Journal, flags: &GlobalFlags) -> anyhow::Result<()> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        anyhow::ensure!(from <= to, "--from {from} is after --to {to}");
    }
    let filter = EntryFilter {
        goal_id: args.goal.clone(),
        from: args.from,
        to: args.to,
        limit: flags.limit,
    };
    let entries = journal.list_entries(&filter).await?;
    output(&entries, flags.format)
}
