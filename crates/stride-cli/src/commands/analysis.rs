use serde_json::json;
use stride_analysis::Journal;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{BackfillArgs, ReanalyzeArgs};
use crate::commands::shared::limit::effective_limit;
use crate::output::output;

/// Handle `stride reanalyze`. One id surfaces its error; several run as a
/// batch and report failures.
pub async fn reanalyze(
    args: &ReanalyzeArgs,
    journal: &Journal,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if let [id] = args.ids.as_slice() {
        let interpretation = journal.reanalyze(id, args.provider).await?;
        return output(&interpretation, flags.format);
    }

    let report = journal.reanalyze_batch(&args.ids, args.provider).await;
    output(&report, flags.format)?;
    anyhow::ensure!(
        report.is_complete(),
        "{} of {} entries failed to reanalyze",
        report.failed.len(),
        report.requested
    );
    Ok(())
}

pub async fn pending(
    journal: &Journal,
    flags: &GlobalFlags,
    default_limit: u32,
) -> anyhow::Result<()> {
    let limit = effective_limit(flags.limit, default_limit);
    let entries = journal.list_pending_analysis(limit).await?;
    output(&json!({ "count": entries.len(), "entries": entries }), flags.format)
}

pub async fn backfill(
    args: &BackfillArgs,
    journal: &Journal,
    flags: &GlobalFlags,
    default_limit: u32,
) -> anyhow::Result<()> {
    let limit = effective_limit(flags.limit, default_limit);
    let report = journal.backfill_pending(limit, args.provider).await?;
    output(&report, flags.format)?;
    anyhow::ensure!(
        report.is_complete(),
        "{} of {} pending entries failed to analyze",
        report.failed.len(),
        report.requested
    );
    Ok(())
}
