use serde_json::json;
use stride_analysis::Journal;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AddArgs;
use crate::output::output;

/// Store the entry, then (unless `--no-wait`) let the queue finish with it
/// before the process exits.
pub async fn run(args: &AddArgs, journal: &Journal, flags: &GlobalFlags) -> anyhow::Result<()> {
    let entry = journal
        .create_entry(&args.text, &args.goal, args.key.as_deref(), args.provider)
        .await?;

    if args.no_wait {
        return output(&json!({ "entry": entry, "analysis": null }), flags.format);
    }

    journal.wait_idle().await;
    let detail = journal.get_entry(&entry.id).await?;
    let status = journal.queue_status();
    if detail.latest().is_none() {
        tracing::warn!(
            entry_id = %entry.id,
            "analysis did not complete; run `stride backfill` to retry"
        );
    }

    output(
        &json!({
            "entry": detail.entry,
            "analysis": detail.latest(),
            "queue": status,
        }),
        flags.format,
    )
}
