use stride_analysis::Journal;

use crate::cli::GlobalFlags;
use crate::output::output;

pub async fn run(id: &str, journal: &Journal, flags: &GlobalFlags) -> anyhow::Result<()> {
    let detail = journal.get_entry(id).await?;
    output(&detail, flags.format)
}
