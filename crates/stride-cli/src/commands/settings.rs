use std::collections::BTreeMap;

use serde_json::json;
use stride_analysis::Journal;
use stride_core::enums::ProviderKind;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SettingsCommands;
use crate::output::output;

/// Handle `stride settings`. Stored keys are never printed.
pub async fn handle(
    action: &SettingsCommands,
    journal: &Journal,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let store = journal.store();
    match action {
        SettingsCommands::Show => {
            let mut stored = BTreeMap::new();
            for kind in ProviderKind::ALL {
                stored.insert(kind.as_str(), store.stored_credential(kind).await?.is_some());
            }
            output(
                &json!({
                    "default_provider": store.default_provider().await?,
                    "stored_credentials": stored,
                }),
                flags.format,
            )
        }
        SettingsCommands::Provider { provider, clear } => {
            let provider = if *clear { None } else { *provider };
            store.set_default_provider(provider).await?;
            output(&json!({ "default_provider": provider }), flags.format)
        }
        SettingsCommands::Credential {
            provider,
            api_key,
            clear,
        } => {
            let api_key = if *clear { None } else { api_key.as_deref() };
            store.set_stored_credential(*provider, api_key).await?;
            output(
                &json!({ "provider": provider, "stored": api_key.is_some() }),
                flags.format,
            )
        }
    }
}
