use clap::Subcommand;
use stride_core::enums::ProviderKind;

/// Settings commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SettingsCommands {
    /// Show the default provider and which credentials are stored.
    Show,
    /// Set or clear the default provider.
    Provider {
        #[arg(conflicts_with = "clear", required_unless_present = "clear")]
        provider: Option<ProviderKind>,
        #[arg(long)]
        clear: bool,
    },
    /// Store or forget an API key.
    Credential {
        provider: ProviderKind,
        #[arg(conflicts_with = "clear", required_unless_present = "clear")]
        api_key: Option<String>,
        #[arg(long)]
        clear: bool,
    },
}
