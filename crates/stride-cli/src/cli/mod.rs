use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `stride` binary.
#[derive(Debug, Parser)]
#[command(name = "stride", version, about = "Stride - journal entries in, goal activity out")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database file (overrides `database.path`)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use stride_core::enums::ProviderKind;

    use super::subcommands::GoalCommands;
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_and_after_subcommand() {
        let cli = Cli::try_parse_from(["stride", "--format", "raw", "--limit", "5", "pending"])
            .expect("cli should parse");
        assert_eq!(cli.format, OutputFormat::Raw);
        assert_eq!(cli.limit, Some(5));
        assert!(matches!(cli.command, Commands::Pending));

        let cli = Cli::try_parse_from(["stride", "pending", "--quiet", "--db", "/tmp/j.db"])
            .expect("cli should parse");
        assert!(cli.quiet);
        assert_eq!(cli.global_flags().db.as_deref(), Some("/tmp/j.db"));
    }

    #[test]
    fn add_collects_goals_key_and_provider() {
        let cli = Cli::try_parse_from([
            "stride",
            "add",
            "Did 30 min French today",
            "--goal",
            "gol-1",
            "--goal",
            "gol-2",
            "--key",
            "k1",
            "--provider",
            "claude",
        ])
        .expect("cli should parse");

        let Commands::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.text, "Did 30 min French today");
        assert_eq!(args.goal, vec!["gol-1", "gol-2"]);
        assert_eq!(args.key.as_deref(), Some("k1"));
        assert_eq!(args.provider, Some(ProviderKind::Anthropic));
        assert!(!args.no_wait);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let parsed = Cli::try_parse_from(["stride", "reanalyze", "ent-1", "--provider", "mistral"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn list_parses_dates() {
        let cli = Cli::try_parse_from(["stride", "list", "--from", "2026-03-01", "--to", "2026-03-31"])
            .expect("cli should parse");
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.from.map(|d| d.to_string()).as_deref(), Some("2026-03-01"));
        assert!(Cli::try_parse_from(["stride", "list", "--from", "March"]).is_err());
    }

    #[test]
    fn goal_subcommands_parse() {
        let cli = Cli::try_parse_from(["stride", "goal", "deactivate", "gol-1"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Goal {
                action: GoalCommands::Deactivate { .. }
            }
        ));
    }
}
