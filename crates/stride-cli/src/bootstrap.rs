use stride_config::StrideConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then layered config, then apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<StrideConfig> {
    let mut config = StrideConfig::load_with_dotenv()?;
    if let Some(path) = &flags.db {
        config.database.path.clone_from(path);
    }
    Ok(config)
}

/// Warn about env vars that look like config overrides but will be ignored.
pub fn warn_unconfigured() {
    for warning in collect_env_warnings(std::env::vars().map(|(key, _)| key)) {
        tracing::warn!("{warning}");
    }
}

const SECTIONS: [&str; 4] = ["DATABASE", "ANALYSIS", "PROVIDERS", "GENERAL"];

fn collect_env_warnings<I>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut warnings = Vec::new();
    for key in keys {
        let Some(rest) = key.strip_prefix("STRIDE_") else {
            continue;
        };
        if rest == "LOG" {
            continue;
        }
        let single = SECTIONS
            .iter()
            .find(|section| rest.starts_with(&format!("{section}_")) && !rest.contains("__"));
        if let Some(section) = single {
            warnings.push(format!(
                "{key} is ignored: use double underscores between sections \
                 (example: STRIDE_{section}__{})",
                &rest[section.len() + 1..]
            ));
        }
    }
    warnings
}
