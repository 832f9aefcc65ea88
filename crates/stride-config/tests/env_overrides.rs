use figment::Jail;
use stride_config::{ConfigError, StrideConfig};
use stride_core::enums::ProviderKind;

#[test]
fn env_sets_nested_provider_credentials() {
    Jail::expect_with(|jail| {
        jail.set_env("STRIDE_PROVIDERS__ANTHROPIC__API_KEY", "sk-ant-env");
        jail.set_env("STRIDE_PROVIDERS__DEFAULT", "anthropic");

        let config = StrideConfig::load().expect("config loads");
        assert_eq!(config.providers.default, Some(ProviderKind::Anthropic));
        assert_eq!(
            config.providers.backend(ProviderKind::Anthropic).api_key(),
            Some("sk-ant-env")
        );
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".stride")?;
        jail.create_file(
            ".stride/config.toml",
            "[analysis]\nbatch_concurrency = 2\n",
        )?;
        jail.set_env("STRIDE_ANALYSIS__BATCH_CONCURRENCY", "6");

        let config = StrideConfig::load().expect("config loads");
        assert_eq!(config.analysis.batch_concurrency, 6);
        Ok(())
    });
}

#[test]
fn out_of_range_env_value_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("STRIDE_ANALYSIS__QUEUE_MAX_ATTEMPTS", "0");

        let err = StrideConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}
