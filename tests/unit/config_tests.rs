use std::collections::HashMap;

use clap::Parser;
use tempfile::TempDir;

use validate_json::config::MAX_CONCURRENCY;
use validate_json::{Cli, Config, ConfigError, ConfigManager, EnvProvider, LogFormat, LogLevel};

#[derive(Default)]
struct FixedEnv(HashMap<&'static str, &'static str>);

impl EnvProvider for FixedEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|value| value.to_string())
    }
}

fn env(pairs: &[(&'static str, &'static str)]) -> FixedEnv {
    FixedEnv(pairs.iter().copied().collect())
}

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("validate-json").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.validation.concurrency, None);
    assert!(!config.validation.allow_bom);
    assert!(!config.output.quiet);
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Text);
    assert!(config.concurrency() > 10);
}

#[tokio::test]
async fn test_load_partial_toml_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.toml");
    std::fs::write(&path, "[output]\nquiet = true\n").unwrap();

    let config = ConfigManager::load_from_file(&path).await.unwrap();
    assert!(config.output.quiet);
    assert_eq!(config.validation, Config::default().validation);
}

#[tokio::test]
async fn test_load_json_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"validation": {"concurrency": 3, "allow_bom": true}, "logging": {"format": "json"}}"#,
    )
    .unwrap();

    let config = ConfigManager::load_from_file(&path).await.unwrap();
    assert_eq!(config.validation.concurrency, Some(3));
    assert!(config.validation.allow_bom);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[tokio::test]
async fn test_unknown_extension_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.ini");
    std::fs::write(&path, "quiet=1").unwrap();

    let err = ConfigManager::load_from_file(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "ini"));
}

#[test]
fn test_environment_then_cli_precedence() {
    let config = ConfigManager::apply_environment_overrides(
        &env(&[
            ("VALIDATE_JSON_CONCURRENCY", "8"),
            ("VALIDATE_JSON_LOG_LEVEL", "debug"),
        ]),
        Config::default(),
    )
    .unwrap();
    assert_eq!(config.validation.concurrency, Some(8));
    assert_eq!(config.logging.level, LogLevel::Debug);

    let config = ConfigManager::merge_with_cli(config, &cli(&["--concurrency", "2", "-q"]));
    assert_eq!(config.validation.concurrency, Some(2));
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert!(config.output.quiet);
}

#[test]
fn test_invalid_environment_values() {
    for (key, value) in [
        ("VALIDATE_JSON_CONCURRENCY", "many"),
        ("VALIDATE_JSON_QUIET", "perhaps"),
        ("VALIDATE_JSON_LOG_FORMAT", "xml"),
    ] {
        let err = ConfigManager::apply_environment_overrides(&env(&[(key, value)]), Config::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Environment(_)), "{key}");
    }
}

#[test]
fn test_concurrency_bounds() {
    let mut config = Config::default();

    config.validation.concurrency = Some(0);
    assert!(ConfigManager::validate_config(&config).is_err());

    config.validation.concurrency = Some(MAX_CONCURRENCY + 1);
    assert!(ConfigManager::validate_config(&config).is_err());

    config.validation.concurrency = Some(MAX_CONCURRENCY);
    assert!(ConfigManager::validate_config(&config).is_ok());
}

#[tokio::test]
async fn test_explicit_config_path_must_exist() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");
    let missing = missing.to_string_lossy().into_owned();

    let err = ConfigManager::load_config(&cli(&["--config", &missing]), &FixedEnv::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
