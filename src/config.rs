use crate::cli::Cli;
use crate::logging::{LogFormat, LogLevel};
use crate::validator::default_concurrency;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound on `concurrency`; each in-flight document holds an open file
pub const MAX_CONCURRENCY: usize = 10_000;

const CONFIG_NAMES: [&str; 3] = [
    "validate-json.toml",
    ".validate-json.toml",
    "validate-json.json",
];

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ValidationSettings {
    /// Documents in flight at once (None: available CPUs plus headroom)
    pub concurrency: Option<usize>,
    /// Accept a UTF-8 BOM in JSON documents
    pub allow_bom: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct OutputSettings {
    /// Suppress pass lines and the summary
    pub quiet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Config {
    /// Effective concurrency limit
    pub fn concurrency(&self) -> usize {
        self.validation
            .concurrency
            .unwrap_or_else(default_concurrency)
    }

    /// Settings for the validation engine
    pub fn validation_config(&self) -> crate::validator::ValidationConfig {
        crate::validator::ValidationConfig {
            max_concurrent_validations: self.concurrency(),
            allow_bom: self.validation.allow_bom,
            quiet: self.output.quiet,
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment -> CLI
    pub async fn load_config(cli: &Cli, env: &impl EnvProvider) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path).await?;
        } else if let Some(found) = Self::find_config_file(Path::new(".")).await? {
            config = found;
        }

        config = Self::apply_environment_overrides(env, config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => match toml::from_str::<Config>(&content) {
                Ok(config) => Ok(config),
                Err(_) => Ok(serde_json::from_str(&content)?),
            },
        }
    }

    /// First config file found in `dir`, then in the user config directory
    pub async fn find_config_file(dir: &Path) -> Result<Option<Config>> {
        let mut candidates: Vec<PathBuf> = CONFIG_NAMES.iter().map(|name| dir.join(name)).collect();
        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("validate-json");
            candidates.extend(CONFIG_NAMES.iter().map(|name| app_dir.join(name)));
        }

        for path in candidates {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                tracing::debug!(path = %path.display(), "loading config file");
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        Ok(None)
    }

    /// Apply `VALIDATE_JSON_*` environment overrides
    pub fn apply_environment_overrides(env: &impl EnvProvider, mut config: Config) -> Result<Config> {
        if let Some(value) = env.get("VALIDATE_JSON_CONCURRENCY") {
            config.validation.concurrency = Some(value.trim().parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid VALIDATE_JSON_CONCURRENCY value: {value}"))
            })?);
        }

        if let Some(value) = env.get("VALIDATE_JSON_ALLOW_BOM") {
            config.validation.allow_bom = parse_bool("VALIDATE_JSON_ALLOW_BOM", &value)?;
        }

        if let Some(value) = env.get("VALIDATE_JSON_QUIET") {
            config.output.quiet = parse_bool("VALIDATE_JSON_QUIET", &value)?;
        }

        if let Some(value) = env.get("VALIDATE_JSON_LOG_LEVEL") {
            config.logging.level = LogLevel::parse(value.trim()).ok_or_else(|| {
                ConfigError::Environment(format!("Invalid VALIDATE_JSON_LOG_LEVEL value: {value}"))
            })?;
        }

        if let Some(value) = env.get("VALIDATE_JSON_LOG_FORMAT") {
            config.logging.format = LogFormat::parse(value.trim()).ok_or_else(|| {
                ConfigError::Environment(format!("Invalid VALIDATE_JSON_LOG_FORMAT value: {value}"))
            })?;
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence). Boolean
    /// flags can only switch a setting on.
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if cli.concurrency.is_some() {
            config.validation.concurrency = cli.concurrency;
        }
        config.validation.allow_bom |= cli.allow_bom;
        config.output.quiet |= cli.quiet;

        if let Some(level) = cli.log_level {
            config.logging.level = level;
        }
        if let Some(format) = cli.log_format {
            config.logging.format = format;
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if let Some(concurrency) = config.validation.concurrency {
            if concurrency == 0 {
                return Err(ConfigError::Validation(
                    "concurrency must be greater than 0".to_string(),
                ));
            }
            if concurrency > MAX_CONCURRENCY {
                return Err(ConfigError::Validation(format!(
                    "concurrency cannot exceed {MAX_CONCURRENCY}"
                )));
            }
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Environment(format!("Invalid {key} value: {value}"))),
    }
}
