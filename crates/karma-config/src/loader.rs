//! Configuration loading utilities

use crate::Config;
use karma_common::Result as KarmaResult;
use std::env;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for karma_common::KarmaError {
    fn from(err: ConfigError) -> Self {
        karma_common::KarmaError::config(err.to_string())
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate().map_err(ConfigError::ValidationError)?;

        Ok(config)
    }

    /// Load configuration from environment variables and the default file locations
    pub fn load() -> KarmaResult<Config> {
        let config = if let Ok(config_path) = env::var("KARMA_CONFIG_PATH") {
            Self::load_config(&config_path)?
        } else if Path::new("config.yaml").exists() {
            Self::load_config("config.yaml")?
        } else if Path::new("config.yml").exists() {
            Self::load_config("config.yml")?
        } else {
            let mut config = Config::default();
            Self::apply_env_overrides(&mut config)?;
            config.validate().map_err(ConfigError::ValidationError)?;
            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KarmaResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        if let Ok(token) = env::var("DISCORD_TOKEN") {
            config.discord.token = token;
        }

        if let Ok(prefix) = env::var("KARMA_PREFIX") {
            config.discord.prefix = prefix;
        }

        if let Ok(owner) = env::var("KARMA_OWNER_ID") {
            config.discord.owner_id =
                Some(owner.parse().map_err(|e| ConfigError::EnvParseError {
                    var: "KARMA_OWNER_ID".to_string(),
                    source: Box::new(e),
                })?);
        }

        if let Ok(path) = env::var("KARMA_DATABASE_PATH") {
            config.database.path = path;
        }

        if let Ok(level) = env::var("KARMA_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(file) = env::var("KARMA_LOG_FILE") {
            config.logging.file = Some(file);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_yaml_file() {
        // Make sure ambient variables do not override the file under test
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("KARMA_PREFIX");

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "discord:\n  token: \"file-token\"\n  prefix: \"?\"\nlogging:\n  level: debug\n"
        )
        .expect("write yaml");

        let config = ConfigLoader::load_config(file.path()).expect("load config");
        assert_eq!(config.discord.token, "file-token");
        assert_eq!(config.discord.prefix, "?");
        assert_eq!(config.logging.level, "debug");
        // Unspecified sections fall back to defaults
        assert_eq!(config.database.path, "data/karma-bot.db");
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "discord: [not a map").expect("write yaml");

        assert!(ConfigLoader::load_config(file.path()).is_err());
    }

    #[test]
    fn test_validation_failure_surfaces() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        // Prefix with whitespace fails validation even though the YAML parses
        writeln!(
            file,
            "discord:\n  token: \"t\"\n  prefix: \"! \"\n"
        )
        .expect("write yaml");

        let result = ConfigLoader::load_config(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
