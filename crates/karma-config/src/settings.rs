//! Application configuration structures

use serde::{Deserialize, Serialize};

/// Embed accent colors shared by every reply card
pub mod colors {
    /// Default branding color
    pub const PRIMARY: u32 = 0x7289DA;
    /// Successful operations
    pub const SUCCESS: u32 = 0x43B581;
    /// Warnings and disabled states
    pub const WARNING: u32 = 0xFAA61A;
    /// Errors and destructive events
    pub const ERROR: u32 = 0xF04747;
    /// Informational cards
    pub const INFO: u32 = 0x5865F2;
}

/// Hard limits applied to user-provided values
pub mod limits {
    /// Maximum length of a guild command prefix
    pub const MAX_PREFIX_LEN: usize = 5;
    /// Maximum messages a single `clear` invocation may delete
    pub const MAX_CLEAR_MESSAGES: u64 = 100;
    /// Maximum length of a welcome/goodbye message template
    pub const MAX_TEMPLATE_LEN: usize = 2000;
    /// Seconds before a `clear` confirmation deletes itself
    pub const DELETE_REPLY_SECS: u64 = 5;
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord-related configuration
    pub discord: DiscordConfig,

    /// Settings store configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LogConfig,
}

/// Discord bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token
    pub token: String,

    /// Global default command prefix, used when a guild has no override
    pub prefix: String,

    /// User ID of the bot owner; owner-only commands are refused when unset
    pub owner_id: Option<u64>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefix: "!".to_string(),
            owner_id: None,
        }
    }
}

/// Settings store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Filesystem path of the embedded store
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/karma-bot.db".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,

    /// Optional log file path
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Check that a prefix is usable: non-empty, within the length limit and
/// free of whitespace.
pub fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("prefix cannot be empty".to_string());
    }
    if prefix.chars().count() > limits::MAX_PREFIX_LEN {
        return Err(format!(
            "prefix cannot be longer than {} characters",
            limits::MAX_PREFIX_LEN
        ));
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err("prefix cannot contain whitespace".to_string());
    }
    Ok(())
}

impl Config {
    /// Validate the configuration values the bot depends on at startup
    pub fn validate(&self) -> Result<(), String> {
        if self.discord.token.trim().is_empty() {
            return Err("discord token is required (set DISCORD_TOKEN)".to_string());
        }
        validate_prefix(&self.discord.prefix)?;
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(format!(
                    "invalid log level '{}' (expected trace, debug, info, warn or error)",
                    other
                ))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.discord.prefix, "!");
        assert!(config.discord.token.is_empty());
        assert!(config.discord.owner_id.is_none());
        assert_eq!(config.database.path, "data/karma-bot.db");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("!").is_ok());
        assert!(validate_prefix("?!").is_ok());
        assert!(validate_prefix("karma").is_ok());
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("toolong").is_err());
        assert!(validate_prefix("a b").is_err());
        assert!(validate_prefix("a\n").is_err());
    }

    #[test]
    fn test_validate_config() {
        let mut config = Config::default();
        assert!(config.validate().is_err()); // missing token

        config.discord.token = "token".to_string();
        assert!(config.validate().is_ok());

        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
