//! # Karma Config
//!
//! Typed configuration management for Karma Bot: a YAML config file with
//! environment-variable overrides, plus validation of the values the bot
//! depends on at startup.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod loader;
pub mod settings;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{colors, limits, Config, DatabaseConfig, DiscordConfig, LogConfig};
