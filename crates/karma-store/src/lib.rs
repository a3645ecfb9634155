//! # Karma Store
//!
//! Embedded per-guild settings and usage-statistics store. Backed by sled
//! with JSON-serialized records; every accessor degrades to a sensible
//! default when a guild has no stored row yet, since absence is not an
//! error state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod models;
pub mod store;

pub use models::{
    CommandUsage, GuildSettings, LogEventKind, LoggingSettings, MessageLogRecord, StoreStats,
    UsageRecord, UserRecord, WelcomeKind, WelcomePatch, WelcomeSettings,
};
pub use store::BotStore;
