//! Sled-backed settings and statistics store
//!
//! All records are JSON-serialized. Settings trees are keyed by the
//! big-endian guild/user ID; append-only log trees are keyed by
//! `[timestamp millis | sequence]` so retention cleanup is a range scan.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::models::{
    CommandUsage, GuildSettings, LoggingSettings, MessageLogRecord, StoreStats, UsageRecord,
    UserRecord, WelcomeKind, WelcomePatch, WelcomeSettings,
};

/// Usage records older than this many days are purged by [`BotStore::cleanup`]
const USAGE_RETENTION_DAYS: i64 = 30;
/// Message-log records older than this many days are purged by [`BotStore::cleanup`]
const MESSAGE_LOG_RETENTION_DAYS: i64 = 7;

/// Embedded store for guild settings, user data and usage statistics
#[derive(Debug, Clone)]
pub struct BotStore {
    db: sled::Db,
    guild_settings: sled::Tree,
    logging_settings: sled::Tree,
    welcome_settings: sled::Tree,
    users: sled::Tree,
    command_stats: sled::Tree,
    message_logs: sled::Tree,
}

impl BotStore {
    /// Open (or create) the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Opening settings store at {:?}", path.as_ref());

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create store directory {:?}", parent))?;
            }
        }

        let db = sled::Config::default()
            .path(path.as_ref())
            .cache_capacity(32 * 1024 * 1024)
            .flush_every_ms(Some(1000))
            .open()
            .with_context(|| format!("Failed to open store at {:?}", path.as_ref()))?;

        let store = Self {
            guild_settings: db.open_tree("guild_settings")?,
            logging_settings: db.open_tree("logging_settings")?,
            welcome_settings: db.open_tree("welcome_settings")?,
            users: db.open_tree("users")?,
            command_stats: db.open_tree("command_stats")?,
            message_logs: db.open_tree("message_logs")?,
            db,
        };

        info!("Settings store opened");
        Ok(store)
    }

    // Guild settings

    /// Fetch settings for a guild, falling back to the given default prefix
    /// when no row exists
    pub fn guild_settings(&self, guild_id: u64, default_prefix: &str) -> Result<GuildSettings> {
        match self
            .guild_settings
            .get(guild_id.to_be_bytes())
            .context("Failed to read guild settings")?
        {
            Some(raw) => {
                serde_json::from_slice(&raw).context("Failed to deserialize guild settings")
            }
            None => Ok(GuildSettings::with_default_prefix(guild_id, default_prefix)),
        }
    }

    /// Resolve the effective prefix for a guild, degrading to the default
    /// when the store cannot be read
    pub fn guild_prefix(&self, guild_id: u64, default_prefix: &str) -> String {
        match self.guild_settings(guild_id, default_prefix) {
            Ok(settings) => settings.prefix,
            Err(e) => {
                warn!("Falling back to default prefix for guild {}: {:#}", guild_id, e);
                default_prefix.to_string()
            }
        }
    }

    /// Store a new prefix for a guild, creating the row lazily
    pub fn set_guild_prefix(&self, guild_id: u64, prefix: &str) -> Result<()> {
        let now = Utc::now();
        let mut settings = self.guild_settings(guild_id, prefix)?;
        settings.prefix = prefix.to_string();
        settings.updated_at = now;

        let raw = serde_json::to_vec(&settings).context("Failed to serialize guild settings")?;
        self.guild_settings
            .insert(guild_id.to_be_bytes(), raw)
            .context("Failed to write guild settings")?;

        debug!("Set prefix '{}' for guild {}", prefix, guild_id);
        Ok(())
    }

    // Logging settings

    /// Fetch audit-log settings for a guild; all toggles default to off
    pub fn logging_settings(&self, guild_id: u64) -> Result<LoggingSettings> {
        match self
            .logging_settings
            .get(guild_id.to_be_bytes())
            .context("Failed to read logging settings")?
        {
            Some(raw) => {
                serde_json::from_slice(&raw).context("Failed to deserialize logging settings")
            }
            None => Ok(LoggingSettings::default()),
        }
    }

    /// Replace audit-log settings for a guild
    pub fn set_logging_settings(&self, guild_id: u64, settings: &LoggingSettings) -> Result<()> {
        let raw = serde_json::to_vec(settings).context("Failed to serialize logging settings")?;
        self.logging_settings
            .insert(guild_id.to_be_bytes(), raw)
            .context("Failed to write logging settings")?;
        Ok(())
    }

    // Welcome settings

    /// Fetch welcome/goodbye settings for a guild
    pub fn welcome_settings(&self, guild_id: u64) -> Result<WelcomeSettings> {
        match self
            .welcome_settings
            .get(guild_id.to_be_bytes())
            .context("Failed to read welcome settings")?
        {
            Some(raw) => {
                serde_json::from_slice(&raw).context("Failed to deserialize welcome settings")
            }
            None => Ok(WelcomeSettings::default()),
        }
    }

    /// Apply a partial update over the stored (or default) welcome settings
    pub fn update_welcome_settings(
        &self,
        guild_id: u64,
        patch: WelcomePatch,
    ) -> Result<WelcomeSettings> {
        let mut settings = self.welcome_settings(guild_id)?;
        patch.apply(&mut settings, Utc::now());

        let raw = serde_json::to_vec(&settings).context("Failed to serialize welcome settings")?;
        self.welcome_settings
            .insert(guild_id.to_be_bytes(), raw)
            .context("Failed to write welcome settings")?;

        Ok(settings)
    }

    /// Bump the sent-message counter for the welcome or goodbye pipeline
    pub fn increment_welcome_count(&self, guild_id: u64, kind: WelcomeKind) -> Result<()> {
        let mut settings = self.welcome_settings(guild_id)?;
        match kind {
            WelcomeKind::Welcome => settings.welcome_count += 1,
            WelcomeKind::Goodbye => settings.goodbye_count += 1,
        }

        let raw = serde_json::to_vec(&settings).context("Failed to serialize welcome settings")?;
        self.welcome_settings
            .insert(guild_id.to_be_bytes(), raw)
            .context("Failed to write welcome settings")?;
        Ok(())
    }

    // User data

    /// Record that a user was seen, updating their username and timestamps
    pub fn touch_user(&self, user_id: u64, username: &str) -> Result<()> {
        let now = Utc::now();
        let mut record = match self
            .users
            .get(user_id.to_be_bytes())
            .context("Failed to read user record")?
        {
            Some(raw) => {
                serde_json::from_slice(&raw).context("Failed to deserialize user record")?
            }
            None => UserRecord {
                user_id,
                username: username.to_string(),
                total_commands: 0,
                first_seen: now,
                last_seen: now,
            },
        };

        record.username = username.to_string();
        record.last_seen = now;

        let raw = serde_json::to_vec(&record).context("Failed to serialize user record")?;
        self.users
            .insert(user_id.to_be_bytes(), raw)
            .context("Failed to write user record")?;
        Ok(())
    }

    // Command usage statistics

    /// Append one command invocation and bump the user's running total
    pub fn log_command_usage(
        &self,
        guild_id: Option<u64>,
        user_id: u64,
        command_name: &str,
    ) -> Result<()> {
        self.log_command_usage_at(guild_id, user_id, command_name, Utc::now())
    }

    fn log_command_usage_at(
        &self,
        guild_id: Option<u64>,
        user_id: u64,
        command_name: &str,
        executed_at: DateTime<Utc>,
    ) -> Result<()> {
        let record = UsageRecord {
            guild_id,
            user_id,
            command_name: command_name.to_string(),
            executed_at,
        };

        let key = self.log_key(executed_at)?;
        let raw = serde_json::to_vec(&record).context("Failed to serialize usage record")?;
        self.command_stats
            .insert(key, raw)
            .context("Failed to append usage record")?;

        // Running per-user total
        if let Some(raw) = self
            .users
            .get(user_id.to_be_bytes())
            .context("Failed to read user record")?
        {
            let mut user: UserRecord =
                serde_json::from_slice(&raw).context("Failed to deserialize user record")?;
            user.total_commands += 1;
            user.last_seen = executed_at;
            let raw = serde_json::to_vec(&user).context("Failed to serialize user record")?;
            self.users
                .insert(user_id.to_be_bytes(), raw)
                .context("Failed to write user record")?;
        }

        Ok(())
    }

    /// Aggregate usage counts per command, most used first.
    ///
    /// With `guild_id` set only that guild's records count; otherwise the
    /// aggregation is global.
    pub fn command_stats(&self, guild_id: Option<u64>, limit: usize) -> Result<Vec<CommandUsage>> {
        let mut counts: std::collections::HashMap<String, u64> = std::collections::HashMap::new();

        for entry in self.command_stats.iter() {
            let (_, raw) = entry.context("Failed to iterate usage records")?;
            let record: UsageRecord =
                serde_json::from_slice(&raw).context("Failed to deserialize usage record")?;
            if guild_id.is_some() && record.guild_id != guild_id {
                continue;
            }
            *counts.entry(record.command_name).or_insert(0) += 1;
        }

        let mut stats: Vec<CommandUsage> = counts
            .into_iter()
            .map(|(command_name, usage_count)| CommandUsage {
                command_name,
                usage_count,
            })
            .collect();
        stats.sort_by(|a, b| {
            b.usage_count
                .cmp(&a.usage_count)
                .then_with(|| a.command_name.cmp(&b.command_name))
        });
        stats.truncate(limit);
        Ok(stats)
    }

    // Message logs

    /// Append a captured message event
    pub fn log_message(&self, record: &MessageLogRecord) -> Result<()> {
        let key = self.log_key(record.timestamp)?;
        let raw = serde_json::to_vec(record).context("Failed to serialize message log")?;
        self.message_logs
            .insert(key, raw)
            .context("Failed to append message log")?;
        Ok(())
    }

    /// Most recent stored message events for a guild, newest first
    pub fn recent_message_logs(&self, guild_id: u64, limit: usize) -> Result<Vec<MessageLogRecord>> {
        let mut records = Vec::with_capacity(limit);

        for entry in self.message_logs.iter().rev() {
            let (_, raw) = entry.context("Failed to iterate message logs")?;
            let record: MessageLogRecord =
                serde_json::from_slice(&raw).context("Failed to deserialize message log")?;
            if record.guild_id != guild_id {
                continue;
            }
            records.push(record);
            if records.len() >= limit {
                break;
            }
        }

        Ok(records)
    }

    // Maintenance

    /// Aggregate row counts across the store
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            guilds: self.guild_settings.len() as u64,
            users: self.users.len() as u64,
            commands: self.command_stats.len() as u64,
            messages: self.message_logs.len() as u64,
        })
    }

    /// Size of the store on disk in bytes
    pub fn size_on_disk(&self) -> Result<u64> {
        self.db.size_on_disk().context("Failed to get store size")
    }

    /// Purge usage records older than 30 days and message logs older than
    /// 7 days. Returns the number of removed (usage, message) rows.
    pub fn cleanup(&self) -> Result<(usize, usize)> {
        let now = Utc::now();
        let usage_removed = Self::purge_before(
            &self.command_stats,
            now - Duration::days(USAGE_RETENTION_DAYS),
        )?;
        let messages_removed = Self::purge_before(
            &self.message_logs,
            now - Duration::days(MESSAGE_LOG_RETENTION_DAYS),
        )?;

        info!(
            "Store cleanup removed {} usage records and {} message logs",
            usage_removed, messages_removed
        );
        Ok((usage_removed, messages_removed))
    }

    fn purge_before(tree: &sled::Tree, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff_key = time_prefix(cutoff);
        let mut removed = 0;

        let stale: Vec<sled::IVec> = tree
            .range(..cutoff_key)
            .keys()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to scan stale log records")?;

        for key in stale {
            tree.remove(key).context("Failed to remove stale record")?;
            removed += 1;
        }

        Ok(removed)
    }

    /// Flush all pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .context("Failed to flush store to disk")?;
        Ok(())
    }

    fn log_key(&self, timestamp: DateTime<Utc>) -> Result<[u8; 16]> {
        let seq = self.db.generate_id().context("Failed to allocate log id")?;
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&time_prefix(timestamp));
        key[8..].copy_from_slice(&seq.to_be_bytes());
        Ok(key)
    }
}

fn time_prefix(timestamp: DateTime<Utc>) -> [u8; 8] {
    let millis = timestamp.timestamp_millis().max(0) as u64;
    millis.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogEventKind;
    use tempfile::tempdir;

    fn open_store() -> (tempfile::TempDir, BotStore) {
        let dir = tempdir().expect("temp dir");
        let store = BotStore::open(dir.path().join("store")).expect("open store");
        (dir, store)
    }

    fn message_record(guild_id: u64, message_id: u64, at: DateTime<Utc>) -> MessageLogRecord {
        MessageLogRecord {
            guild_id,
            channel_id: 10,
            message_id,
            user_id: Some(20),
            content: format!("message {}", message_id),
            event_kind: LogEventKind::Delete,
            old_content: None,
            timestamp: at,
        }
    }

    #[test]
    fn test_guild_prefix_roundtrip_and_default() {
        let (_dir, store) = open_store();

        // Absent row falls back to the provided default
        assert_eq!(store.guild_prefix(1, "!"), "!");

        store.set_guild_prefix(1, "?").expect("set prefix");
        assert_eq!(store.guild_prefix(1, "!"), "?");

        // Other guilds are unaffected
        assert_eq!(store.guild_prefix(2, "!"), "!");
    }

    #[test]
    fn test_logging_settings_roundtrip() {
        let (_dir, store) = open_store();

        let defaults = store.logging_settings(1).expect("read defaults");
        assert!(!defaults.enabled);
        assert!(defaults.enabled_events().is_empty());

        let mut settings = defaults;
        settings.enabled = true;
        settings.channel_id = Some(99);
        settings.message_delete = true;
        settings.member_join = true;
        store.set_logging_settings(1, &settings).expect("write");

        let loaded = store.logging_settings(1).expect("read back");
        assert_eq!(loaded, settings);
        assert_eq!(loaded.enabled_events(), vec!["message_delete", "member_join"]);
    }

    #[test]
    fn test_welcome_settings_patch_and_counters() {
        let (_dir, store) = open_store();

        let updated = store
            .update_welcome_settings(
                1,
                WelcomePatch {
                    enabled: Some(true),
                    channel_id: Some(Some(55)),
                    welcome_message: Some(Some("hi {user}".to_string())),
                    welcome_enabled: Some(true),
                    ..Default::default()
                },
            )
            .expect("patch");

        assert!(updated.enabled);
        assert_eq!(updated.channel_id, Some(55));
        assert!(updated.updated_at.is_some());

        store
            .increment_welcome_count(1, WelcomeKind::Welcome)
            .expect("bump welcome");
        store
            .increment_welcome_count(1, WelcomeKind::Goodbye)
            .expect("bump goodbye");
        store
            .increment_welcome_count(1, WelcomeKind::Welcome)
            .expect("bump welcome");

        let settings = store.welcome_settings(1).expect("read");
        assert_eq!(settings.welcome_count, 2);
        assert_eq!(settings.goodbye_count, 1);
        // The earlier patch survived the counter updates
        assert_eq!(settings.welcome_message.as_deref(), Some("hi {user}"));
    }

    #[test]
    fn test_usage_logging_and_aggregation() {
        let (_dir, store) = open_store();

        store.touch_user(20, "tester").expect("touch user");

        store.log_command_usage(Some(1), 20, "ping").expect("log");
        store.log_command_usage(Some(1), 20, "ping").expect("log");
        store.log_command_usage(Some(1), 20, "help").expect("log");
        store.log_command_usage(Some(2), 20, "help").expect("log");
        store.log_command_usage(None, 20, "ping").expect("log");

        let guild_stats = store.command_stats(Some(1), 10).expect("guild stats");
        assert_eq!(guild_stats.len(), 2);
        assert_eq!(guild_stats[0].command_name, "ping");
        assert_eq!(guild_stats[0].usage_count, 2);
        assert_eq!(guild_stats[1].command_name, "help");
        assert_eq!(guild_stats[1].usage_count, 1);

        let global_stats = store.command_stats(None, 10).expect("global stats");
        assert_eq!(global_stats[0].command_name, "ping");
        assert_eq!(global_stats[0].usage_count, 3);

        let limited = store.command_stats(None, 1).expect("limited stats");
        assert_eq!(limited.len(), 1);

        // The user's running total tracked every invocation
        let raw = store
            .users
            .get(20u64.to_be_bytes())
            .expect("read user")
            .expect("user exists");
        let user: UserRecord = serde_json::from_slice(&raw).expect("deserialize user");
        assert_eq!(user.total_commands, 5);
    }

    #[test]
    fn test_cleanup_purges_old_records() {
        let (_dir, store) = open_store();
        let now = Utc::now();

        // Two stale records and one fresh one in each log tree
        store
            .log_command_usage_at(Some(1), 20, "ping", now - Duration::days(40))
            .expect("old usage");
        store
            .log_command_usage_at(Some(1), 20, "ping", now - Duration::days(31))
            .expect("old usage");
        store
            .log_command_usage_at(Some(1), 20, "ping", now)
            .expect("fresh usage");

        store
            .log_message(&message_record(1, 100, now - Duration::days(8)))
            .expect("old message");
        store
            .log_message(&message_record(1, 101, now))
            .expect("fresh message");

        let (usage_removed, messages_removed) = store.cleanup().expect("cleanup");
        assert_eq!(usage_removed, 2);
        assert_eq!(messages_removed, 1);

        let stats = store.stats().expect("stats");
        assert_eq!(stats.commands, 1);
        assert_eq!(stats.messages, 1);
    }

    #[test]
    fn test_recent_message_logs_newest_first() {
        let (_dir, store) = open_store();
        let now = Utc::now();

        for i in 0..5u64 {
            store
                .log_message(&message_record(1, i, now - Duration::minutes(5 - i as i64)))
                .expect("log message");
        }
        // Another guild's records never leak into the result
        store
            .log_message(&message_record(2, 999, now))
            .expect("log message");

        let logs = store.recent_message_logs(1, 3).expect("recent logs");
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].message_id, 4);
        assert_eq!(logs[1].message_id, 3);
        assert_eq!(logs[2].message_id, 2);
    }

    #[test]
    fn test_stats_counts() {
        let (_dir, store) = open_store();

        store.set_guild_prefix(1, "?").expect("prefix");
        store.touch_user(20, "a").expect("user");
        store.touch_user(21, "b").expect("user");
        store.log_command_usage(Some(1), 20, "ping").expect("usage");

        let stats = store.stats().expect("stats");
        assert_eq!(stats.guilds, 1);
        assert_eq!(stats.users, 2);
        assert_eq!(stats.commands, 1);
        assert_eq!(stats.messages, 0);
    }
}
