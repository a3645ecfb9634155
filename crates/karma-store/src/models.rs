//! Record types persisted by the settings store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-guild core settings, currently the command prefix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuildSettings {
    /// Discord guild ID
    pub guild_id: u64,
    /// Command prefix for this guild
    pub prefix: String,
    /// Timestamp when the row was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the row was last updated
    pub updated_at: DateTime<Utc>,
}

impl GuildSettings {
    /// Settings for a guild with no stored row, using the given default prefix
    pub fn with_default_prefix(guild_id: u64, prefix: &str) -> Self {
        let now = Utc::now();
        Self {
            guild_id,
            prefix: prefix.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Audit-log configuration for a guild
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// Whether audit logging is active
    pub enabled: bool,
    /// Channel receiving audit embeds
    pub channel_id: Option<u64>,
    /// Log deleted messages
    pub message_delete: bool,
    /// Log edited messages
    pub message_edit: bool,
    /// Log member joins
    pub member_join: bool,
    /// Log member leaves
    pub member_leave: bool,
    /// Log channel creation
    pub channel_create: bool,
    /// Log channel deletion
    pub channel_delete: bool,
    /// Log role creation
    pub role_create: bool,
    /// Log role deletion
    pub role_delete: bool,
}

impl LoggingSettings {
    /// Names of all toggleable events, in display order
    pub const EVENT_NAMES: &'static [&'static str] = &[
        "message_delete",
        "message_edit",
        "member_join",
        "member_leave",
        "channel_create",
        "channel_delete",
        "role_create",
        "role_delete",
    ];

    /// Read an event toggle by name
    pub fn event(&self, name: &str) -> Option<bool> {
        match name {
            "message_delete" => Some(self.message_delete),
            "message_edit" => Some(self.message_edit),
            "member_join" => Some(self.member_join),
            "member_leave" => Some(self.member_leave),
            "channel_create" => Some(self.channel_create),
            "channel_delete" => Some(self.channel_delete),
            "role_create" => Some(self.role_create),
            "role_delete" => Some(self.role_delete),
            _ => None,
        }
    }

    /// Set an event toggle by name; returns false for an unknown event
    pub fn set_event(&mut self, name: &str, enabled: bool) -> bool {
        match name {
            "message_delete" => self.message_delete = enabled,
            "message_edit" => self.message_edit = enabled,
            "member_join" => self.member_join = enabled,
            "member_leave" => self.member_leave = enabled,
            "channel_create" => self.channel_create = enabled,
            "channel_delete" => self.channel_delete = enabled,
            "role_create" => self.role_create = enabled,
            "role_delete" => self.role_delete = enabled,
            _ => return false,
        }
        true
    }

    /// Names of the events currently enabled
    pub fn enabled_events(&self) -> Vec<&'static str> {
        Self::EVENT_NAMES
            .iter()
            .copied()
            .filter(|name| self.event(name) == Some(true))
            .collect()
    }
}

/// Welcome/goodbye configuration and counters for a guild
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WelcomeSettings {
    /// Master switch for the whole welcome system
    pub enabled: bool,
    /// Channel receiving welcome/goodbye messages
    pub channel_id: Option<u64>,
    /// Whether join messages are sent
    pub welcome_enabled: bool,
    /// Whether leave messages are sent
    pub goodbye_enabled: bool,
    /// Welcome message template; None falls back to the built-in default
    pub welcome_message: Option<String>,
    /// Goodbye message template; None falls back to the built-in default
    pub goodbye_message: Option<String>,
    /// Send messages as embeds rather than plain text
    pub embed_enabled: bool,
    /// Embed accent color
    pub embed_color: u32,
    /// Mention the member alongside the welcome message
    pub ping_user: bool,
    /// Delete sent messages after this many seconds; 0 disables
    pub delete_after_secs: u64,
    /// Number of welcome messages sent so far
    pub welcome_count: u64,
    /// Number of goodbye messages sent so far
    pub goodbye_count: u64,
    /// Timestamp of the last settings change
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for WelcomeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            channel_id: None,
            welcome_enabled: false,
            goodbye_enabled: false,
            welcome_message: None,
            goodbye_message: None,
            embed_enabled: true,
            embed_color: 0x43B581,
            ping_user: true,
            delete_after_secs: 0,
            welcome_count: 0,
            goodbye_count: 0,
            updated_at: None,
        }
    }
}

/// Partial update applied over stored [`WelcomeSettings`].
///
/// Each field is optional; `Some(None)` on the doubly-optional fields clears
/// the stored value. Counters are not patchable, they only move through
/// [`crate::BotStore::increment_welcome_count`].
#[derive(Debug, Clone, Default)]
pub struct WelcomePatch {
    /// New master-switch state
    pub enabled: Option<bool>,
    /// New target channel; `Some(None)` unsets it
    pub channel_id: Option<Option<u64>>,
    /// New join-message switch
    pub welcome_enabled: Option<bool>,
    /// New leave-message switch
    pub goodbye_enabled: Option<bool>,
    /// New welcome template; `Some(None)` clears it
    pub welcome_message: Option<Option<String>>,
    /// New goodbye template; `Some(None)` clears it
    pub goodbye_message: Option<Option<String>>,
    /// New embed-mode switch
    pub embed_enabled: Option<bool>,
    /// New embed color
    pub embed_color: Option<u32>,
    /// New ping switch
    pub ping_user: Option<bool>,
    /// New auto-delete delay in seconds
    pub delete_after_secs: Option<u64>,
}

impl WelcomePatch {
    /// Apply this patch over an existing record, stamping the update time
    pub fn apply(self, settings: &mut WelcomeSettings, now: DateTime<Utc>) {
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        if let Some(channel_id) = self.channel_id {
            settings.channel_id = channel_id;
        }
        if let Some(welcome_enabled) = self.welcome_enabled {
            settings.welcome_enabled = welcome_enabled;
        }
        if let Some(goodbye_enabled) = self.goodbye_enabled {
            settings.goodbye_enabled = goodbye_enabled;
        }
        if let Some(welcome_message) = self.welcome_message {
            settings.welcome_message = welcome_message;
        }
        if let Some(goodbye_message) = self.goodbye_message {
            settings.goodbye_message = goodbye_message;
        }
        if let Some(embed_enabled) = self.embed_enabled {
            settings.embed_enabled = embed_enabled;
        }
        if let Some(embed_color) = self.embed_color {
            settings.embed_color = embed_color;
        }
        if let Some(ping_user) = self.ping_user {
            settings.ping_user = ping_user;
        }
        if let Some(delete_after_secs) = self.delete_after_secs {
            settings.delete_after_secs = delete_after_secs;
        }
        settings.updated_at = Some(now);
    }
}

/// Which of the two welcome-system counters to bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeKind {
    /// Member join message
    Welcome,
    /// Member leave message
    Goodbye,
}

/// Known user and their running command total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Discord user ID
    pub user_id: u64,
    /// Last username the bot has seen for this user
    pub username: String,
    /// Total commands issued by this user
    pub total_commands: u64,
    /// First time the bot saw this user
    pub first_seen: DateTime<Utc>,
    /// Most recent time the bot saw this user
    pub last_seen: DateTime<Utc>,
}

/// One command invocation, appended per successful dispatch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageRecord {
    /// Guild the command ran in; None for direct messages
    pub guild_id: Option<u64>,
    /// Invoking user
    pub user_id: u64,
    /// Canonical command name
    pub command_name: String,
    /// Invocation timestamp
    pub executed_at: DateTime<Utc>,
}

/// Aggregated usage count for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandUsage {
    /// Canonical command name
    pub command_name: String,
    /// Number of recorded invocations
    pub usage_count: u64,
}

/// Kind of message event captured in the message log
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogEventKind {
    /// A message was deleted
    Delete,
    /// A message was edited
    Edit,
}

impl LogEventKind {
    /// Display name of the event kind
    pub fn as_str(&self) -> &'static str {
        match self {
            LogEventKind::Delete => "delete",
            LogEventKind::Edit => "edit",
        }
    }
}

/// One captured message event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageLogRecord {
    /// Guild the message belonged to
    pub guild_id: u64,
    /// Channel the message was in
    pub channel_id: u64,
    /// The message ID
    pub message_id: u64,
    /// Author of the message, if known
    pub user_id: Option<u64>,
    /// Message content at event time
    pub content: String,
    /// What happened to the message
    pub event_kind: LogEventKind,
    /// Previous content, for edits
    pub old_content: Option<String>,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
}

/// Aggregate row counts across the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Guilds with stored settings
    pub guilds: u64,
    /// Users the bot has seen
    pub users: u64,
    /// Recorded command invocations
    pub commands: u64,
    /// Recorded message-log events
    pub messages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_logging_settings_event_access() {
        let mut settings = LoggingSettings::default();
        assert_eq!(settings.event("message_delete"), Some(false));
        assert_eq!(settings.event("unknown"), None);

        assert!(settings.set_event("member_join", true));
        assert_eq!(settings.event("member_join"), Some(true));
        assert!(!settings.set_event("bogus", true));

        assert_eq!(settings.enabled_events(), vec!["member_join"]);
    }

    #[test]
    fn test_welcome_patch_merge() {
        let mut settings = WelcomeSettings::default();
        let now = Utc::now();

        WelcomePatch {
            channel_id: Some(Some(42)),
            welcome_message: Some(Some("hi {user}".to_string())),
            welcome_enabled: Some(true),
            ..Default::default()
        }
        .apply(&mut settings, now);

        assert_eq!(settings.channel_id, Some(42));
        assert_eq!(settings.welcome_message.as_deref(), Some("hi {user}"));
        assert!(settings.welcome_enabled);
        // Untouched fields keep their previous values
        assert!(!settings.enabled);
        assert!(settings.embed_enabled);
        assert_eq!(settings.updated_at, Some(now));

        // A later patch can clear the doubly-optional fields
        WelcomePatch {
            channel_id: Some(None),
            welcome_message: Some(None),
            ..Default::default()
        }
        .apply(&mut settings, now);

        assert_eq!(settings.channel_id, None);
        assert_eq!(settings.welcome_message, None);
        assert!(settings.welcome_enabled);
    }
}
