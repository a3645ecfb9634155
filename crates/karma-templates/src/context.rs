//! Rendering context resolved from the chat platform

use chrono::{DateTime, Utc};

/// Everything the engine can say about the member a message concerns
#[derive(Debug, Clone)]
pub struct MemberContext {
    /// User ID
    pub user_id: u64,
    /// Account username
    pub username: String,
    /// Guild display name (nickname or username)
    pub display_name: String,
    /// Legacy discriminator; zero or absent on migrated accounts
    pub discriminator: Option<u16>,
    /// Avatar URL
    pub avatar_url: String,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Time the member joined the guild, when known
    pub joined_at: Option<DateTime<Utc>>,
    /// Role names held by the member, excluding the implicit everyone role
    pub role_names: Vec<String>,
    /// Name of the member's highest role, excluding the everyone role
    pub highest_role: Option<String>,
}

impl MemberContext {
    /// The member's mention markup
    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }

    /// The member's full tag (`name#1234` for legacy accounts, otherwise
    /// just the username)
    pub fn tag(&self) -> String {
        match self.discriminator {
            Some(d) if d != 0 => format!("{}#{:04}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

/// Everything the engine can say about the guild a message concerns
#[derive(Debug, Clone)]
pub struct GuildContext {
    /// Guild ID
    pub guild_id: u64,
    /// Guild name
    pub name: String,
    /// Total member count
    pub member_count: u64,
    /// Guild icon URL, if set
    pub icon_url: Option<String>,
    /// Guild owner's user ID, when known
    pub owner_id: Option<u64>,
    /// Number of active boosts
    pub boost_count: u64,
    /// Boost tier (0-3)
    pub boost_level: u8,
    /// Guild roles as (id, name) pairs, for `{mention:role:…}`
    pub roles: Vec<(u64, String)>,
    /// Guild channels as (id, name) pairs, for `{mention:channel:…}`
    pub channels: Vec<(u64, String)>,
    /// Guild custom emoji as (id, name, animated), for `{emoji:…}`
    pub emojis: Vec<(u64, String, bool)>,
}

impl GuildContext {
    /// Find a role by case-insensitive name
    pub fn role_by_name(&self, name: &str) -> Option<u64> {
        self.roles
            .iter()
            .find(|(_, role_name)| role_name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    /// Find a channel by case-insensitive name
    pub fn channel_by_name(&self, name: &str) -> Option<u64> {
        self.channels
            .iter()
            .find(|(_, channel_name)| channel_name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    /// Find a custom emoji by exact name
    pub fn emoji_by_name(&self, name: &str) -> Option<(u64, bool)> {
        self.emojis
            .iter()
            .find(|(_, emoji_name, _)| emoji_name == name)
            .map(|(id, _, animated)| (*id, *animated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn member() -> MemberContext {
        MemberContext {
            user_id: 42,
            username: "karma".to_string(),
            display_name: "Karma".to_string(),
            discriminator: Some(1234),
            avatar_url: "https://cdn.example/avatar.png".to_string(),
            created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            joined_at: None,
            role_names: vec![],
            highest_role: None,
        }
    }

    #[test]
    fn test_mention_and_tag() {
        let mut m = member();
        assert_eq!(m.mention(), "<@42>");
        assert_eq!(m.tag(), "karma#1234");

        m.discriminator = Some(7);
        assert_eq!(m.tag(), "karma#0007");

        m.discriminator = None;
        assert_eq!(m.tag(), "karma");

        m.discriminator = Some(0);
        assert_eq!(m.tag(), "karma");
    }

    #[test]
    fn test_guild_lookups() {
        let guild = GuildContext {
            guild_id: 1,
            name: "Guild".to_string(),
            member_count: 10,
            icon_url: None,
            owner_id: None,
            boost_count: 0,
            boost_level: 0,
            roles: vec![(5, "Moderators".to_string())],
            channels: vec![(6, "general".to_string())],
            emojis: vec![(7, "karma".to_string(), false)],
        };

        assert_eq!(guild.role_by_name("moderators"), Some(5));
        assert_eq!(guild.role_by_name("MODERATORS"), Some(5));
        assert_eq!(guild.role_by_name("nope"), None);
        assert_eq!(guild.channel_by_name("General"), Some(6));
        assert_eq!(guild.emoji_by_name("karma"), Some((7, false)));
        // Emoji lookup is exact, not case-insensitive
        assert_eq!(guild.emoji_by_name("Karma"), None);
    }
}
