//! Conversion from cached Discord state into template rendering contexts

use chrono::{DateTime, Utc};
use karma_templates::{GuildContext, MemberContext};
use serenity::all::{Guild, Member, PremiumTier, RoleId, Timestamp, User};

fn to_datetime(timestamp: Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0)
}

/// Build a [`MemberContext`] from a cached guild and member
pub fn member_context(guild: &Guild, member: &Member) -> MemberContext {
    let everyone = RoleId::new(guild.id.get());

    let mut named_roles: Vec<(u16, String)> = member
        .roles
        .iter()
        .filter(|role_id| **role_id != everyone)
        .filter_map(|role_id| guild.roles.get(role_id))
        .map(|role| (role.position, role.name.clone()))
        .collect();
    named_roles.sort_by(|a, b| b.0.cmp(&a.0));

    let highest_role = named_roles.first().map(|(_, name)| name.clone());
    let role_names = named_roles.into_iter().map(|(_, name)| name).collect();

    MemberContext {
        user_id: member.user.id.get(),
        username: member.user.name.clone(),
        display_name: member.display_name().to_string(),
        discriminator: member.user.discriminator.map(|d| d.get()),
        avatar_url: member.user.face(),
        created_at: to_datetime(member.user.id.created_at()).unwrap_or(DateTime::UNIX_EPOCH),
        joined_at: member.joined_at.and_then(to_datetime),
        role_names,
        highest_role,
    }
}

/// Build a [`MemberContext`] from a bare user, for members that have
/// already left the guild and dropped out of the cache
pub fn user_context(user: &User) -> MemberContext {
    MemberContext {
        user_id: user.id.get(),
        username: user.name.clone(),
        display_name: user.name.clone(),
        discriminator: user.discriminator.map(|d| d.get()),
        avatar_url: user.face(),
        created_at: to_datetime(user.id.created_at()).unwrap_or(DateTime::UNIX_EPOCH),
        joined_at: None,
        role_names: Vec::new(),
        highest_role: None,
    }
}

/// Build a [`GuildContext`] from a cached guild
pub fn guild_context(guild: &Guild) -> GuildContext {
    let everyone = RoleId::new(guild.id.get());

    GuildContext {
        guild_id: guild.id.get(),
        name: guild.name.clone(),
        member_count: guild.member_count,
        icon_url: guild.icon_url(),
        owner_id: Some(guild.owner_id.get()),
        boost_count: guild.premium_subscription_count.unwrap_or(0),
        boost_level: match guild.premium_tier {
            PremiumTier::Tier0 => 0,
            PremiumTier::Tier1 => 1,
            PremiumTier::Tier2 => 2,
            PremiumTier::Tier3 => 3,
            _ => 0,
        },
        roles: guild
            .roles
            .iter()
            .filter(|(role_id, _)| **role_id != everyone)
            .map(|(role_id, role)| (role_id.get(), role.name.clone()))
            .collect(),
        channels: guild
            .channels
            .iter()
            .map(|(channel_id, channel)| (channel_id.get(), channel.name.clone()))
            .collect(),
        emojis: guild
            .emojis
            .values()
            .map(|emoji| (emoji.id.get(), emoji.name.clone(), emoji.animated))
            .collect(),
    }
}
