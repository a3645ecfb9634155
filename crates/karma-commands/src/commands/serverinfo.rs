//! Server information card

use async_trait::async_trait;
use karma_common::utils::group_digits;
use serenity::all::{ChannelType, Context, Message, PremiumTier, VerificationLevel};

use crate::context::BotState;
use crate::descriptor::{Command, CommandSpec};
use crate::embeds;

/// Owned snapshot of cached guild state, extracted before any await
struct GuildSummary {
    name: String,
    guild_id: u64,
    owner_id: u64,
    created_at: i64,
    member_count: u64,
    text_channels: usize,
    voice_channels: usize,
    categories: usize,
    total_channels: usize,
    role_count: usize,
    emoji_count: usize,
    boost_count: u64,
    boost_level: u8,
    verification: &'static str,
    icon_url: Option<String>,
    banner_url: Option<String>,
}

fn guild_summary(ctx: &Context, msg: &Message) -> Option<GuildSummary> {
    let guild = msg.guild(&ctx.cache)?;

    let mut text_channels = 0;
    let mut voice_channels = 0;
    let mut categories = 0;
    for channel in guild.channels.values() {
        match channel.kind {
            ChannelType::Text => text_channels += 1,
            ChannelType::Voice => voice_channels += 1,
            ChannelType::Category => categories += 1,
            _ => {}
        }
    }

    Some(GuildSummary {
        name: guild.name.clone(),
        guild_id: guild.id.get(),
        owner_id: guild.owner_id.get(),
        created_at: guild.id.created_at().unix_timestamp(),
        member_count: guild.member_count,
        text_channels,
        voice_channels,
        categories,
        total_channels: guild.channels.len(),
        role_count: guild.roles.len(),
        emoji_count: guild.emojis.len(),
        boost_count: guild.premium_subscription_count.unwrap_or(0),
        boost_level: match guild.premium_tier {
            PremiumTier::Tier0 => 0,
            PremiumTier::Tier1 => 1,
            PremiumTier::Tier2 => 2,
            PremiumTier::Tier3 => 3,
            _ => 0,
        },
        verification: match guild.verification_level {
            VerificationLevel::None => "None",
            VerificationLevel::Low => "Low",
            VerificationLevel::Medium => "Medium",
            VerificationLevel::High => "High",
            VerificationLevel::Higher => "Very High",
            _ => "Unknown",
        },
        icon_url: guild.icon_url(),
        banner_url: guild.banner_url(),
    })
}

/// `serverinfo` command: details about the current guild
pub struct ServerInfo {
    spec: CommandSpec,
}

impl ServerInfo {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["si", "server", "guildinfo"],
                description: "Show information about this server",
                usage: "serverinfo",
                cooldown_secs: 5,
                ..CommandSpec::new("serverinfo")
            },
        }
    }
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for ServerInfo {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn run(
        &self,
        ctx: &Context,
        msg: &Message,
        _args: &[String],
        _state: &BotState,
    ) -> anyhow::Result<()> {
        let Some(guild) = guild_summary(ctx, msg) else {
            let embed = embeds::error("❌ Error", "This command can only be used in a server!");
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        };

        let mut embed = embeds::info(format!("🏠 Server Information: {}", guild.name), "")
            .field("👑 Owner", format!("<@{}>", guild.owner_id), true)
            .field("📅 Created", format!("<t:{}:F>", guild.created_at), true)
            .field("🆔 Server ID", guild.guild_id.to_string(), true)
            .field("👥 Members", group_digits(guild.member_count), true)
            .field(
                "📝 Channels",
                format!(
                    "{} total\n{} text\n{} voice\n{} categories",
                    guild.total_channels, guild.text_channels, guild.voice_channels, guild.categories
                ),
                true,
            )
            .field("🎭 Roles", guild.role_count.to_string(), true)
            .field("😀 Emojis", guild.emoji_count.to_string(), true)
            .field(
                "🚀 Boosts",
                format!("{} boosts\nLevel {}", guild.boost_count, guild.boost_level),
                true,
            )
            .field("🔒 Verification", guild.verification, true);

        if let Some(icon) = guild.icon_url {
            embed = embed.thumbnail(icon);
        }
        if let Some(banner) = guild.banner_url {
            embed = embed.image(banner);
        }

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
