//! Global bot statistics

use async_trait::async_trait;
use karma_common::utils::{format_uptime, group_digits};
use serenity::all::{Context, Message};
use tracing::warn;

use crate::context::BotState;
use crate::descriptor::{Command, CommandSpec};
use crate::embeds;

/// `stats` command: bot-wide statistics across all servers
pub struct Stats {
    spec: CommandSpec,
}

impl Stats {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["statistics", "botstat"],
                description: "Show global bot statistics",
                usage: "stats",
                cooldown_secs: 10,
                ..CommandSpec::new("stats")
            },
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Stats {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn run(
        &self,
        ctx: &Context,
        msg: &Message,
        _args: &[String],
        state: &BotState,
    ) -> anyhow::Result<()> {
        let guild_count = ctx.cache.guild_count();
        let user_count = ctx.cache.user_count();
        let bot_face = ctx.cache.current_user().face();
        let total_members: u64 = ctx
            .cache
            .guilds()
            .into_iter()
            .filter_map(|guild_id| ctx.cache.guild(guild_id).map(|guild| guild.member_count))
            .sum();

        // Store failures degrade to an empty row, the card still renders
        let store_stats = state.store.stats().unwrap_or_else(|e| {
            warn!("Failed to read store statistics: {:#}", e);
            Default::default()
        });

        let embed = embeds::info(
            "📊 Karma Bot — Global Statistics",
            format!(
                "Serving **{}** servers with **{}** total members!",
                guild_count,
                group_digits(total_members)
            ),
        )
        .thumbnail(bot_face)
        .field(
            "🌐 Servers",
            format!(
                "**Servers:** {}\n**Total members:** {}\n**Cached users:** {}",
                guild_count,
                group_digits(total_members),
                group_digits(user_count as u64)
            ),
            true,
        )
        .field(
            "📡 Activity",
            format!(
                "**Commands:** {}\n**Invocations logged:** {}\n**Known users:** {}",
                state.registry.len(),
                group_digits(store_stats.commands),
                group_digits(store_stats.users)
            ),
            true,
        )
        .field(
            "💻 Runtime",
            format!(
                "**Uptime:** {}\n**Version:** {}",
                format_uptime(state.started_at.elapsed()),
                env!("CARGO_PKG_VERSION")
            ),
            true,
        );

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
