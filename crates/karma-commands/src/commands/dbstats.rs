//! Store statistics and command leaderboards

use async_trait::async_trait;
use karma_common::utils::{format_bytes, group_digits};
use serenity::all::{Context, Message, Permissions};
use tracing::warn;

use crate::context::BotState;
use crate::descriptor::{Command, CommandCategory, CommandSpec};
use crate::embeds;

/// `dbstats` command: settings-store statistics and top commands
pub struct DbStats {
    spec: CommandSpec,
}

impl DbStats {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["storestats"],
                description: "Show settings-store statistics",
                usage: "dbstats [guild]",
                category: CommandCategory::Utility,
                cooldown_secs: 10,
                required_permissions: Permissions::MANAGE_GUILD,
                ..CommandSpec::new("dbstats")
            },
        }
    }
}

impl Default for DbStats {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for DbStats {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn run(
        &self,
        ctx: &Context,
        msg: &Message,
        args: &[String],
        state: &BotState,
    ) -> anyhow::Result<()> {
        let guild_scope = args.first().map(String::as_str) == Some("guild");
        let guild_id = msg.guild_id.map(|id| id.get());

        let stats = state.store.stats()?;
        let mut embed = embeds::info("📊 Store Statistics", "")
            .field("🏠 Guilds", group_digits(stats.guilds), true)
            .field("👥 Users", group_digits(stats.users), true)
            .field("📝 Command Uses", group_digits(stats.commands), true)
            .field("💬 Message Logs", group_digits(stats.messages), true);

        let scope = if guild_scope { guild_id } else { None };
        let top_commands = state.store.command_stats(scope, 10)?;
        if !top_commands.is_empty() {
            let listing = top_commands
                .iter()
                .enumerate()
                .map(|(index, usage)| {
                    format!(
                        "{}. **{}** — {} uses",
                        index + 1,
                        usage.command_name,
                        usage.usage_count
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            embed = embed.field(
                if guild_scope {
                    "🏠 Top Commands (this server)"
                } else {
                    "🌐 Top Commands (global)"
                },
                listing,
                false,
            );
        }

        if guild_scope {
            if let Some(guild_id) = guild_id {
                let prefix = state.store.guild_prefix(guild_id, &state.config.discord.prefix);
                let logging_enabled = state
                    .store
                    .logging_settings(guild_id)
                    .map(|settings| settings.enabled)
                    .unwrap_or(false);
                embed = embed
                    .field("⚙️ Guild Prefix", format!("`{}`", prefix), true)
                    .field(
                        "📝 Logging",
                        if logging_enabled { "✅ Enabled" } else { "❌ Disabled" },
                        true,
                    );
            }
        }

        match state.store.size_on_disk() {
            Ok(size) => {
                embed = embed.field("💾 Size on Disk", format_bytes(size), true);
            }
            Err(e) => warn!("Failed to read store size: {:#}", e),
        }

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
