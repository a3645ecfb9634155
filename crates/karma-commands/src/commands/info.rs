//! Bot information card

use async_trait::async_trait;
use karma_common::utils::format_uptime;
use serenity::all::{Context, Message};

use crate::context::BotState;
use crate::descriptor::{Command, CommandSpec};
use crate::embeds;

/// `info` command: general information about the bot
pub struct Info {
    spec: CommandSpec,
}

impl Info {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["botinfo", "about"],
                description: "Show information about the bot",
                usage: "info",
                cooldown_secs: 5,
                ..CommandSpec::new("info")
            },
        }
    }
}

impl Default for Info {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Info {
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

        let embed = embeds::info(
            "🤖 Karma Bot Information",
            "Karma Bot is a multi-server Discord bot with utility, \
             moderation and configuration commands.",
        )
        .thumbnail(bot_face)
        .field(
            "📊 Statistics",
            format!(
                "Servers: {}\nCached users: {}\nCommands: {}",
                guild_count,
                user_count,
                state.registry.len()
            ),
            true,
        )
        .field(
            "⚙️ Technical",
            format!(
                "Version: {}\nLibrary: serenity 0.12\nUptime: {}",
                env!("CARGO_PKG_VERSION"),
                format_uptime(state.started_at.elapsed())
            ),
            true,
        )
        .field(
            "🎯 Features",
            "• Per-guild prefixes\n• Welcome & goodbye messages\n• Audit logging\n\
             • Usage statistics\n• Cooldown & permission gates",
            false,
        );

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
