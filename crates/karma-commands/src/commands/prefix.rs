//! Per-guild prefix configuration

use async_trait::async_trait;
use karma_config::settings::validate_prefix;
use serenity::all::{Context, Message, Permissions};

use crate::context::BotState;
use crate::descriptor::{Command, CommandCategory, CommandSpec};
use crate::embeds;

/// `prefix` command: view or change this guild's command prefix
pub struct Prefix {
    spec: CommandSpec,
}

impl Prefix {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["setprefix"],
                description: "View or change the bot prefix for this server",
                usage: "prefix [new_prefix]",
                category: CommandCategory::Utility,
                cooldown_secs: 5,
                required_permissions: Permissions::MANAGE_GUILD,
                ..CommandSpec::new("prefix")
            },
        }
    }
}

impl Default for Prefix {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Prefix {
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
        // The permission gate guarantees a guild context here
        let Some(guild_id) = msg.guild_id else {
            let embed = embeds::error("❌ Error", "This command can only be used in a server!");
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        };

        let default_prefix = &state.config.discord.prefix;
        let current = state.store.guild_prefix(guild_id.get(), default_prefix);

        let Some(new_prefix) = args.first() else {
            let embed = embeds::info(
                "⚙️ Server Prefix",
                format!("The current prefix for this server is `{}`", current),
            )
            .field("Current Prefix", format!("`{}`", current), true)
            .field("Default Prefix", format!("`{}`", default_prefix), true)
            .field("Usage", format!("`{}prefix <new_prefix>`", current), false);
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        };

        if let Err(reason) = validate_prefix(new_prefix) {
            let embed = embeds::error("❌ Invalid Prefix", format!("The {}!", reason));
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        }

        if let Err(e) = state.store.set_guild_prefix(guild_id.get(), new_prefix) {
            tracing::error!("Failed to store prefix for guild {}: {:#}", guild_id, e);
            let embed = embeds::error("❌ Error", "Failed to save the new prefix!");
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        }

        let embed = embeds::success("✅ Prefix Updated", "The server prefix has been changed!")
            .field("Old Prefix", format!("`{}`", current), true)
            .field("New Prefix", format!("`{}`", new_prefix), true)
            .field("Example", format!("`{}help`", new_prefix), true);
        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
