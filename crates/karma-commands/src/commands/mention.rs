//! Prefix reminder shown when the bot is mentioned

use async_trait::async_trait;
use serenity::all::{Context, Message};

use crate::context::BotState;
use crate::descriptor::{Command, CommandSpec};
use crate::embeds;

/// `mention` command: replies with the effective prefix. Hidden from help;
/// reachable by mentioning the bot followed by "mention", or as the hint
/// target for mention-prefixed invocations.
pub struct Mention {
    spec: CommandSpec,
}

impl Mention {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                description: "Show the bot's prefix for this server",
                usage: "mention",
                hidden: true,
                ..CommandSpec::new("mention")
            },
        }
    }
}

impl Default for Mention {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Mention {
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
        let prefix = state.prefix_for(msg.guild_id.map(|id| id.get()));
        let bot_face = ctx.cache.current_user().face();

        let guild_name = msg
            .guild(&ctx.cache)
            .map(|guild| guild.name.clone());

        let embed = embeds::primary(
            "👋 Hello!",
            match &guild_name {
                Some(name) => format!("I am **Karma Bot**, at your service in **{}**!", name),
                None => "I am **Karma Bot**, at your service!".to_string(),
            },
        )
        .thumbnail(bot_face)
        .field("⚙️ Prefix", format!("`{}`", prefix), true)
        .field("📋 Commands", format!("`{}help`", prefix), true)
        .field("🔗 Invite", format!("`{}invite`", prefix), true);

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
