//! Avatar display

use async_trait::async_trait;
use serenity::all::{Context, Message};

use crate::context::BotState;
use crate::descriptor::{Command, CommandSpec};
use crate::embeds;

/// `avatar` command: show a user's avatar
pub struct Avatar {
    spec: CommandSpec,
}

impl Avatar {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["av", "pfp"],
                description: "Show a user's avatar",
                usage: "avatar [@user]",
                ..CommandSpec::new("avatar")
            },
        }
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Avatar {
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
        let user = msg.mentions.first().unwrap_or(&msg.author);
        let avatar_url = user.face();

        let embed = embeds::primary(
            format!("🖼️ Avatar: {}", user.name),
            format!("[Open in browser]({})", avatar_url),
        )
        .image(&avatar_url)
        .field("User", user.tag(), true)
        .field("ID", user.id.to_string(), true);

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
