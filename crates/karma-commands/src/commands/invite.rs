//! Invite link builder

use async_trait::async_trait;
use serenity::all::{Context, Message, Permissions};

use crate::context::BotState;
use crate::descriptor::{Command, CommandSpec};
use crate::embeds;

/// Permissions requested in the generated invite link
const INVITE_PERMISSIONS: Permissions = Permissions::VIEW_CHANNEL
    .union(Permissions::SEND_MESSAGES)
    .union(Permissions::EMBED_LINKS)
    .union(Permissions::ATTACH_FILES)
    .union(Permissions::READ_MESSAGE_HISTORY)
    .union(Permissions::USE_EXTERNAL_EMOJIS)
    .union(Permissions::ADD_REACTIONS)
    .union(Permissions::MANAGE_MESSAGES);

/// `invite` command: OAuth link for adding the bot to another server
pub struct Invite {
    spec: CommandSpec,
}

impl Invite {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["inv", "add"],
                description: "Get a link to invite the bot to another server",
                usage: "invite",
                cooldown_secs: 5,
                ..CommandSpec::new("invite")
            },
        }
    }
}

impl Default for Invite {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Invite {
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
        let bot_id = ctx.cache.current_user().id.get();
        let bot_face = ctx.cache.current_user().face();
        let invite_url = format!(
            "https://discord.com/api/oauth2/authorize?client_id={}&permissions={}&scope=bot",
            bot_id,
            INVITE_PERMISSIONS.bits()
        );

        let prefix = state.prefix_for(msg.guild_id.map(|id| id.get()));

        let embed = embeds::primary(
            "🤖 Invite Karma Bot",
            format!("[Click here to invite the bot]({})", invite_url),
        )
        .thumbnail(bot_face)
        .field(
            "🔧 Permissions Requested",
            "• Send Messages\n• Embed Links\n• Manage Messages\n• Read Message History\n• Add Reactions",
            true,
        )
        .field(
            "📋 Getting Started",
            format!(
                "{} commands available\nType `{}help` for the list",
                state.registry.len(),
                prefix
            ),
            true,
        );

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
