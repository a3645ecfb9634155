//! Bulk message deletion

use std::time::Duration;

use async_trait::async_trait;
use karma_common::utils::parse_bounded_int;
use karma_config::limits;
use serenity::all::{Context, GetMessages, Message, Permissions};
use tracing::warn;

use crate::context::BotState;
use crate::descriptor::{Command, CommandCategory, CommandSpec};
use crate::embeds;

/// `clear` command: delete the last N messages in the channel
pub struct Clear {
    spec: CommandSpec,
}

impl Clear {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["purge", "delete"],
                description: "Delete a number of messages in this channel",
                usage: "clear <amount>",
                category: CommandCategory::Moderation,
                cooldown_secs: 5,
                required_permissions: Permissions::MANAGE_MESSAGES,
                ..CommandSpec::new("clear")
            },
        }
    }
}

impl Default for Clear {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Clear {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn run(
        &self,
        ctx: &Context,
        msg: &Message,
        args: &[String],
        _state: &BotState,
    ) -> anyhow::Result<()> {
        let amount = args
            .first()
            .and_then(|arg| parse_bounded_int(arg, 1, limits::MAX_CLEAR_MESSAGES));
        let Some(amount) = amount else {
            let embed = embeds::error(
                "🗑️ Invalid Amount",
                format!(
                    "Please provide a valid number of messages (1-{})!",
                    limits::MAX_CLEAR_MESSAGES
                ),
            );
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        };

        // The command message goes first so it is not counted
        if let Err(e) = msg.delete(&ctx.http).await {
            warn!("Failed to delete clear invocation: {}", e);
        }

        let messages = msg
            .channel_id
            .messages(&ctx.http, GetMessages::new().limit(amount as u8))
            .await?;
        let deleted = messages.len();

        let result = if deleted == 1 {
            ctx.http
                .delete_message(msg.channel_id, messages[0].id, None)
                .await
        } else {
            msg.channel_id
                .delete_messages(&ctx.http, messages.iter().map(|m| m.id))
                .await
        };

        if result.is_err() {
            // Bulk deletion refuses messages older than 14 days
            let embed = embeds::error(
                "❌ Error",
                "Could not delete the messages! Bulk deletion only works on messages newer than 14 days.",
            );
            embeds::send(ctx, msg.channel_id, embed).await?;
            return Ok(());
        }

        let embed = embeds::success(
            "🗑️ Messages Cleared",
            format!("Deleted **{}** messages.", deleted),
        )
        .field("Requested by", msg.author.tag(), true)
        .field("Amount", deleted.to_string(), true);

        let confirmation = embeds::send(ctx, msg.channel_id, embed).await?;

        // The confirmation cleans itself up shortly after
        let http = ctx.http.clone();
        let channel_id = msg.channel_id;
        let confirmation_id = confirmation.id;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(limits::DELETE_REPLY_SECS)).await;
            if let Err(e) = http.delete_message(channel_id, confirmation_id, None).await {
                warn!("Failed to delete clear confirmation: {}", e);
            }
        });

        Ok(())
    }
}
