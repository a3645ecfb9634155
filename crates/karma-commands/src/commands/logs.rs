//! Stored message-log viewer

use async_trait::async_trait;
use karma_common::utils::parse_bounded_int;
use serenity::all::{Context, Message, Permissions};

use crate::commands::truncate;
use crate::context::BotState;
use crate::descriptor::{Command, CommandCategory, CommandSpec};
use crate::embeds;

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 50;

/// `logs` command: show the most recent captured message events
pub struct Logs {
    spec: CommandSpec,
}

impl Logs {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["auditlog", "history"],
                description: "Show recent captured message events for this server",
                usage: "logs [limit]",
                category: CommandCategory::Utility,
                cooldown_secs: 10,
                required_permissions: Permissions::VIEW_AUDIT_LOG,
                ..CommandSpec::new("logs")
            },
        }
    }
}

impl Default for Logs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Logs {
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
        let Some(guild_id) = msg.guild_id.map(|id| id.get()) else {
            let embed = embeds::error("❌ Error", "This command can only be used in a server!");
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        };

        let limit = args
            .first()
            .and_then(|arg| parse_bounded_int(arg, 1, MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT) as usize;

        let records = state.store.recent_message_logs(guild_id, limit)?;

        if records.is_empty() {
            let embed = embeds::info(
                "📭 No Entries",
                "No message events have been captured for this server yet.\n\
                 Enable message logging with the `logging` command.",
            );
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        }

        let listing = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let author = record
                    .user_id
                    .map(|id| format!("<@{}>", id))
                    .unwrap_or_else(|| "Unknown".to_string());
                format!(
                    "**{}.** [{}] {} in <#{}> — <t:{}:R>\n{}",
                    index + 1,
                    record.event_kind.as_str(),
                    author,
                    record.channel_id,
                    record.timestamp.timestamp(),
                    truncate(&record.content, 100)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let embed = embeds::info("📋 Recent Message Events", truncate(&listing, 4000))
            .field("Showing", records.len().to_string(), true)
            .field("Retention", "7 days", true);
        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
