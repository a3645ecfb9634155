//! Latency check

use std::time::Instant;

use async_trait::async_trait;
use serenity::all::{Context, EditMessage, Message};

use crate::context::BotState;
use crate::descriptor::{Command, CommandSpec};
use crate::embeds;

/// `ping` command: measure round-trip latency to the API
pub struct Ping {
    spec: CommandSpec,
}

impl Ping {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                description: "Check bot and API latency",
                usage: "ping",
                ..CommandSpec::new("ping")
            },
        }
    }
}

impl Default for Ping {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Ping {
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
        let started = Instant::now();
        let mut sent = msg.reply(&ctx.http, "🏓 Pinging...").await?;
        let latency_ms = started.elapsed().as_millis();

        let status = if latency_ms < 100 {
            "🟢 Excellent"
        } else if latency_ms < 200 {
            "🟡 Good"
        } else {
            "🔴 Poor"
        };

        let embed = embeds::success("🏓 Pong!", "")
            .field("Latency", format!("{}ms", latency_ms), true)
            .field("Status", status, true);

        sent.edit(&ctx.http, EditMessage::new().content("").embed(embed))
            .await?;
        Ok(())
    }
}
