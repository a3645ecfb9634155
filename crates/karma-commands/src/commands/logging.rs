//! Audit logging configuration

use async_trait::async_trait;
use karma_store::LoggingSettings;
use serenity::all::{ChannelId, ChannelType, Context, Message, Permissions};

use crate::commands::{parse_channel_arg, parse_toggle};
use crate::context::BotState;
use crate::descriptor::{Command, CommandCategory, CommandSpec};
use crate::embeds;

/// `logging` command: configure the guild's audit logging
pub struct Logging {
    spec: CommandSpec,
}

impl Logging {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["log", "audit"],
                description: "Configure message and audit logging for this server",
                usage: "logging <enable|disable|channel|events> [options]",
                category: CommandCategory::Utility,
                cooldown_secs: 5,
                required_permissions: Permissions::MANAGE_GUILD,
                ..CommandSpec::new("logging")
            },
        }
    }

    async fn show_overview(
        &self,
        ctx: &Context,
        msg: &Message,
        settings: &LoggingSettings,
        prefix: &str,
    ) -> anyhow::Result<()> {
        let mut embed = embeds::info(
            "📊 Logging Configuration",
            "Audit logging captures the events you enable and forwards them to the log channel.",
        )
        .field(
            "🔘 Status",
            if settings.enabled { "✅ Enabled" } else { "❌ Disabled" },
            true,
        )
        .field(
            "📝 Log Channel",
            settings
                .channel_id
                .map(|id| format!("<#{}>", id))
                .unwrap_or_else(|| "Not set".to_string()),
            true,
        )
        .field(
            "📋 Actions",
            format!(
                "`{p}logging channel <#channel>` — set the log channel\n\
                 `{p}logging enable` / `{p}logging disable`\n\
                 `{p}logging events list`\n\
                 `{p}logging events enable <event>` / `{p}logging events disable <event>`",
                p = prefix
            ),
            false,
        );

        let enabled = settings.enabled_events();
        if !enabled.is_empty() {
            embed = embed.field(
                "🎯 Enabled Events",
                enabled
                    .iter()
                    .map(|event| format!("• `{}`", event))
                    .collect::<Vec<_>>()
                    .join("\n"),
                false,
            );
        }

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }

    async fn set_channel(
        &self,
        ctx: &Context,
        msg: &Message,
        state: &BotState,
        guild_id: u64,
        mut settings: LoggingSettings,
        arg: Option<&String>,
        prefix: &str,
    ) -> anyhow::Result<()> {
        let channel_id = arg.and_then(|arg| parse_channel_arg(arg));
        let Some(channel_id) = channel_id else {
            let embed = embeds::error(
                "❌ Invalid Channel",
                format!(
                    "Please mention a valid channel!\nExample: `{}logging channel #audit-log`",
                    prefix
                ),
            );
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        };

        // Validate against the cache: must exist in this guild and be text
        let is_text_channel = msg
            .guild(&ctx.cache)
            .and_then(|guild| {
                guild
                    .channels
                    .get(&ChannelId::new(channel_id))
                    .map(|channel| channel.kind == ChannelType::Text)
            })
            .unwrap_or(false);
        if !is_text_channel {
            let embed = embeds::error(
                "❌ Invalid Channel Type",
                "The log channel must be a text channel in this server!",
            );
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        }

        settings.channel_id = Some(channel_id);
        state.store.set_logging_settings(guild_id, &settings)?;

        let embed = embeds::success(
            "✅ Log Channel Set",
            format!("The log channel is now <#{}>", channel_id),
        )
        .field(
            "Next Step",
            format!("Use `{}logging enable` to activate logging", prefix),
            true,
        );
        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }

    async fn set_enabled(
        &self,
        ctx: &Context,
        msg: &Message,
        state: &BotState,
        guild_id: u64,
        mut settings: LoggingSettings,
        enabled: bool,
        prefix: &str,
    ) -> anyhow::Result<()> {
        if enabled && settings.channel_id.is_none() {
            let embed = embeds::error(
                "❌ Log Channel Not Set",
                format!(
                    "Please set a log channel first with:\n`{}logging channel #channel-name`",
                    prefix
                ),
            );
            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        }

        settings.enabled = enabled;
        state.store.set_logging_settings(guild_id, &settings)?;

        let embed = if enabled {
            embeds::success(
                "✅ Logging Enabled",
                "Audit logging has been enabled for this server",
            )
            .field(
                "Log Channel",
                settings
                    .channel_id
                    .map(|id| format!("<#{}>", id))
                    .unwrap_or_default(),
                true,
            )
        } else {
            embeds::warning(
                "⏸️ Logging Disabled",
                "Audit logging has been disabled for this server",
            )
        };
        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }

    async fn configure_events(
        &self,
        ctx: &Context,
        msg: &Message,
        state: &BotState,
        guild_id: u64,
        mut settings: LoggingSettings,
        args: &[String],
        prefix: &str,
    ) -> anyhow::Result<()> {
        match args.first().map(String::as_str) {
            Some("list") => {
                let listing = LoggingSettings::EVENT_NAMES
                    .iter()
                    .map(|event| {
                        let on = settings.event(event) == Some(true);
                        format!("{} `{}`", if on { "✅" } else { "❌" }, event)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                let embed = embeds::info("📋 Event Status", listing);
                embeds::reply(ctx, msg, embed).await?;
            }
            Some(toggle @ ("enable" | "disable")) => {
                let enabled = toggle == "enable";
                let Some(event) = args.get(1) else {
                    let embed = embeds::error(
                        "❌ Missing Event",
                        format!("Usage: `{}logging events {} <event>`", prefix, toggle),
                    );
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                };

                if !settings.set_event(event, enabled) {
                    let embed = embeds::error(
                        "❌ Invalid Event",
                        format!(
                            "Unknown event! Use `{}logging events list` to see every event.",
                            prefix
                        ),
                    );
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                }

                state.store.set_logging_settings(guild_id, &settings)?;
                let embed = if enabled {
                    embeds::success(
                        "✅ Event Enabled",
                        format!("Event `{}` is now logged", event),
                    )
                } else {
                    embeds::warning(
                        "❌ Event Disabled",
                        format!("Event `{}` is no longer logged", event),
                    )
                };
                embeds::reply(ctx, msg, embed).await?;
            }
            _ => {
                let embed = embeds::info(
                    "📋 Event Configuration",
                    format!(
                        "Available events:\n{}\n\nUsage:\n`{p}logging events enable <event>`\n\
                         `{p}logging events disable <event>`\n`{p}logging events list`",
                        LoggingSettings::EVENT_NAMES
                            .iter()
                            .map(|event| format!("• `{}`", event))
                            .collect::<Vec<_>>()
                            .join("\n"),
                        p = prefix
                    ),
                );
                embeds::reply(ctx, msg, embed).await?;
            }
        }
        Ok(())
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Logging {
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

        let prefix = state.prefix_for(Some(guild_id));
        let settings = state.store.logging_settings(guild_id)?;

        match args.first().map(String::as_str) {
            None => self.show_overview(ctx, msg, &settings, &prefix).await,
            Some("channel") => {
                self.set_channel(ctx, msg, state, guild_id, settings, args.get(1), &prefix)
                    .await
            }
            Some(toggle) if parse_toggle(toggle).is_some() => {
                let enabled = parse_toggle(toggle).unwrap_or(false);
                self.set_enabled(ctx, msg, state, guild_id, settings, enabled, &prefix)
                    .await
            }
            Some("events") => {
                self.configure_events(ctx, msg, state, guild_id, settings, &args[1..], &prefix)
                    .await
            }
            Some(_) => {
                let embed = embeds::error(
                    "❌ Invalid Action",
                    format!("Unknown action! Use `{}logging` to see the guide.", prefix),
                );
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }
        }
    }
}
