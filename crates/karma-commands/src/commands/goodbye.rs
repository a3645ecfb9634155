//! Goodbye message configuration
//!
//! Shares the welcome system's channel and master switch; this command only
//! manages the goodbye side of the settings.

use async_trait::async_trait;
use karma_config::limits;
use karma_store::WelcomePatch;
use karma_templates::DEFAULT_GOODBYE_TEMPLATE;
use serenity::all::{Context, Message, Permissions};

use crate::commands::welcome::render_preview;
use crate::commands::{parse_toggle, truncate};
use crate::context::BotState;
use crate::descriptor::{Command, CommandCategory, CommandSpec};
use crate::embeds;

/// `goodbye` command: configure leave messages
pub struct Goodbye {
    spec: CommandSpec,
}

impl Goodbye {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["farewell"],
                description: "Configure goodbye messages for leaving members",
                usage: "goodbye <action> [options]",
                category: CommandCategory::Utility,
                cooldown_secs: 5,
                required_permissions: Permissions::MANAGE_GUILD,
                ..CommandSpec::new("goodbye")
            },
        }
    }

    async fn show_help(&self, ctx: &Context, msg: &Message, prefix: &str) -> anyhow::Result<()> {
        let embed = embeds::warning(
            "👋 Goodbye Messages",
            "Send a farewell when a member leaves. The goodbye system shares \
             the welcome system's channel and master switch.",
        )
        .field(
            "📝 Actions",
            format!(
                "`{p}goodbye message <text>` — set the goodbye template\n\
                 `{p}goodbye toggle on/off` — enable or disable goodbyes\n\
                 `{p}goodbye preview` — render the template against yourself\n\
                 `{p}welcome config` — shared configuration overview",
                p = prefix
            ),
            false,
        );
        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}

impl Default for Goodbye {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Goodbye {
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
        let settings = state.store.welcome_settings(guild_id)?;

        match args.first().map(String::as_str) {
            None | Some("help") => self.show_help(ctx, msg, &prefix).await,

            Some("message" | "set") => {
                if args.len() < 2 {
                    let embed = embeds::error(
                        "❌ Missing Message",
                        format!(
                            "Provide a goodbye message!\nExample: `{}goodbye message {{username}} left {{server}}. Bye!`",
                            prefix
                        ),
                    );
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                }

                let template = args[1..].join(" ");
                if template.chars().count() > limits::MAX_TEMPLATE_LEN {
                    let embed = embeds::error(
                        "❌ Message Too Long",
                        format!("The message is limited to {} characters.", limits::MAX_TEMPLATE_LEN),
                    );
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                }

                let preview = render_preview(ctx, msg, &template);
                state.store.update_welcome_settings(
                    guild_id,
                    WelcomePatch {
                        goodbye_message: Some(Some(template)),
                        goodbye_enabled: Some(true),
                        ..Default::default()
                    },
                )?;

                let mut embed =
                    embeds::success("✅ Goodbye Message Updated", "The goodbye message was saved!");
                if let Some(preview) = preview {
                    embed = embed.field("📝 Preview", truncate(&preview, 1024), false);
                }
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("toggle") => {
                let Some(enabled) = args.get(1).and_then(|arg| parse_toggle(arg)) else {
                    let embed = embeds::error("❌ Invalid Toggle", "Use `on/off`, `enable/disable` or `true/false`");
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                };

                if enabled && settings.channel_id.is_none() {
                    let embed = embeds::error(
                        "❌ Channel Not Set",
                        format!("Set a channel first with `{}welcome channel #channel`", prefix),
                    );
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                }

                state.store.update_welcome_settings(
                    guild_id,
                    WelcomePatch {
                        goodbye_enabled: Some(enabled),
                        ..Default::default()
                    },
                )?;

                let embed = if enabled {
                    embeds::success("✅ Goodbye Messages Enabled", "Leaving members get a farewell")
                } else {
                    embeds::warning("⏸️ Goodbye Messages Disabled", "Leaving members are no longer farewelled")
                };
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("preview") => {
                let template = settings
                    .goodbye_message
                    .as_deref()
                    .unwrap_or(DEFAULT_GOODBYE_TEMPLATE);
                let Some(rendered) = render_preview(ctx, msg, template) else {
                    let embed = embeds::error("❌ Error", "Could not resolve your member data!");
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                };

                let embed = embeds::warning("👀 Goodbye Preview", "")
                    .field("📝 Raw Template", format!("```\n{}\n```", truncate(template, 1000)), false)
                    .field("🎨 Rendered", truncate(&rendered, 1024), false);
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some(_) => self.show_help(ctx, msg, &prefix).await,
        }
    }
}
