//! Welcome message configuration

use async_trait::async_trait;
use karma_config::limits;
use karma_store::{WelcomePatch, WelcomeSettings};
use karma_templates::{render_now, DEFAULT_WELCOME_TEMPLATE, TEMPLATE_REFERENCE};
use serenity::all::{ChannelId, ChannelType, Context, Message, Permissions};

use crate::commands::{parse_channel_arg, parse_hex_color, parse_toggle, truncate};
use crate::context::BotState;
use crate::descriptor::{Command, CommandCategory, CommandSpec};
use crate::embeds;
use crate::template_context::{guild_context, member_context};

/// Render a template against the invoking member, for previews
pub(crate) fn render_preview(ctx: &Context, msg: &Message, template: &str) -> Option<String> {
    let guild = msg.guild(&ctx.cache)?;
    let member = guild.members.get(&msg.author.id)?;
    let member_ctx = member_context(&guild, member);
    let guild_ctx = guild_context(&guild);
    Some(render_now(template, &member_ctx, &guild_ctx))
}

/// Check that a channel argument names a text channel of this guild
pub(crate) fn validate_text_channel(ctx: &Context, msg: &Message, channel_id: u64) -> bool {
    msg.guild(&ctx.cache)
        .and_then(|guild| {
            guild
                .channels
                .get(&ChannelId::new(channel_id))
                .map(|channel| channel.kind == ChannelType::Text)
        })
        .unwrap_or(false)
}

/// `welcome` command: configure join messages
pub struct Welcome {
    spec: CommandSpec,
}

impl Welcome {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["greet"],
                description: "Configure welcome messages for new members",
                usage: "welcome <action> [options]",
                category: CommandCategory::Utility,
                cooldown_secs: 5,
                required_permissions: Permissions::MANAGE_GUILD,
                ..CommandSpec::new("welcome")
            },
        }
    }

    async fn show_help(&self, ctx: &Context, msg: &Message, prefix: &str) -> anyhow::Result<()> {
        let embed = embeds::success(
            "🎉 Welcome Messages",
            "Greet new members with a customizable message.",
        )
        .field(
            "⚙️ Setup",
            format!(
                "`{p}welcome config` — current configuration\n\
                 `{p}welcome channel #channel` — set the message channel\n\
                 `{p}welcome toggle on/off` — enable or disable the system",
                p = prefix
            ),
            false,
        )
        .field(
            "📝 Message",
            format!(
                "`{p}welcome message <text>` — set the welcome template\n\
                 `{p}welcome preview` — render the template against yourself\n\
                 `{p}welcome templates` — placeholder reference",
                p = prefix
            ),
            false,
        )
        .field(
            "🎨 Appearance",
            format!(
                "`{p}welcome embed on/off` — embed or plain text\n\
                 `{p}welcome color <hex>` — embed accent color\n\
                 `{p}welcome ping on/off` — mention the new member\n\
                 `{p}welcome delete <seconds>` — auto-delete delay (0 disables)\n\
                 `{p}welcome reset` — reset everything",
                p = prefix
            ),
            false,
        );
        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }

    async fn show_config(
        &self,
        ctx: &Context,
        msg: &Message,
        settings: &WelcomeSettings,
    ) -> anyhow::Result<()> {
        let mut embed = embeds::primary("🎉 Welcome Configuration", "")
            .field(
                "📊 Status",
                format!(
                    "**Enabled:** {}\n**Channel:** {}\n**Welcome:** {}\n**Goodbye:** {}",
                    if settings.enabled { "✅" } else { "❌" },
                    settings
                        .channel_id
                        .map(|id| format!("<#{}>", id))
                        .unwrap_or_else(|| "Not set".to_string()),
                    if settings.welcome_enabled { "✅" } else { "❌" },
                    if settings.goodbye_enabled { "✅" } else { "❌" },
                ),
                true,
            )
            .field(
                "🎨 Appearance",
                format!(
                    "**Embed:** {}\n**Color:** #{:06X}\n**Ping:** {}\n**Auto-delete:** {}",
                    if settings.embed_enabled { "✅" } else { "❌" },
                    settings.embed_color,
                    if settings.ping_user { "✅" } else { "❌" },
                    if settings.delete_after_secs > 0 {
                        format!("{}s", settings.delete_after_secs)
                    } else {
                        "Off".to_string()
                    },
                ),
                true,
            )
            .field(
                "📈 Statistics",
                format!(
                    "**Welcomed:** {}\n**Farewelled:** {}\n**Updated:** {}",
                    settings.welcome_count,
                    settings.goodbye_count,
                    settings
                        .updated_at
                        .map(|at| format!("<t:{}:R>", at.timestamp()))
                        .unwrap_or_else(|| "Never".to_string()),
                ),
                true,
            );

        if let Some(message) = &settings.welcome_message {
            embed = embed.field("👋 Welcome Message", format!("```\n{}\n```", truncate(message, 200)), false);
        }
        if let Some(message) = &settings.goodbye_message {
            embed = embed.field("👋 Goodbye Message", format!("```\n{}\n```", truncate(message, 200)), false);
        }

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }

    async fn show_templates(&self, ctx: &Context, msg: &Message) -> anyhow::Result<()> {
        let mut embed = embeds::info(
            "🎨 Template Placeholders",
            "Placeholders usable in welcome and goodbye messages. \
             Unknown placeholders are left as-is.",
        );

        let half = TEMPLATE_REFERENCE.len() / 2;
        for (title, entries) in [
            ("Placeholders", &TEMPLATE_REFERENCE[..half]),
            ("More Placeholders", &TEMPLATE_REFERENCE[half..]),
        ] {
            let listing = entries
                .iter()
                .map(|(placeholder, description)| format!("`{}` — {}", placeholder, description))
                .collect::<Vec<_>>()
                .join("\n");
            embed = embed.field(title, listing, false);
        }

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}

impl Default for Welcome {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Welcome {
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

            Some("config" | "setup") => self.show_config(ctx, msg, &settings).await,

            Some("channel") => {
                let channel_id = args.get(1).and_then(|arg| parse_channel_arg(arg));
                let Some(channel_id) = channel_id else {
                    let embed = embeds::error(
                        "❌ Invalid Channel",
                        format!("Mention the channel to use!\nExample: `{}welcome channel #general`", prefix),
                    );
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                };
                if !validate_text_channel(ctx, msg, channel_id) {
                    let embed = embeds::error(
                        "❌ Invalid Channel Type",
                        "Only text channels of this server can be used!",
                    );
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                }

                state.store.update_welcome_settings(
                    guild_id,
                    WelcomePatch {
                        channel_id: Some(Some(channel_id)),
                        ..Default::default()
                    },
                )?;

                let embed = embeds::success(
                    "✅ Welcome Channel Updated",
                    format!("Welcome messages will be sent to <#{}>", channel_id),
                )
                .field(
                    "📋 Next Steps",
                    format!(
                        "• Set a message with `{p}welcome message <text>`\n\
                         • Enable the system with `{p}welcome toggle on`",
                        p = prefix
                    ),
                    false,
                );
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("message" | "set") => {
                if args.len() < 2 {
                    let embed = embeds::error(
                        "❌ Missing Message",
                        format!(
                            "Provide a welcome message!\nExample: `{}welcome message Welcome {{user}} to {{server}}!`",
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
                        welcome_message: Some(Some(template)),
                        welcome_enabled: Some(true),
                        ..Default::default()
                    },
                )?;

                let mut embed =
                    embeds::success("✅ Welcome Message Updated", "The welcome message was saved!");
                if let Some(preview) = preview {
                    embed = embed.field("📝 Preview", truncate(&preview, 1024), false);
                }
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("toggle") => {
                let toggle = args.get(1).and_then(|arg| parse_toggle(arg));
                let Some(enabled) = toggle else {
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
                        enabled: Some(enabled),
                        ..Default::default()
                    },
                )?;

                let embed = if enabled {
                    embeds::success("✅ Welcome System Enabled", "The welcome system is now active")
                } else {
                    embeds::warning("⏸️ Welcome System Disabled", "The welcome system is now off")
                };
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("embed") => {
                let Some(enabled) = args.get(1).and_then(|arg| parse_toggle(arg)) else {
                    let embed = embeds::error("❌ Invalid Toggle", "Use `on` or `off`");
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                };
                state.store.update_welcome_settings(
                    guild_id,
                    WelcomePatch {
                        embed_enabled: Some(enabled),
                        ..Default::default()
                    },
                )?;
                let embed = embeds::success(
                    "✅ Embed Mode Updated",
                    if enabled {
                        "Welcome messages are sent as embeds"
                    } else {
                        "Welcome messages are sent as plain text"
                    },
                );
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("color") => {
                let Some(color) = args.get(1).and_then(|arg| parse_hex_color(arg)) else {
                    let embed = embeds::error(
                        "❌ Invalid Color",
                        "Provide a hex color like `#43B581`",
                    );
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                };
                state.store.update_welcome_settings(
                    guild_id,
                    WelcomePatch {
                        embed_color: Some(color),
                        ..Default::default()
                    },
                )?;
                let embed = embeds::success(
                    "✅ Color Updated",
                    format!("The embed color is now #{:06X}", color),
                );
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("ping") => {
                let Some(enabled) = args.get(1).and_then(|arg| parse_toggle(arg)) else {
                    let embed = embeds::error("❌ Invalid Toggle", "Use `on` or `off`");
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                };
                state.store.update_welcome_settings(
                    guild_id,
                    WelcomePatch {
                        ping_user: Some(enabled),
                        ..Default::default()
                    },
                )?;
                let embed = embeds::success(
                    "✅ Ping Updated",
                    if enabled {
                        "New members are mentioned with the welcome message"
                    } else {
                        "New members are no longer mentioned"
                    },
                );
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("delete" | "autodelete") => {
                let seconds = args
                    .get(1)
                    .and_then(|arg| arg.parse::<u64>().ok())
                    .filter(|secs| *secs <= 3600);
                let Some(seconds) = seconds else {
                    let embed = embeds::error(
                        "❌ Invalid Delay",
                        "Provide a delay in seconds (0-3600); 0 disables auto-delete",
                    );
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                };
                state.store.update_welcome_settings(
                    guild_id,
                    WelcomePatch {
                        delete_after_secs: Some(seconds),
                        ..Default::default()
                    },
                )?;
                let embed = embeds::success(
                    "✅ Auto-Delete Updated",
                    if seconds > 0 {
                        format!("Welcome messages delete themselves after {}s", seconds)
                    } else {
                        "Auto-delete is disabled".to_string()
                    },
                );
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("preview") => {
                let template = settings
                    .welcome_message
                    .as_deref()
                    .unwrap_or(DEFAULT_WELCOME_TEMPLATE);
                let Some(rendered) = render_preview(ctx, msg, template) else {
                    let embed = embeds::error("❌ Error", "Could not resolve your member data!");
                    embeds::reply(ctx, msg, embed).await?;
                    return Ok(());
                };

                let embed = embeds::success("👀 Welcome Preview", "")
                    .field("📝 Raw Template", format!("```\n{}\n```", truncate(template, 1000)), false)
                    .field("🎨 Rendered", truncate(&rendered, 1024), false);
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some("templates" | "variables") => self.show_templates(ctx, msg).await,

            Some("reset") => {
                state.store.update_welcome_settings(
                    guild_id,
                    WelcomePatch {
                        enabled: Some(false),
                        channel_id: Some(None),
                        welcome_enabled: Some(false),
                        goodbye_enabled: Some(false),
                        welcome_message: Some(None),
                        goodbye_message: Some(None),
                        ..Default::default()
                    },
                )?;
                let embed = embeds::warning(
                    "🔄 Settings Reset",
                    "All welcome/goodbye settings are back to their defaults",
                );
                embeds::reply(ctx, msg, embed).await?;
                Ok(())
            }

            Some(_) => self.show_help(ctx, msg, &prefix).await,
        }
    }
}
