//! Command list and per-command help

use async_trait::async_trait;
use serenity::all::{Context, Message};

use crate::context::BotState;
use crate::descriptor::{Command, CommandCategory, CommandSpec};
use crate::embeds;
use crate::permissions::permission_names;

/// `help` command: category overview or detail for one command
pub struct Help {
    spec: CommandSpec,
}

impl Help {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                description: "List every command or show details for one",
                usage: "help [command]",
                ..CommandSpec::new("help")
            },
        }
    }
}

impl Default for Help {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Help {
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
        let prefix = state.prefix_for(msg.guild_id.map(|id| id.get()));

        if let Some(token) = args.first() {
            let Some(command) = state.registry.resolve(token) else {
                let embed = embeds::error(
                    "❓ Command Not Found",
                    format!("Command `{}` was not found!", token),
                );
                embeds::reply(ctx, msg, embed).await?;
                return Ok(());
            };
            let spec = command.spec();

            let mut embed = embeds::info(
                format!("📋 Help: {}", spec.name),
                if spec.description.is_empty() {
                    "No description"
                } else {
                    spec.description
                },
            )
            .field("Usage", format!("`{}{}`", prefix, spec.usage), true)
            .field("Category", spec.category.as_str(), true)
            .field("Cooldown", format!("{}s", spec.cooldown_secs), true);

            if !spec.aliases.is_empty() {
                embed = embed.field("Aliases", spec.aliases.join(", "), true);
            }
            if !spec.required_permissions.is_empty() {
                embed = embed.field(
                    "Permissions",
                    permission_names(spec.required_permissions).join(", "),
                    true,
                );
            }

            embeds::reply(ctx, msg, embed).await?;
            return Ok(());
        }

        let mut embed = embeds::info(
            "📋 Karma Bot Commands",
            format!(
                "Use `{}help <command>` for details about a single command.",
                prefix
            ),
        );

        for category in CommandCategory::ALL {
            let mut specs: Vec<&CommandSpec> = state
                .registry
                .iter()
                .map(|command| command.spec())
                .filter(|spec| spec.category == *category && !spec.hidden)
                .collect();
            if specs.is_empty() {
                continue;
            }
            specs.sort_by_key(|spec| spec.name);

            let listing = specs
                .iter()
                .map(|spec| format!("`{}{}` — {}", prefix, spec.name, spec.description))
                .collect::<Vec<_>>()
                .join("\n");
            embed = embed.field(category.as_str(), listing, false);
        }

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
