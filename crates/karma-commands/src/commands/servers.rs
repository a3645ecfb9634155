//! Owner-only guild listing

use async_trait::async_trait;
use karma_common::utils::{group_digits, parse_bounded_int};
use serenity::all::{Context, Message};

use crate::context::BotState;
use crate::descriptor::{Command, CommandSpec};
use crate::embeds;

const SERVERS_PER_PAGE: usize = 10;

/// `servers` command: list the guilds the bot is in, largest first
pub struct Servers {
    spec: CommandSpec,
}

impl Servers {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["guilds", "serverlist"],
                description: "List the servers the bot is in (owner only)",
                usage: "servers [page]",
                cooldown_secs: 10,
                owner_only: true,
                ..CommandSpec::new("servers")
            },
        }
    }
}

impl Default for Servers {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for Servers {
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
        // Snapshot the cache before any await
        let mut guilds: Vec<(String, u64, u64)> = ctx
            .cache
            .guilds()
            .into_iter()
            .filter_map(|guild_id| {
                ctx.cache
                    .guild(guild_id)
                    .map(|guild| (guild.name.clone(), guild.member_count, guild_id.get()))
            })
            .collect();
        guilds.sort_by(|a, b| b.1.cmp(&a.1));

        let total_guilds = guilds.len();
        let total_members: u64 = guilds.iter().map(|(_, count, _)| count).sum();
        let total_pages = total_guilds.div_ceil(SERVERS_PER_PAGE).max(1);

        let page = args
            .first()
            .and_then(|arg| parse_bounded_int(arg, 1, total_pages as u64))
            .unwrap_or(1) as usize;
        let start = (page - 1) * SERVERS_PER_PAGE;

        let mut embed = embeds::info(
            "🌐 Server List",
            format!(
                "Active in **{}** servers with **{}** total members\nPage {} of {}",
                total_guilds,
                group_digits(total_members),
                page,
                total_pages
            ),
        );

        for (index, (name, member_count, guild_id)) in guilds
            .iter()
            .skip(start)
            .take(SERVERS_PER_PAGE)
            .enumerate()
        {
            embed = embed.field(
                format!("{}. {}", start + index + 1, name),
                format!(
                    "**Members:** {}\n**ID:** {}",
                    group_digits(*member_count),
                    guild_id
                ),
                true,
            );
        }

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
