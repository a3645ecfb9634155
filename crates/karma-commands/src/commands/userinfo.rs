//! User information card

use async_trait::async_trait;
use serenity::all::{Context, Message, Permissions, RoleId, User};

use crate::context::BotState;
use crate::descriptor::{Command, CommandSpec};
use crate::embeds;
use crate::permissions::effective_permissions;

/// Owned snapshot of cached member state, extracted before any await
struct MemberSummary {
    joined_at: Option<i64>,
    nickname: Option<String>,
    highest_role: Option<String>,
    role_count: usize,
    is_admin: bool,
}

fn member_summary(ctx: &Context, msg: &Message, user: &User) -> Option<MemberSummary> {
    let guild = msg.guild(&ctx.cache)?;
    let member = guild.members.get(&user.id)?;

    let everyone = RoleId::new(guild.id.get());
    let highest_role = member
        .roles
        .iter()
        .filter(|role_id| **role_id != everyone)
        .filter_map(|role_id| guild.roles.get(role_id))
        .max_by_key(|role| role.position)
        .map(|role| role.name.clone());

    Some(MemberSummary {
        joined_at: member.joined_at.map(|at| at.unix_timestamp()),
        nickname: member.nick.clone(),
        highest_role,
        role_count: member.roles.len(),
        is_admin: effective_permissions(&guild, member).contains(Permissions::ADMINISTRATOR),
    })
}

/// `userinfo` command: details about a user and their membership
pub struct UserInfo {
    spec: CommandSpec,
}

impl UserInfo {
    /// Build the command
    pub fn new() -> Self {
        Self {
            spec: CommandSpec {
                aliases: &["ui", "user", "whois"],
                description: "Show information about a user",
                usage: "userinfo [@user]",
                ..CommandSpec::new("userinfo")
            },
        }
    }
}

impl Default for UserInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for UserInfo {
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
        let user = msg.mentions.first().unwrap_or(&msg.author).clone();
        let summary = member_summary(ctx, msg, &user);

        let mut embed = embeds::info(format!("👤 User Information: {}", user.name), "")
            .thumbnail(user.face())
            .field("Username", user.name.clone(), true)
            .field("Tag", user.tag(), true)
            .field("ID", user.id.to_string(), true)
            .field(
                "Account Created",
                format!("<t:{}:F>", user.id.created_at().unix_timestamp()),
                true,
            );

        match summary {
            Some(member) => {
                embed = embed
                    .field(
                        "Joined Server",
                        member
                            .joined_at
                            .map(|at| format!("<t:{}:F>", at))
                            .unwrap_or_else(|| "Unknown".to_string()),
                        true,
                    )
                    .field(
                        "Highest Role",
                        member.highest_role.unwrap_or_else(|| "None".to_string()),
                        true,
                    )
                    .field("Role Count", member.role_count.to_string(), true)
                    .field(
                        "Nickname",
                        member.nickname.unwrap_or_else(|| "None".to_string()),
                        true,
                    );

                let mut badges = Vec::new();
                if user.bot {
                    badges.push("🤖 Bot");
                }
                if member.is_admin {
                    badges.push("👑 Admin");
                }
                if !badges.is_empty() {
                    embed = embed.field("Badges", badges.join(" "), false);
                }
            }
            None => {
                embed = embed.field("Server Member", "No", true);
            }
        }

        embeds::reply(ctx, msg, embed).await?;
        Ok(())
    }
}
