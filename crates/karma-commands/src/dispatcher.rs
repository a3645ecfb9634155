//! Message dispatch pipeline
//!
//! Every inbound message walks the same gate sequence: bot-author ignore,
//! prefix match (configured prefix or a leading bot mention), parse,
//! registry resolution, owner gate, permission gate, cooldown gate,
//! execution. Gate failures are user-facing replies, never faults; a
//! command's own error is caught here and reported generically so one bad
//! invocation cannot take the event loop down with it.

use std::time::Duration;

use serenity::all::{Context, Message, Permissions};
use tracing::{debug, error, warn};

use crate::context::BotState;
use crate::embeds;
use crate::permissions::{effective_permissions, missing_permissions, permission_names};

/// Match a configured prefix or a leading bot mention, returning the text
/// after the matched token.
///
/// The configured prefix is preferred; `<@id>` and `<@!id>` mentions match
/// regardless of the configured prefix.
pub fn match_prefix<'a>(content: &'a str, prefix: &str, bot_id: u64) -> Option<&'a str> {
    if !prefix.is_empty() {
        if let Some(rest) = content.strip_prefix(prefix) {
            return Some(rest);
        }
    }

    let mention = format!("<@{}>", bot_id);
    if let Some(rest) = content.strip_prefix(&mention) {
        return Some(rest);
    }

    let nick_mention = format!("<@!{}>", bot_id);
    content.strip_prefix(&nick_mention)
}

/// Split the text after the prefix into a case-folded command name and its
/// positional arguments. Splitting is on runs of whitespace; `None` when no
/// command token remains.
pub fn split_invocation(rest: &str) -> Option<(String, Vec<String>)> {
    let mut parts = rest.split_whitespace();
    let name = parts.next()?.to_lowercase();
    let args = parts.map(str::to_string).collect();
    Some((name, args))
}

/// Resolve the invoking member's effective permissions from the cache.
/// `None` when the message has no guild or the member is not cached.
fn held_permissions(ctx: &Context, msg: &Message) -> Option<Permissions> {
    let guild = msg.guild(&ctx.cache)?;
    let member = guild.members.get(&msg.author.id)?;
    Some(effective_permissions(&guild, member))
}

/// Run one message through the dispatch pipeline
pub async fn dispatch(ctx: &Context, msg: &Message, state: &BotState) {
    // Bots never trigger commands; this also prevents reply loops
    if msg.author.bot {
        return;
    }

    let prefix = state.prefix_for(msg.guild_id.map(|id| id.get()));
    let bot_id = ctx.cache.current_user().id.get();

    let Some(rest) = match_prefix(&msg.content, &prefix, bot_id) else {
        return;
    };
    let Some((name, args)) = split_invocation(rest) else {
        return;
    };

    let Some(command) = state.registry.resolve(&name) else {
        let embed = embeds::error(
            "❓ Command Not Found",
            format!(
                "Command `{}{}` was not found!\nUse `{}help` to see every command.",
                prefix, name, prefix
            ),
        );
        if let Err(e) = embeds::reply(ctx, msg, embed).await {
            warn!("Failed to send unknown-command reply: {}", e);
        }
        return;
    };
    let spec = command.spec();

    // Owner gate
    if spec.owner_only && state.config.discord.owner_id != Some(msg.author.id.get()) {
        let embed = embeds::error(
            "🚫 Access Denied",
            "This command can only be used by the bot owner!",
        );
        if let Err(e) = embeds::reply(ctx, msg, embed).await {
            warn!("Failed to send access-denied reply: {}", e);
        }
        return;
    }

    // Permission gate; commands that require capabilities are server-only
    if !spec.required_permissions.is_empty() {
        let Some(held) = held_permissions(ctx, msg) else {
            let embed = embeds::error("❌ Error", "This command can only be used in a server!");
            if let Err(e) = embeds::reply(ctx, msg, embed).await {
                warn!("Failed to send server-only reply: {}", e);
            }
            return;
        };

        let missing = missing_permissions(spec.required_permissions, held);
        if !missing.is_empty() {
            let embed = embeds::error(
                "🚫 Missing Permissions",
                format!(
                    "You need the following permissions: `{}`",
                    permission_names(missing).join(", ")
                ),
            );
            if let Err(e) = embeds::reply(ctx, msg, embed).await {
                warn!("Failed to send missing-permissions reply: {}", e);
            }
            return;
        }
    }

    // Cooldown gate; an active window replies without resetting the timer
    let user_id = msg.author.id.get();
    if let Some(remaining) = state.cooldowns.check(spec.name, user_id) {
        let embed = embeds::warning(
            "⏰ Cooldown",
            format!(
                "Wait {:.1} seconds before using `{}` again.",
                remaining.as_secs_f64(),
                spec.name
            ),
        );
        if let Err(e) = embeds::reply(ctx, msg, embed).await {
            warn!("Failed to send cooldown reply: {}", e);
        }
        return;
    }
    state
        .cooldowns
        .hit(spec.name, user_id, Duration::from_secs(spec.cooldown_secs));

    debug!("Executing command '{}' for user {}", spec.name, user_id);

    match command.run(ctx, msg, &args, state).await {
        Ok(()) => {
            // Best-effort usage recording; never affects the user-visible outcome
            if let Err(e) = state.store.touch_user(user_id, &msg.author.name) {
                warn!("Failed to update user record: {:#}", e);
            }
            if let Err(e) = state.store.log_command_usage(
                msg.guild_id.map(|id| id.get()),
                user_id,
                spec.name,
            ) {
                warn!("Failed to log command usage: {:#}", e);
            }
        }
        Err(e) => {
            error!("Error executing command '{}': {:#}", spec.name, e);
            let embed = embeds::error("❌ Error", "Something went wrong while running the command!");
            if let Err(e) = embeds::reply(ctx, msg, embed).await {
                warn!("Failed to send command-error reply: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_ID: u64 = 4242;

    #[test]
    fn test_match_configured_prefix() {
        assert_eq!(match_prefix("!ping", "!", BOT_ID), Some("ping"));
        assert_eq!(match_prefix("?ping", "?", BOT_ID), Some("ping"));
        assert_eq!(match_prefix("!ping", "?", BOT_ID), None);
        assert_eq!(match_prefix("ping", "!", BOT_ID), None);
        // Multi-character prefixes match as a unit
        assert_eq!(match_prefix("k!ping", "k!", BOT_ID), Some("ping"));
        assert_eq!(match_prefix("k?ping", "k!", BOT_ID), None);
    }

    #[test]
    fn test_match_mention_prefix() {
        assert_eq!(
            match_prefix("<@4242> ping", "!", BOT_ID),
            Some(" ping")
        );
        assert_eq!(
            match_prefix("<@!4242> ping", "?", BOT_ID),
            Some(" ping")
        );
        // A mention in the middle is not a prefix
        assert_eq!(match_prefix("hey <@4242> ping", "!", BOT_ID), None);
        // A different user's mention does not match
        assert_eq!(match_prefix("<@9999> ping", "!", BOT_ID), None);
    }

    #[test]
    fn test_split_invocation() {
        assert_eq!(
            split_invocation("ping"),
            Some(("ping".to_string(), vec![]))
        );
        assert_eq!(
            split_invocation(" PREFIX ? "),
            Some(("prefix".to_string(), vec!["?".to_string()]))
        );
        assert_eq!(
            split_invocation("clear   10   silent"),
            Some((
                "clear".to_string(),
                vec!["10".to_string(), "silent".to_string()]
            ))
        );
        assert_eq!(split_invocation(""), None);
        assert_eq!(split_invocation("   "), None);
    }

    #[test]
    fn test_prefix_resolution_against_store() {
        use karma_store::BotStore;

        let dir = tempfile::tempdir().expect("temp dir");
        let store = BotStore::open(dir.path().join("store")).expect("open store");
        let global = "!";

        // No row yet: the global default applies
        assert_eq!(store.guild_prefix(1, global), "!");
        assert!(match_prefix("!ping", &store.guild_prefix(1, global), BOT_ID).is_some());

        // Configure '?' for the guild; '!' stops matching, '?' starts
        store.set_guild_prefix(1, "?").expect("set prefix");
        let prefix = store.guild_prefix(1, global);
        assert_eq!(prefix, "?");
        assert!(match_prefix("?ping", &prefix, BOT_ID).is_some());
        assert!(match_prefix("!ping", &prefix, BOT_ID).is_none());

        // The bot mention keeps matching regardless of the configured prefix
        assert!(match_prefix("<@4242> ping", &prefix, BOT_ID).is_some());
    }
}
