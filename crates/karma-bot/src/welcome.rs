//! Welcome and goodbye message pipeline
//!
//! Gates on the guild's stored welcome settings, renders the configured
//! template against the member and guild, and sends the result as an embed
//! or plain text with optional mention and auto-delete. Counters track how
//! many messages each side has sent.

use std::time::Duration;

use karma_commands::template_context::{guild_context, member_context, user_context};
use karma_commands::BotState;
use karma_store::{WelcomeKind, WelcomeSettings};
use karma_templates::{
    render_now, GuildContext, MemberContext, DEFAULT_GOODBYE_TEMPLATE, DEFAULT_WELCOME_TEMPLATE,
};
use serenity::all::{
    ChannelId, Colour, Context, CreateEmbed, CreateEmbedFooter, CreateMessage, GuildId, Member,
    Timestamp, User,
};
use tracing::{debug, warn};

/// Truncate text for an embed field, appending an ellipsis when shortened
pub fn truncate_content(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let shortened: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", shortened)
}

/// Load welcome settings, degrading to disabled on store errors
fn settings_for(state: &BotState, guild_id: u64) -> WelcomeSettings {
    state.store.welcome_settings(guild_id).unwrap_or_else(|e| {
        warn!("Failed to read welcome settings for guild {}: {:#}", guild_id, e);
        WelcomeSettings::default()
    })
}

/// Send a rendered welcome/goodbye message and arm its auto-delete timer
async fn deliver(
    ctx: &Context,
    settings: &WelcomeSettings,
    channel_id: ChannelId,
    title: &str,
    rendered: String,
    thumbnail: String,
    ping: Option<u64>,
) -> serenity::Result<()> {
    let mut message = CreateMessage::new();

    if settings.embed_enabled {
        let embed = CreateEmbed::new()
            .title(title)
            .description(rendered)
            .colour(Colour::new(settings.embed_color))
            .thumbnail(thumbnail)
            .footer(CreateEmbedFooter::new("Karma Bot"))
            .timestamp(Timestamp::now());
        message = message.embed(embed);
        if let Some(user_id) = ping {
            message = message.content(format!("<@{}>", user_id));
        }
    } else {
        let content = match ping {
            Some(user_id) => format!("<@{}>\n{}", user_id, rendered),
            None => rendered,
        };
        message = message.content(content);
    }

    let sent = channel_id.send_message(&ctx.http, message).await?;

    if settings.delete_after_secs > 0 {
        let http = ctx.http.clone();
        let delay = Duration::from_secs(settings.delete_after_secs);
        let message_id = sent.id;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = http.delete_message(channel_id, message_id, None).await {
                debug!("Failed to auto-delete welcome message: {}", e);
            }
        });
    }

    Ok(())
}

/// Handle a member joining the guild
pub async fn handle_member_join(ctx: &Context, state: &BotState, member: &Member) {
    let guild_id = member.guild_id.get();
    let settings = settings_for(state, guild_id);
    if !settings.enabled || !settings.welcome_enabled {
        return;
    }
    let Some(channel_id) = settings.channel_id else {
        return;
    };

    // Snapshot the cache before any await
    let contexts: Option<(MemberContext, GuildContext)> = ctx
        .cache
        .guild(member.guild_id)
        .map(|guild| (member_context(&guild, member), guild_context(&guild)));
    let Some((member_ctx, guild_ctx)) = contexts else {
        warn!("Guild {} missing from cache for welcome message", guild_id);
        return;
    };

    let template = settings
        .welcome_message
        .as_deref()
        .unwrap_or(DEFAULT_WELCOME_TEMPLATE);
    let rendered = render_now(template, &member_ctx, &guild_ctx);
    let ping = settings.ping_user.then(|| member_ctx.user_id);

    if let Err(e) = deliver(
        ctx,
        &settings,
        ChannelId::new(channel_id),
        "🎉 Welcome to the Server!",
        rendered,
        member_ctx.avatar_url.clone(),
        ping,
    )
    .await
    {
        warn!("Failed to send welcome message in guild {}: {}", guild_id, e);
        return;
    }

    if let Err(e) = state.store.increment_welcome_count(guild_id, WelcomeKind::Welcome) {
        warn!("Failed to bump welcome counter for guild {}: {:#}", guild_id, e);
    }
    debug!("Welcome message sent for {} in guild {}", member_ctx.username, guild_id);
}

/// Handle a member leaving the guild
pub async fn handle_member_leave(
    ctx: &Context,
    state: &BotState,
    guild_id: GuildId,
    user: &User,
    member_data: Option<&Member>,
) {
    let settings = settings_for(state, guild_id.get());
    if !settings.enabled || !settings.goodbye_enabled {
        return;
    }
    let Some(channel_id) = settings.channel_id else {
        return;
    };

    // The member may already be gone from the cache; fall back to bare
    // user data in that case
    let contexts: Option<(MemberContext, GuildContext)> =
        ctx.cache.guild(guild_id).map(|guild| {
            let member_ctx = match member_data {
                Some(member) => member_context(&guild, member),
                None => user_context(user),
            };
            (member_ctx, guild_context(&guild))
        });
    let Some((member_ctx, guild_ctx)) = contexts else {
        warn!("Guild {} missing from cache for goodbye message", guild_id);
        return;
    };

    let template = settings
        .goodbye_message
        .as_deref()
        .unwrap_or(DEFAULT_GOODBYE_TEMPLATE);
    let rendered = render_now(template, &member_ctx, &guild_ctx);

    if let Err(e) = deliver(
        ctx,
        &settings,
        ChannelId::new(channel_id),
        "👋 Goodbye!",
        rendered,
        member_ctx.avatar_url.clone(),
        None,
    )
    .await
    {
        warn!("Failed to send goodbye message in guild {}: {}", guild_id, e);
        return;
    }

    if let Err(e) = state
        .store
        .increment_welcome_count(guild_id.get(), WelcomeKind::Goodbye)
    {
        warn!("Failed to bump goodbye counter for guild {}: {:#}", guild_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("short", 16), "short");
        assert_eq!(truncate_content("0123456789", 10), "0123456789");
        assert_eq!(truncate_content("0123456789abc", 10), "0123456...");
    }
}
