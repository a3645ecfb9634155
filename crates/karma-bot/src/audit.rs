//! Audit-log forwarding
//!
//! Every handler gates on the guild's stored logging settings, captures
//! message events into the store and forwards an embed to the configured
//! log channel. Any collaborator failure degrades to a no-op.

use chrono::Utc;
use karma_commands::{embeds, BotState};
use karma_config::colors;
use karma_store::{LogEventKind, LoggingSettings, MessageLogRecord};
use serenity::all::{
    ChannelId, ChannelType, Context, CreateEmbed, GuildChannel, GuildId, Member, Message,
    MessageId, MessageUpdateEvent, Role, RoleId,
};
use tracing::warn;

use crate::welcome::truncate_content;

/// Load a guild's logging settings, degrading to disabled on store errors
fn settings_for(state: &BotState, guild_id: u64) -> LoggingSettings {
    state.store.logging_settings(guild_id).unwrap_or_else(|e| {
        warn!("Failed to read logging settings for guild {}: {:#}", guild_id, e);
        LoggingSettings::default()
    })
}

/// Send an audit embed to the guild's configured log channel
async fn forward(ctx: &Context, settings: &LoggingSettings, embed: CreateEmbed) {
    let Some(channel_id) = settings.channel_id else {
        return;
    };
    if let Err(e) = embeds::send(ctx, ChannelId::new(channel_id), embed).await {
        warn!("Failed to send audit log message: {}", e);
    }
}

/// Handle a deleted message
pub async fn message_delete(
    ctx: &Context,
    state: &BotState,
    channel_id: ChannelId,
    message_id: MessageId,
    guild_id: Option<GuildId>,
) {
    let Some(guild_id) = guild_id else { return };
    let settings = settings_for(state, guild_id.get());
    if !settings.enabled || !settings.message_delete {
        return;
    }

    // The deleted message is only available through the cache
    let cached = ctx
        .cache
        .message(channel_id, message_id)
        .map(|message| (message.author.id.get(), message.author.bot, message.content.clone()));

    // Bot messages are not logged
    if cached.as_ref().map(|(_, bot, _)| *bot).unwrap_or(false) {
        return;
    }

    let record = MessageLogRecord {
        guild_id: guild_id.get(),
        channel_id: channel_id.get(),
        message_id: message_id.get(),
        user_id: cached.as_ref().map(|(author_id, _, _)| *author_id),
        content: cached
            .as_ref()
            .map(|(_, _, content)| content.clone())
            .unwrap_or_default(),
        event_kind: LogEventKind::Delete,
        old_content: None,
        timestamp: Utc::now(),
    };
    if let Err(e) = state.store.log_message(&record) {
        warn!("Failed to store message-delete log: {:#}", e);
    }

    let mut embed = embeds::branded("🗑️ Message Deleted", "", colors::ERROR)
        .field(
            "👤 Author",
            record
                .user_id
                .map(|id| format!("<@{}>", id))
                .unwrap_or_else(|| "Unknown".to_string()),
            true,
        )
        .field("📝 Channel", format!("<#{}>", channel_id), true);
    if !record.content.is_empty() {
        embed = embed.field("💬 Content", truncate_content(&record.content, 1024), false);
    }

    forward(ctx, &settings, embed).await;
}

/// Handle an edited message
pub async fn message_edit(
    ctx: &Context,
    state: &BotState,
    old_if_available: Option<Message>,
    new: Option<Message>,
    event: MessageUpdateEvent,
) {
    let Some(guild_id) = event.guild_id else { return };
    let settings = settings_for(state, guild_id.get());
    if !settings.enabled || !settings.message_edit {
        return;
    }

    let author = new
        .as_ref()
        .map(|message| message.author.clone())
        .or_else(|| event.author.clone());
    if author.as_ref().map(|author| author.bot).unwrap_or(false) {
        return;
    }

    let new_content = new
        .as_ref()
        .map(|message| message.content.clone())
        .or_else(|| event.content.clone())
        .unwrap_or_default();
    let old_content = old_if_available
        .as_ref()
        .map(|message| message.content.clone());

    // Embed-only updates carry identical content; nothing worth logging
    if old_content.as_deref() == Some(new_content.as_str()) {
        return;
    }

    let record = MessageLogRecord {
        guild_id: guild_id.get(),
        channel_id: event.channel_id.get(),
        message_id: event.id.get(),
        user_id: author.as_ref().map(|author| author.id.get()),
        content: new_content.clone(),
        event_kind: LogEventKind::Edit,
        old_content: old_content.clone(),
        timestamp: Utc::now(),
    };
    if let Err(e) = state.store.log_message(&record) {
        warn!("Failed to store message-edit log: {:#}", e);
    }

    let mut embed = embeds::branded("✏️ Message Edited", "", colors::WARNING)
        .field(
            "👤 Author",
            author
                .map(|author| format!("{} ({})", author.tag(), author.id))
                .unwrap_or_else(|| "Unknown".to_string()),
            true,
        )
        .field("📝 Channel", format!("<#{}>", event.channel_id), true);
    if let Some(before) = old_content.filter(|content| !content.is_empty()) {
        embed = embed.field("Before", truncate_content(&before, 512), false);
    }
    if !new_content.is_empty() {
        embed = embed.field("After", truncate_content(&new_content, 512), false);
    }

    forward(ctx, &settings, embed).await;
}

/// Handle a member joining
pub async fn member_join(ctx: &Context, state: &BotState, member: &Member) {
    let settings = settings_for(state, member.guild_id.get());
    if !settings.enabled || !settings.member_join {
        return;
    }

    let embed = embeds::branded("📥 Member Joined", "", colors::SUCCESS)
        .thumbnail(member.user.face())
        .field(
            "👤 User",
            format!("{} ({})", member.user.tag(), member.user.id),
            true,
        )
        .field(
            "📅 Account Created",
            format!("<t:{}:F>", member.user.id.created_at().unix_timestamp()),
            true,
        );

    forward(ctx, &settings, embed).await;
}

/// Handle a member leaving
pub async fn member_leave(
    ctx: &Context,
    state: &BotState,
    guild_id: GuildId,
    user: &serenity::all::User,
) {
    let settings = settings_for(state, guild_id.get());
    if !settings.enabled || !settings.member_leave {
        return;
    }

    let embed = embeds::branded("📤 Member Left", "", colors::ERROR)
        .thumbnail(user.face())
        .field("👤 User", format!("{} ({})", user.tag(), user.id), true);

    forward(ctx, &settings, embed).await;
}

fn channel_type_name(kind: ChannelType) -> &'static str {
    match kind {
        ChannelType::Text => "Text Channel",
        ChannelType::Voice => "Voice Channel",
        ChannelType::Category => "Category",
        ChannelType::News => "News Channel",
        ChannelType::Stage => "Stage Channel",
        ChannelType::Forum => "Forum Channel",
        _ => "Unknown",
    }
}

/// Handle a created channel
pub async fn channel_created(ctx: &Context, state: &BotState, channel: &GuildChannel) {
    let settings = settings_for(state, channel.guild_id.get());
    if !settings.enabled || !settings.channel_create {
        return;
    }

    let embed = embeds::branded("➕ Channel Created", "", colors::SUCCESS)
        .field("📝 Name", channel.name.clone(), true)
        .field("🏷️ Type", channel_type_name(channel.kind), true)
        .field("🆔 ID", channel.id.to_string(), true);

    forward(ctx, &settings, embed).await;
}

/// Handle a deleted channel
pub async fn channel_deleted(ctx: &Context, state: &BotState, channel: &GuildChannel) {
    let settings = settings_for(state, channel.guild_id.get());
    if !settings.enabled || !settings.channel_delete {
        return;
    }

    let embed = embeds::branded("➖ Channel Deleted", "", colors::ERROR)
        .field("📝 Name", channel.name.clone(), true)
        .field("🏷️ Type", channel_type_name(channel.kind), true)
        .field("🆔 ID", channel.id.to_string(), true);

    forward(ctx, &settings, embed).await;
}

/// Handle a created role
pub async fn role_created(ctx: &Context, state: &BotState, role: &Role) {
    let settings = settings_for(state, role.guild_id.get());
    if !settings.enabled || !settings.role_create {
        return;
    }

    let embed = embeds::branded("🏷️ Role Created", "", colors::SUCCESS)
        .field("📝 Name", role.name.clone(), true)
        .field("🆔 ID", role.id.to_string(), true)
        .field("📍 Position", role.position.to_string(), true)
        .field("🔒 Mentionable", if role.mentionable { "Yes" } else { "No" }, true);

    forward(ctx, &settings, embed).await;
}

/// Handle a deleted role
pub async fn role_deleted(
    ctx: &Context,
    state: &BotState,
    guild_id: GuildId,
    role_id: RoleId,
    role: Option<&Role>,
) {
    let settings = settings_for(state, guild_id.get());
    if !settings.enabled || !settings.role_delete {
        return;
    }

    let embed = embeds::branded("🗑️ Role Deleted", "", colors::ERROR)
        .field(
            "📝 Name",
            role.map(|role| role.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            true,
        )
        .field("🆔 ID", role_id.to_string(), true);

    forward(ctx, &settings, embed).await;
}
