//! Central Discord event wiring

use std::sync::Arc;

use async_trait::async_trait;
use karma_commands::{dispatch, embeds, BotState};
use serenity::all::{
    ActivityData, ChannelId, Context, EventHandler, Guild, GuildChannel, GuildId, Member, Message,
    MessageId, MessageUpdateEvent, Ready, Role, RoleId, User,
};
use tracing::{info, warn};

use crate::{audit, tasks, welcome};

/// Serenity event handler carrying the shared bot state
pub struct Handler {
    state: Arc<BotState>,
}

impl Handler {
    /// Build the handler
    pub fn new(state: Arc<BotState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🚀 {} is online!", ready.user.name);
        info!("📊 Serving {} servers", ready.guilds.len());

        ctx.set_activity(Some(ActivityData::watching(format!(
            "{}help | {} servers",
            self.state.config.discord.prefix,
            ready.guilds.len()
        ))));

        // Keeps the server count in the presence fresh
        tasks::spawn_presence_refresh(ctx, self.state.clone());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        dispatch(&ctx, &msg, &self.state).await;
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        if is_new != Some(true) {
            return;
        }
        info!(
            "🎉 Joined new server: {} ({}) with {} members",
            guild.name, guild.id, guild.member_count
        );

        // Best-effort introduction card to the system channel
        let Some(channel_id) = guild.system_channel_id else {
            return;
        };
        let prefix = &self.state.config.discord.prefix;
        let embed = embeds::success(
            "🤖 Thanks for inviting Karma Bot!",
            format!(
                "Hello! I am ready to help **{}**.\nType `{}help` to see every command.",
                guild.name, prefix
            ),
        )
        .field("⚙️ Prefix", format!("`{}`", prefix), true)
        .field(
            "📋 Commands",
            format!("{}+ commands available", self.state.registry.len()),
            true,
        );

        if let Err(e) = embeds::send(&ctx, channel_id, embed).await {
            warn!("Failed to send introduction card to {}: {}", guild.id, e);
        }
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        welcome::handle_member_join(&ctx, &self.state, &new_member).await;
        audit::member_join(&ctx, &self.state, &new_member).await;
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        member_data_if_available: Option<Member>,
    ) {
        welcome::handle_member_leave(
            &ctx,
            &self.state,
            guild_id,
            &user,
            member_data_if_available.as_ref(),
        )
        .await;
        audit::member_leave(&ctx, &self.state, guild_id, &user).await;
    }

    async fn message_delete(
        &self,
        ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        guild_id: Option<GuildId>,
    ) {
        audit::message_delete(&ctx, &self.state, channel_id, deleted_message_id, guild_id).await;
    }

    async fn message_update(
        &self,
        ctx: Context,
        old_if_available: Option<Message>,
        new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        audit::message_edit(&ctx, &self.state, old_if_available, new, event).await;
    }

    async fn channel_create(&self, ctx: Context, channel: GuildChannel) {
        audit::channel_created(&ctx, &self.state, &channel).await;
    }

    async fn channel_delete(
        &self,
        ctx: Context,
        channel: GuildChannel,
        _messages: Option<Vec<Message>>,
    ) {
        audit::channel_deleted(&ctx, &self.state, &channel).await;
    }

    async fn guild_role_create(&self, ctx: Context, new: Role) {
        audit::role_created(&ctx, &self.state, &new).await;
    }

    async fn guild_role_delete(
        &self,
        ctx: Context,
        guild_id: GuildId,
        removed_role_id: RoleId,
        removed_role_data_if_available: Option<Role>,
    ) {
        audit::role_deleted(
            &ctx,
            &self.state,
            guild_id,
            removed_role_id,
            removed_role_data_if_available.as_ref(),
        )
        .await;
    }
}
