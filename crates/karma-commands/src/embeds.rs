//! Branded embed builders shared by every reply card

use karma_config::colors;
use serenity::all::{
    ChannelId, Colour, Context, CreateEmbed, CreateEmbedFooter, CreateMessage, Message, Timestamp,
};

/// Base embed with the bot's footer, timestamp and the given accent color
pub fn branded(title: impl Into<String>, description: impl Into<String>, color: u32) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(Colour::new(color))
        .footer(CreateEmbedFooter::new("Karma Bot"))
        .timestamp(Timestamp::now())
}

/// Success card
pub fn success(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    branded(title, description, colors::SUCCESS)
}

/// Error card
pub fn error(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    branded(title, description, colors::ERROR)
}

/// Warning card
pub fn warning(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    branded(title, description, colors::WARNING)
}

/// Informational card
pub fn info(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    branded(title, description, colors::INFO)
}

/// Primary-branding card
pub fn primary(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    branded(title, description, colors::PRIMARY)
}

/// Reply to a message with an embed
pub async fn reply(ctx: &Context, msg: &Message, embed: CreateEmbed) -> serenity::Result<Message> {
    msg.channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().reference_message(msg).embed(embed),
        )
        .await
}

/// Send an embed to a channel without a reply reference
pub async fn send(
    ctx: &Context,
    channel_id: ChannelId,
    embed: CreateEmbed,
) -> serenity::Result<Message> {
    channel_id
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await
}
