//! # Karma Templates
//!
//! The placeholder substitution engine behind welcome and goodbye messages.
//! Rendering is a pure function over platform-free context structs; the
//! caller resolves Discord entities into a [`MemberContext`] and
//! [`GuildContext`] first. Unknown placeholders pass through verbatim so a
//! malformed user-authored template degrades instead of failing the send.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod engine;

pub use context::{GuildContext, MemberContext};
pub use engine::{render, render_now, TEMPLATE_REFERENCE};

/// Welcome template used when a guild has not configured one
pub const DEFAULT_WELCOME_TEMPLATE: &str =
    "Welcome {user} to **{server}**! 🎉{newline}You are our {membercount:ordinal} member.";

/// Goodbye template used when a guild has not configured one
pub const DEFAULT_GOODBYE_TEMPLATE: &str =
    "{username} has left **{server}**. 😢{newline}We now have {membercount} members.";
