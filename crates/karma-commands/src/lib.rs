//! # Karma Commands
//!
//! The command layer of Karma Bot: descriptor metadata, the name/alias
//! registry, the per-user cooldown tracker, the permission gate, the
//! message dispatch pipeline and every command implementation.

#![warn(clippy::all)]

pub mod commands;
pub mod context;
pub mod cooldown;
pub mod descriptor;
pub mod dispatcher;
pub mod embeds;
pub mod permissions;
pub mod registry;
pub mod template_context;

pub use context::BotState;
pub use cooldown::CooldownTracker;
pub use descriptor::{Command, CommandCategory, CommandSpec};
pub use dispatcher::dispatch;
pub use registry::{CommandRegistry, RegistryError};
