//! Command metadata and the behavior trait

use async_trait::async_trait;
use serenity::all::{Context, Message, Permissions};

use crate::context::BotState;

/// Grouping tag used by the help overview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    /// Information and everyday commands
    General,
    /// Commands that act on other members' content
    Moderation,
    /// Per-guild configuration commands
    Utility,
}

impl CommandCategory {
    /// Display name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandCategory::General => "General",
            CommandCategory::Moderation => "Moderation",
            CommandCategory::Utility => "Utility",
        }
    }

    /// All categories in help display order
    pub const ALL: &'static [CommandCategory] = &[
        CommandCategory::General,
        CommandCategory::Moderation,
        CommandCategory::Utility,
    ];
}

/// Static metadata for one invocable command.
///
/// Immutable after registration; the registry rejects any spec whose name or
/// aliases collide with an existing entry.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Primary name, the canonical registry key
    pub name: &'static str,
    /// Alternate names resolving to the same command
    pub aliases: &'static [&'static str],
    /// One-line description shown in help
    pub description: &'static str,
    /// Usage string without the prefix
    pub usage: &'static str,
    /// Help category
    pub category: CommandCategory,
    /// Per-user cooldown window in seconds
    pub cooldown_secs: u64,
    /// Capabilities the invoking member must hold; empty means none
    pub required_permissions: Permissions,
    /// Restricted to the configured bot owner
    pub owner_only: bool,
    /// Hidden from the help overview
    pub hidden: bool,
}

impl CommandSpec {
    /// A spec with the defaults every command starts from: 3 second
    /// cooldown, no permissions, visible, not owner-only.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            description: "",
            usage: name,
            category: CommandCategory::General,
            cooldown_secs: 3,
            required_permissions: Permissions::empty(),
            owner_only: false,
            hidden: false,
        }
    }
}

/// One invocable command: static metadata plus async behavior
#[async_trait]
pub trait Command: Send + Sync {
    /// The command's metadata
    fn spec(&self) -> &CommandSpec;

    /// Execute the command against a dispatched message
    async fn run(
        &self,
        ctx: &Context,
        msg: &Message,
        args: &[String],
        state: &BotState,
    ) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_defaults() {
        let spec = CommandSpec::new("example");
        assert_eq!(spec.name, "example");
        assert_eq!(spec.cooldown_secs, 3);
        assert!(spec.aliases.is_empty());
        assert!(spec.required_permissions.is_empty());
        assert!(!spec.owner_only);
        assert!(!spec.hidden);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(CommandCategory::General.as_str(), "General");
        assert_eq!(CommandCategory::Moderation.as_str(), "Moderation");
        assert_eq!(CommandCategory::Utility.as_str(), "Utility");
        assert_eq!(CommandCategory::ALL.len(), 3);
    }
}
