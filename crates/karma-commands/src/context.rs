//! Shared application state threaded through dispatch and commands

use std::sync::Arc;
use std::time::Instant;

use karma_config::Config;
use karma_store::BotStore;

use crate::cooldown::CooldownTracker;
use crate::registry::CommandRegistry;

/// Shared application state accessible across commands and event handlers.
///
/// Built once at startup and passed around behind an `Arc`; the registry is
/// immutable after construction, the cooldown tracker is internally
/// synchronized, and the store serializes its own writes.
pub struct BotState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Settings and statistics store
    pub store: BotStore,
    /// Command registry
    pub registry: Arc<CommandRegistry>,
    /// Per-user command cooldowns
    pub cooldowns: Arc<CooldownTracker>,
    /// Process start time, for uptime displays
    pub started_at: Instant,
}

impl BotState {
    /// Assemble the shared state from its parts
    pub fn new(config: Arc<Config>, store: BotStore, registry: CommandRegistry) -> Self {
        Self {
            config,
            store,
            registry: Arc::new(registry),
            cooldowns: Arc::new(CooldownTracker::new()),
            started_at: Instant::now(),
        }
    }

    /// The effective prefix for a guild (or the global default outside one)
    pub fn prefix_for(&self, guild_id: Option<u64>) -> String {
        match guild_id {
            Some(id) => self
                .store
                .guild_prefix(id, &self.config.discord.prefix),
            None => self.config.discord.prefix.clone(),
        }
    }
}

impl std::fmt::Debug for BotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotState")
            .field("config", &"<Config>")
            .field("store", &"<BotStore>")
            .field("registry", &format!("{} commands", self.registry.len()))
            .field("cooldowns", &self.cooldowns.len())
            .finish()
    }
}
