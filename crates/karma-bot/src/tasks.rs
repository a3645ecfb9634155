//! Periodic background tasks

use std::sync::Arc;
use std::time::Duration;

use karma_commands::{BotState, CooldownTracker};
use karma_store::BotStore;
use serenity::all::{ActivityData, Context};
use tokio::time::interval;
use tracing::{info, warn};

/// How often stale usage and message-log records are purged
const STORE_CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
/// How often expired cooldown entries are swept
const COOLDOWN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// How often the presence line is refreshed
const PRESENCE_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Purge stale store records on a daily schedule
pub fn spawn_store_cleanup(store: BotStore) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(STORE_CLEANUP_INTERVAL);
        // The first tick fires immediately; skip it so startup stays quick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            info!("🧹 Running store cleanup");
            match store.cleanup() {
                Ok((usage, messages)) => {
                    info!("Cleanup removed {} usage records, {} message logs", usage, messages);
                }
                Err(e) => warn!("Store cleanup failed: {:#}", e),
            }
        }
    })
}

/// Sweep expired cooldown entries once a minute
pub fn spawn_cooldown_sweep(cooldowns: Arc<CooldownTracker>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(COOLDOWN_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            cooldowns.sweep();
        }
    })
}

/// Keep the watching-status server count fresh
pub fn spawn_presence_refresh(ctx: Context, state: Arc<BotState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(PRESENCE_REFRESH_INTERVAL);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let guild_count = ctx.cache.guild_count();
            ctx.set_activity(Some(ActivityData::watching(format!(
                "{}help | {} servers",
                state.config.discord.prefix, guild_count
            ))));
        }
    })
}
