//! Karma Bot - Main Entry Point

use std::sync::Arc;

use anyhow::Context as _;
use karma_bot::{tasks, Handler};
use karma_commands::{commands, BotState, CommandRegistry};
use karma_common::logging::{init_logging, LoggingConfig};
use karma_config::ConfigLoader;
use karma_store::BotStore;
use serenity::all::GatewayIntents;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration first; logging level comes from it
    let config = Arc::new(ConfigLoader::load().context("Failed to load configuration")?);

    init_logging(LoggingConfig {
        level: config.logging.level.clone(),
        file_path: config.logging.file.clone(),
        ..LoggingConfig::default()
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting Karma Bot v{}", env!("CARGO_PKG_VERSION"));

    // A store that cannot open is fatal; nothing works without settings
    let store = BotStore::open(&config.database.path)
        .context("Failed to initialize the settings store")?;

    let mut registry = CommandRegistry::new();
    registry.register_all(commands::all());
    info!("{} commands registered", registry.len());

    let state = Arc::new(BotState::new(config.clone(), store.clone(), registry));

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    // Keep recent messages cached so deleted-message logging has content
    let mut cache_settings = serenity::cache::Settings::default();
    cache_settings.max_messages = 300;

    let mut client = serenity::Client::builder(&config.discord.token, intents)
        .cache_settings(cache_settings)
        .event_handler(Handler::new(state.clone()))
        .await
        .context("Failed to create Discord client")?;

    info!("Discord client created");

    tasks::spawn_store_cleanup(store.clone());
    tasks::spawn_cooldown_sweep(state.cooldowns.clone());

    // Flush the store and close the gateway on termination signals
    let shard_manager = client.shard_manager.clone();
    let shutdown_store = store.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!("Failed to listen for shutdown signals: {}", e);
            return;
        }

        info!("Shutdown signal received, cleaning up");
        if let Err(e) = shutdown_store.cleanup() {
            error!("Store cleanup failed during shutdown: {:#}", e);
        }
        if let Err(e) = shutdown_store.flush().await {
            error!("Store flush failed during shutdown: {:#}", e);
        }
        shard_manager.shutdown_all().await;
        info!("Shutdown complete");
    });

    // A failed login is the other fatal startup condition
    if let Err(e) = client.start().await {
        error!("Client error: {:?}", e);
        return Err(e.into());
    }

    info!("Karma Bot has shut down");
    Ok(())
}

/// Resolve on SIGINT, and on SIGTERM where available
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = sigterm.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
