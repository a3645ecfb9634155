//! Integration tests for the dispatch gate sequence.
//!
//! These drive the pipeline's pure stages (prefix match, parsing, registry
//! resolution, permission gate, cooldown gate) against a real store, with
//! the clock supplied explicitly so the cooldown behavior is deterministic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use karma_commands::cooldown::CooldownTracker;
use karma_commands::dispatcher::{match_prefix, split_invocation};
use karma_commands::permissions::{missing_permissions, permission_names};
use karma_commands::{Command, CommandRegistry, CommandSpec};
use karma_store::BotStore;
use serenity::all::{Context, Message, Permissions};

const BOT_ID: u64 = 777;

struct Recorded {
    spec: CommandSpec,
}

impl Recorded {
    fn prefix_command() -> Arc<dyn Command> {
        Arc::new(Self {
            spec: CommandSpec {
                aliases: &["setprefix"],
                required_permissions: Permissions::MANAGE_GUILD,
                cooldown_secs: 5,
                ..CommandSpec::new("prefix")
            },
        })
    }

    fn ping_command() -> Arc<dyn Command> {
        Arc::new(Self {
            spec: CommandSpec {
                cooldown_secs: 3,
                ..CommandSpec::new("ping")
            },
        })
    }
}

#[async_trait]
impl Command for Recorded {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn run(
        &self,
        _ctx: &Context,
        _msg: &Message,
        _args: &[String],
        _state: &karma_commands::BotState,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register_all(vec![Recorded::ping_command(), Recorded::prefix_command()]);
    registry
}

#[test]
fn unauthorized_prefix_change_is_blocked_before_the_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = BotStore::open(dir.path().join("store")).expect("open store");
    let registry = registry();
    let guild_id = 1u64;
    let global = "!";

    // `!prefix ?` parses and resolves
    let prefix = store.guild_prefix(guild_id, global);
    let rest = match_prefix("!prefix ?", &prefix, BOT_ID).expect("prefix matches");
    let (name, args) = split_invocation(rest).expect("parses");
    assert_eq!(name, "prefix");
    assert_eq!(args, vec!["?".to_string()]);

    let command = registry.resolve(&name).expect("resolves");
    let spec = command.spec();

    // A member without Manage Guild fails the permission gate; the stored
    // prefix must remain unchanged
    let held = Permissions::SEND_MESSAGES | Permissions::VIEW_CHANNEL;
    let missing = missing_permissions(spec.required_permissions, held);
    assert!(!missing.is_empty());
    assert_eq!(permission_names(missing), vec!["Manage Guild".to_string()]);
    assert_eq!(store.guild_prefix(guild_id, global), "!");

    // An authorized member passes the gate; after the update only the new
    // prefix dispatches in that guild
    let held = held | Permissions::MANAGE_GUILD;
    assert!(missing_permissions(spec.required_permissions, held).is_empty());
    store
        .set_guild_prefix(guild_id, &args[0])
        .expect("store prefix");

    let prefix = store.guild_prefix(guild_id, global);
    assert_eq!(prefix, "?");
    assert!(match_prefix("?ping", &prefix, BOT_ID).is_some());
    assert!(match_prefix("!ping", &prefix, BOT_ID).is_none());
    // The bot mention still dispatches regardless of the configured prefix
    assert!(match_prefix("<@777> ping", &prefix, BOT_ID).is_some());
}

#[test]
fn cooldown_gate_replies_with_remaining_time_and_reopens() {
    let registry = registry();
    let cooldowns = CooldownTracker::new();
    let user_id = 42u64;
    let base = Instant::now();

    let command = registry.resolve("ping").expect("resolves");
    let spec = command.spec();
    let window = Duration::from_secs(spec.cooldown_secs);

    // First invocation passes and opens the window
    assert_eq!(cooldowns.check_at(spec.name, user_id, base), None);
    cooldowns.hit_at(spec.name, user_id, window, base);

    // One second later the gate reports roughly two seconds remaining,
    // without resetting the timer
    let remaining = cooldowns
        .check_at(spec.name, user_id, base + Duration::from_secs(1))
        .expect("on cooldown");
    let seconds = remaining.as_secs_f64();
    assert!((1.9..=2.0).contains(&seconds), "remaining {}", seconds);
    assert_eq!(format!("{:.1}", seconds), "2.0");

    // After the window elapses the command dispatches again
    assert_eq!(
        cooldowns.check_at(spec.name, user_id, base + Duration::from_millis(3100)),
        None
    );
}

#[test]
fn unknown_command_terminates_resolution() {
    let registry = registry();
    let rest = match_prefix("!doesnotexist now", "!", BOT_ID).expect("prefix matches");
    let (name, _args) = split_invocation(rest).expect("parses");
    assert!(registry.resolve(&name).is_none());
}

#[test]
fn alias_resolution_is_case_insensitive() {
    let registry = registry();
    assert_eq!(
        registry.resolve("SetPrefix").expect("resolves").spec().name,
        "prefix"
    );
}
