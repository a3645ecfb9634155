//! Command registry: name/alias lookup populated at startup

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::descriptor::Command;

/// Errors raised while registering commands
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A name or alias is already taken by another command
    #[error("Command key '{key}' is already registered by '{existing}'")]
    DuplicateKey {
        /// The colliding name or alias
        key: String,
        /// Primary name of the command holding the key
        existing: String,
    },

    /// The spec carries no usable primary name
    #[error("Command name cannot be empty")]
    EmptyName,
}

/// Registry mapping command names and aliases to their implementations
#[derive(Default)]
pub struct CommandRegistry {
    /// Primary name -> implementation
    commands: HashMap<String, Arc<dyn Command>>,
    /// Lowercased name/alias -> primary name
    index: HashMap<String, String>,
}

impl CommandRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its name and every alias.
    ///
    /// Fails without mutating the registry when the name or any alias is
    /// already taken.
    pub fn register(&mut self, command: Arc<dyn Command>) -> Result<(), RegistryError> {
        let spec = command.spec();
        if spec.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let primary = spec.name.to_lowercase();
        let mut keys = vec![primary.clone()];
        keys.extend(spec.aliases.iter().map(|alias| alias.to_lowercase()));

        // Validate every key before touching the index so a collision
        // leaves the registry untouched
        for key in &keys {
            if let Some(existing) = self.index.get(key) {
                return Err(RegistryError::DuplicateKey {
                    key: key.clone(),
                    existing: existing.clone(),
                });
            }
        }

        for key in keys {
            self.index.insert(key, primary.clone());
        }
        self.commands.insert(primary.clone(), command);

        debug!("Registered command '{}'", primary);
        Ok(())
    }

    /// Register a batch of commands, logging and skipping individual
    /// failures; a single bad descriptor never poisons the rest.
    pub fn register_all(&mut self, commands: Vec<Arc<dyn Command>>) {
        for command in commands {
            let name = command.spec().name;
            if let Err(e) = self.register(command) {
                warn!("Skipping command '{}': {}", name, e);
            }
        }
        debug!("Total commands registered: {}", self.commands.len());
    }

    /// Case-insensitive lookup over names and aliases
    pub fn resolve(&self, token: &str) -> Option<Arc<dyn Command>> {
        let primary = self.index.get(&token.to_lowercase())?;
        self.commands.get(primary).cloned()
    }

    /// Iterate over all registered commands
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.commands.values()
    }

    /// Number of registered commands (aliases not counted)
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry holds no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands.len())
            .field("keys", &self.index.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BotState;
    use crate::descriptor::{CommandSpec, Command};
    use async_trait::async_trait;
    use serenity::all::{Context, Message};

    struct Stub {
        spec: CommandSpec,
    }

    impl Stub {
        fn new(name: &'static str, aliases: &'static [&'static str]) -> Arc<dyn Command> {
            let mut spec = CommandSpec::new(name);
            spec.aliases = aliases;
            Arc::new(Self { spec })
        }
    }

    #[async_trait]
    impl Command for Stub {
        fn spec(&self) -> &CommandSpec {
            &self.spec
        }

        async fn run(
            &self,
            _ctx: &Context,
            _msg: &Message,
            _args: &[String],
            _state: &BotState,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = CommandRegistry::new();
        registry.register(Stub::new("ping", &[])).expect("register");
        registry
            .register(Stub::new("help", &["h", "commands"]))
            .expect("register");

        assert_eq!(registry.len(), 2);
        assert!(registry.resolve("ping").is_some());
        assert!(registry.resolve("PING").is_some());
        assert!(registry.resolve("h").is_some());
        assert!(registry.resolve("Commands").is_some());
        assert!(registry.resolve("missing").is_none());
        assert_eq!(registry.resolve("h").unwrap().spec().name, "help");
    }

    #[test]
    fn test_duplicate_name_rejected_without_mutation() {
        let mut registry = CommandRegistry::new();
        registry
            .register(Stub::new("ping", &["p"]))
            .expect("register");

        // Colliding primary name
        let err = registry.register(Stub::new("ping", &["latency"])).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { ref key, .. } if key == "ping"));
        // The failed registration left no alias behind
        assert!(registry.resolve("latency").is_none());

        // Alias colliding with an existing primary name
        let err = registry.register(Stub::new("pong", &["ping"])).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { ref key, .. } if key == "ping"));
        assert!(registry.resolve("pong").is_none());

        // Alias colliding with an existing alias
        let err = registry.register(Stub::new("probe", &["p"])).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { ref key, .. } if key == "p"));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = CommandRegistry::new();
        let err = registry.register(Stub::new("", &[])).unwrap_err();
        assert!(matches!(err, RegistryError::EmptyName));
    }

    #[test]
    fn test_register_all_skips_failures() {
        let mut registry = CommandRegistry::new();
        registry.register_all(vec![
            Stub::new("ping", &[]),
            Stub::new("ping", &[]), // duplicate, skipped
            Stub::new("help", &[]),
        ]);

        assert_eq!(registry.len(), 2);
        assert!(registry.resolve("ping").is_some());
        assert!(registry.resolve("help").is_some());
    }
}
