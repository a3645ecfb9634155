//! Command implementations
//!
//! One module per command, mirrored by [`all`] which hands the full set to
//! the registry at startup.

use std::sync::Arc;

use crate::descriptor::Command;

pub mod avatar;
pub mod clear;
pub mod dbstats;
pub mod goodbye;
pub mod help;
pub mod info;
pub mod invite;
pub mod logging;
pub mod logs;
pub mod mention;
pub mod ping;
pub mod prefix;
pub mod serverinfo;
pub mod servers;
pub mod stats;
pub mod userinfo;
pub mod welcome;

/// Every built-in command, ready for [`crate::CommandRegistry::register_all`]
pub fn all() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(ping::Ping::new()),
        Arc::new(help::Help::new()),
        Arc::new(info::Info::new()),
        Arc::new(invite::Invite::new()),
        Arc::new(mention::Mention::new()),
        Arc::new(avatar::Avatar::new()),
        Arc::new(userinfo::UserInfo::new()),
        Arc::new(serverinfo::ServerInfo::new()),
        Arc::new(servers::Servers::new()),
        Arc::new(stats::Stats::new()),
        Arc::new(clear::Clear::new()),
        Arc::new(prefix::Prefix::new()),
        Arc::new(logging::Logging::new()),
        Arc::new(logs::Logs::new()),
        Arc::new(welcome::Welcome::new()),
        Arc::new(goodbye::Goodbye::new()),
        Arc::new(dbstats::DbStats::new()),
    ]
}

/// Parse a channel argument: a `<#id>` mention or a raw ID
pub(crate) fn parse_channel_arg(arg: &str) -> Option<u64> {
    let id = arg
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(arg);
    id.parse().ok()
}

/// Parse an on/off style toggle argument
pub(crate) fn parse_toggle(arg: &str) -> Option<bool> {
    match arg {
        "on" | "enable" | "true" => Some(true),
        "off" | "disable" | "false" => Some(false),
        _ => None,
    }
}

/// Parse a `#RRGGBB` hex color
pub(crate) fn parse_hex_color(arg: &str) -> Option<u32> {
    let digits = arg.strip_prefix('#').unwrap_or(arg);
    if digits.len() != 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Truncate text for embed fields, appending an ellipsis when shortened
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let shortened: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", shortened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CommandRegistry;

    #[test]
    fn test_all_commands_register_cleanly() {
        let mut registry = CommandRegistry::new();
        for command in all() {
            let name = command.spec().name;
            registry
                .register(command)
                .unwrap_or_else(|e| panic!("command '{}' failed to register: {}", name, e));
        }
        assert_eq!(registry.len(), 17);

        // A few alias spot checks
        assert_eq!(registry.resolve("av").unwrap().spec().name, "avatar");
        assert_eq!(registry.resolve("setprefix").unwrap().spec().name, "prefix");
        assert_eq!(registry.resolve("guilds").unwrap().spec().name, "servers");
    }

    #[test]
    fn test_parse_channel_arg() {
        assert_eq!(parse_channel_arg("<#123456>"), Some(123456));
        assert_eq!(parse_channel_arg("123456"), Some(123456));
        assert_eq!(parse_channel_arg("<#123456"), None);
        assert_eq!(parse_channel_arg("#general"), None);
    }

    #[test]
    fn test_parse_toggle() {
        assert_eq!(parse_toggle("on"), Some(true));
        assert_eq!(parse_toggle("enable"), Some(true));
        assert_eq!(parse_toggle("true"), Some(true));
        assert_eq!(parse_toggle("off"), Some(false));
        assert_eq!(parse_toggle("disable"), Some(false));
        assert_eq!(parse_toggle("false"), Some(false));
        assert_eq!(parse_toggle("maybe"), None);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#43B581"), Some(0x43B581));
        assert_eq!(parse_hex_color("43B581"), Some(0x43B581));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        assert_eq!(truncate("a very long piece of text", 10), "a very ...");
    }
}
