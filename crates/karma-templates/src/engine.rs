//! Placeholder substitution passes
//!
//! Each literal placeholder is replaced globally; parametrized placeholders
//! (`{random:…}`, `{mention:role:…}`, `{mention:channel:…}`, `{emoji:…}`)
//! are matched as a unit including their argument payload. Anything the
//! engine does not recognize is left in place.

use chrono::{DateTime, Utc};
use karma_common::utils::{group_digits, ordinal, relative_age};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::{Captures, Regex};

use crate::context::{GuildContext, MemberContext};

static RANDOM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{random:([^{}]+)\}").expect("valid random pattern"));
static ROLE_MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{mention:role:([^{}]+)\}").expect("valid role pattern"));
static CHANNEL_MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{mention:channel:([^{}]+)\}").expect("valid channel pattern"));
static EMOJI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{emoji:([^{}]+)\}").expect("valid emoji pattern"));

/// Human-readable reference of every supported placeholder, shown by the
/// `welcome templates` subcommand
pub const TEMPLATE_REFERENCE: &[(&str, &str)] = &[
    ("{user} / {mention}", "Mention the member"),
    ("{username}", "Account username"),
    ("{displayname}", "Display name"),
    ("{userid}", "User ID"),
    ("{usertag}", "Full tag"),
    ("{avatar}", "Avatar URL"),
    ("{accountage}", "Relative account age"),
    ("{server} / {servername}", "Server name"),
    ("{membercount}", "Member count"),
    ("{membercount:ordinal}", "Member count as 1st, 2nd, ..."),
    ("{servericon}", "Server icon URL"),
    ("{serverid}", "Server ID"),
    ("{owner}", "Server owner mention"),
    ("{boostcount}", "Active boosts"),
    ("{boostlevel}", "Boost tier"),
    ("{date}", "Current date"),
    ("{time}", "Current time"),
    ("{timestamp}", "Unix timestamp"),
    ("{joindate}", "Member join date"),
    ("{joindate:relative}", "Member join date, relative"),
    ("{dayofweek}", "Day of the week"),
    ("{month}", "Month name"),
    ("{year}", "Year"),
    ("{roles}", "Member role names"),
    ("{rolecount}", "Member role count"),
    ("{highestrole}", "Highest role name"),
    ("{joinposition}", "Ordinal join position"),
    ("{newline} / {space} / {tab}", "Literal whitespace"),
    ("{random:a,b,c}", "One option at random"),
    ("{mention:role:NAME}", "Mention a role by name"),
    ("{mention:channel:NAME}", "Mention a channel by name"),
    ("{emoji:NAME}", "Server custom emoji by name"),
];

/// Render a template with the current wall-clock time
pub fn render_now(template: &str, member: &MemberContext, guild: &GuildContext) -> String {
    render(template, member, guild, Utc::now())
}

/// Render a template against the given member, guild and point in time.
///
/// Deterministic except for `{random:…}`, which draws independently per
/// occurrence.
pub fn render(
    template: &str,
    member: &MemberContext,
    guild: &GuildContext,
    now: DateTime<Utc>,
) -> String {
    if template.is_empty() {
        return String::new();
    }

    let mut out = template.to_string();

    // User placeholders
    out = out.replace("{user}", &member.mention());
    out = out.replace("{mention}", &member.mention());
    out = out.replace("{username}", &member.username);
    out = out.replace("{displayname}", &member.display_name);
    out = out.replace("{userid}", &member.user_id.to_string());
    out = out.replace("{usertag}", &member.tag());
    out = out.replace("{avatar}", &member.avatar_url);
    out = out.replace(
        "{accountage}",
        &relative_age((now - member.created_at).num_seconds()),
    );

    // Server placeholders; the ordinal form must be substituted before the
    // plain one so its argument is matched as a unit
    out = out.replace("{membercount:ordinal}", &ordinal(guild.member_count));
    out = out.replace("{membercount}", &group_digits(guild.member_count));
    out = out.replace("{server}", &guild.name);
    out = out.replace("{servername}", &guild.name);
    out = out.replace("{servericon}", guild.icon_url.as_deref().unwrap_or(""));
    out = out.replace("{serverid}", &guild.guild_id.to_string());
    out = out.replace(
        "{owner}",
        &guild
            .owner_id
            .map(|id| format!("<@{}>", id))
            .unwrap_or_else(|| "Unknown".to_string()),
    );
    out = out.replace("{boostcount}", &guild.boost_count.to_string());
    out = out.replace("{boostlevel}", &guild.boost_level.to_string());

    // Date/time placeholders
    let join_markup = member
        .joined_at
        .map(|at| format!("<t:{}:F>", at.timestamp()));
    let join_relative_markup = member
        .joined_at
        .map(|at| format!("<t:{}:R>", at.timestamp()));
    out = out.replace(
        "{joindate:relative}",
        join_relative_markup.as_deref().unwrap_or("Unknown"),
    );
    out = out.replace("{joindate}", join_markup.as_deref().unwrap_or("Unknown"));
    out = out.replace("{date}", &now.format("%Y-%m-%d").to_string());
    out = out.replace("{time}", &now.format("%H:%M:%S UTC").to_string());
    out = out.replace("{timestamp}", &now.timestamp().to_string());
    out = out.replace("{dayofweek}", &now.format("%A").to_string());
    out = out.replace("{month}", &now.format("%B").to_string());
    out = out.replace("{year}", &now.format("%Y").to_string());

    // Member placeholders
    let roles = if member.role_names.is_empty() {
        "None".to_string()
    } else {
        member.role_names.join(", ")
    };
    out = out.replace("{roles}", &roles);
    out = out.replace("{rolecount}", &member.role_names.len().to_string());
    out = out.replace(
        "{highestrole}",
        member.highest_role.as_deref().unwrap_or("None"),
    );
    out = out.replace("{joinposition}", &ordinal(guild.member_count));

    // Structural placeholders
    out = out.replace("{newline}", "\n");
    out = out.replace("{space}", " ");
    out = out.replace("{tab}", "\t");

    // Parametrized placeholders
    out = RANDOM_RE
        .replace_all(&out, |caps: &Captures<'_>| {
            let options: Vec<&str> = caps[1].split(',').map(str::trim).collect();
            let index = rand::thread_rng().gen_range(0..options.len());
            options[index].to_string()
        })
        .into_owned();

    out = ROLE_MENTION_RE
        .replace_all(&out, |caps: &Captures<'_>| {
            match guild.role_by_name(&caps[1]) {
                Some(id) => format!("<@&{}>", id),
                None => format!("@{}", &caps[1]),
            }
        })
        .into_owned();

    out = CHANNEL_MENTION_RE
        .replace_all(&out, |caps: &Captures<'_>| {
            match guild.channel_by_name(&caps[1]) {
                Some(id) => format!("<#{}>", id),
                None => format!("#{}", &caps[1]),
            }
        })
        .into_owned();

    out = EMOJI_RE
        .replace_all(&out, |caps: &Captures<'_>| {
            match guild.emoji_by_name(&caps[1]) {
                Some((id, true)) => format!("<a:{}:{}>", &caps[1], id),
                Some((id, false)) => format!("<:{}:{}>", &caps[1], id),
                None => format!(":{}:", &caps[1]),
            }
        })
        .into_owned();

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        // A Monday in June
        Utc.with_ymd_and_hms(2024, 6, 3, 12, 30, 45).unwrap()
    }

    fn member() -> MemberContext {
        MemberContext {
            user_id: 111,
            username: "karma".to_string(),
            display_name: "Karma".to_string(),
            discriminator: None,
            avatar_url: "https://cdn.example/avatar.png".to_string(),
            created_at: now() - chrono::Duration::days(400),
            joined_at: Some(now() - chrono::Duration::days(3)),
            role_names: vec!["Members".to_string(), "Helpers".to_string()],
            highest_role: Some("Helpers".to_string()),
        }
    }

    fn guild() -> GuildContext {
        GuildContext {
            guild_id: 222,
            name: "Test Guild".to_string(),
            member_count: 1042,
            icon_url: Some("https://cdn.example/icon.png".to_string()),
            owner_id: Some(333),
            boost_count: 5,
            boost_level: 2,
            roles: vec![(10, "Moderators".to_string())],
            channels: vec![(20, "general".to_string())],
            emojis: vec![(30, "wave".to_string(), false), (31, "party".to_string(), true)],
        }
    }

    #[test]
    fn test_user_placeholders() {
        let rendered = render(
            "{user} {username} {displayname} {userid} {usertag} {avatar}",
            &member(),
            &guild(),
            now(),
        );
        assert_eq!(
            rendered,
            "<@111> karma Karma 111 karma https://cdn.example/avatar.png"
        );
    }

    #[test]
    fn test_account_age_buckets() {
        let mut m = member();
        let g = guild();

        m.created_at = now() - chrono::Duration::days(400);
        assert_eq!(render("{accountage}", &m, &g, now()), "1 year ago");

        m.created_at = now() - chrono::Duration::days(40);
        assert_eq!(render("{accountage}", &m, &g, now()), "1 month ago");

        m.created_at = now() - chrono::Duration::hours(5);
        assert_eq!(render("{accountage}", &m, &g, now()), "5 hours ago");

        m.created_at = now() - chrono::Duration::seconds(30);
        assert_eq!(render("{accountage}", &m, &g, now()), "Just now");
    }

    #[test]
    fn test_server_placeholders() {
        let rendered = render(
            "{server}|{servername}|{membercount}|{membercount:ordinal}|{serverid}|{owner}|{boostcount}|{boostlevel}",
            &member(),
            &guild(),
            now(),
        );
        assert_eq!(
            rendered,
            "Test Guild|Test Guild|1,042|1042nd|222|<@333>|5|2"
        );
    }

    #[test]
    fn test_missing_icon_and_owner() {
        let mut g = guild();
        g.icon_url = None;
        g.owner_id = None;
        assert_eq!(render("[{servericon}] {owner}", &member(), &g, now()), "[] Unknown");
    }

    #[test]
    fn test_date_placeholders() {
        let rendered = render(
            "{date} {time} {timestamp} {dayofweek} {month} {year}",
            &member(),
            &guild(),
            now(),
        );
        assert_eq!(
            rendered,
            format!(
                "2024-06-03 12:30:45 UTC {} Monday June 2024",
                now().timestamp()
            )
        );
    }

    #[test]
    fn test_join_date_placeholders() {
        let m = member();
        let joined = m.joined_at.unwrap().timestamp();
        let rendered = render("{joindate} {joindate:relative}", &m, &guild(), now());
        assert_eq!(rendered, format!("<t:{}:F> <t:{}:R>", joined, joined));

        let mut unknown = member();
        unknown.joined_at = None;
        let rendered = render("{joindate} {joindate:relative}", &unknown, &guild(), now());
        assert_eq!(rendered, "Unknown Unknown");
    }

    #[test]
    fn test_member_placeholders() {
        let rendered = render(
            "{roles}|{rolecount}|{highestrole}|{joinposition}",
            &member(),
            &guild(),
            now(),
        );
        assert_eq!(rendered, "Members, Helpers|2|Helpers|1042nd");

        let mut bare = member();
        bare.role_names.clear();
        bare.highest_role = None;
        let rendered = render("{roles}|{rolecount}|{highestrole}", &bare, &guild(), now());
        assert_eq!(rendered, "None|0|None");
    }

    #[test]
    fn test_structural_placeholders() {
        assert_eq!(
            render("a{newline}b{space}c{tab}d", &member(), &guild(), now()),
            "a\nb c\td"
        );
    }

    #[test]
    fn test_global_replacement() {
        assert_eq!(
            render("{username} and {username} and {username}", &member(), &guild(), now()),
            "karma and karma and karma"
        );
    }

    #[test]
    fn test_unknown_placeholder_passthrough() {
        assert_eq!(
            render("hello {notareal} {also:unknown} world", &member(), &guild(), now()),
            "hello {notareal} {also:unknown} world"
        );
        // Unbalanced braces survive too
        assert_eq!(render("{user", &member(), &guild(), now()), "{user");
    }

    #[test]
    fn test_random_membership_and_trim() {
        let m = member();
        let g = guild();
        for _ in 0..50 {
            let rendered = render("{random: a , b ,c}", &m, &g, now());
            assert!(["a", "b", "c"].contains(&rendered.as_str()), "got {:?}", rendered);
        }
    }

    #[test]
    fn test_random_roughly_uniform() {
        let m = member();
        let g = guild();
        let mut counts: HashMap<String, u32> = HashMap::new();
        for _ in 0..3000 {
            let rendered = render("{random:a,b,c}", &m, &g, now());
            *counts.entry(rendered).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 3);
        for (option, count) in counts {
            // Expected ~1000 each; far outside this range means a broken draw
            assert!(count > 700, "option {:?} drawn only {} times", option, count);
        }
    }

    #[test]
    fn test_random_independent_draws() {
        let m = member();
        let g = guild();
        let mut saw_mixed = false;
        for _ in 0..200 {
            let rendered = render("{random:a,b}{random:a,b}", &m, &g, now());
            if rendered == "ab" || rendered == "ba" {
                saw_mixed = true;
                break;
            }
        }
        assert!(saw_mixed, "occurrences never diverged, draws are not independent");
    }

    #[test]
    fn test_role_mention_lookup_and_fallback() {
        let rendered = render("{mention:role:moderators}", &member(), &guild(), now());
        assert_eq!(rendered, "<@&10>");

        let rendered = render("{mention:role:Nobody}", &member(), &guild(), now());
        assert_eq!(rendered, "@Nobody");
    }

    #[test]
    fn test_channel_mention_lookup_and_fallback() {
        let rendered = render("{mention:channel:GENERAL}", &member(), &guild(), now());
        assert_eq!(rendered, "<#20>");

        let rendered = render("{mention:channel:missing}", &member(), &guild(), now());
        assert_eq!(rendered, "#missing");
    }

    #[test]
    fn test_emoji_lookup_and_fallback() {
        assert_eq!(render("{emoji:wave}", &member(), &guild(), now()), "<:wave:30>");
        assert_eq!(render("{emoji:party}", &member(), &guild(), now()), "<a:party:31>");
        assert_eq!(render("{emoji:ghost}", &member(), &guild(), now()), ":ghost:");
    }

    #[test]
    fn test_empty_template() {
        assert_eq!(render("", &member(), &guild(), now()), "");
    }

    #[test]
    fn test_default_welcome_shape() {
        let rendered = render(
            "Welcome {user} to **{server}**! You are our {membercount:ordinal} member.",
            &member(),
            &guild(),
            now(),
        );
        assert_eq!(
            rendered,
            "Welcome <@111> to **Test Guild**! You are our 1042nd member."
        );
    }
}
