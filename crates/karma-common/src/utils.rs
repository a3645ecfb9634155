//! Utility functions used across the Karma Bot workspace

use std::time::Duration;

/// Format an uptime duration as `Nd Nh Nm Ns`
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let days = secs / 86_400;
    let hours = (secs / 3_600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}

/// Format a byte count in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Group a number with thousands separators (`1234567` -> `1,234,567`)
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Render a positive integer with its English ordinal suffix.
///
/// 11-13 always take "th"; otherwise the suffix follows the last digit.
pub fn ordinal(n: u64) -> String {
    let suffix = match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{}{}", n, suffix)
}

/// Render elapsed seconds as a coarse human-relative age.
///
/// The largest applicable bucket wins; anything under a minute is "Just now".
pub fn relative_age(elapsed_secs: i64) -> String {
    const YEAR: i64 = 31_536_000;
    const MONTH: i64 = 2_592_000;
    const DAY: i64 = 86_400;
    const HOUR: i64 = 3_600;
    const MINUTE: i64 = 60;

    if elapsed_secs < MINUTE {
        return "Just now".to_string();
    }

    for (unit_secs, name) in [
        (YEAR, "year"),
        (MONTH, "month"),
        (DAY, "day"),
        (HOUR, "hour"),
        (MINUTE, "minute"),
    ] {
        let count = elapsed_secs / unit_secs;
        if count >= 1 {
            return if count == 1 {
                format!("1 {} ago", name)
            } else {
                format!("{} {}s ago", count, name)
            };
        }
    }

    "Just now".to_string()
}

/// Parse an integer argument, rejecting values outside `[min, max]`
pub fn parse_bounded_int(value: &str, min: u64, max: u64) -> Option<u64> {
    let parsed: u64 = value.parse().ok()?;
    if parsed < min || parsed > max {
        return None;
    }
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 0h 0m 0s");
        assert_eq!(
            format_uptime(Duration::from_secs(86_400 + 3_600 + 61)),
            "1d 1h 1m 1s"
        );
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(1536), "1.50 KB");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1_000), "1,000");
        assert_eq!(group_digits(1_234_567), "1,234,567");
    }

    #[test]
    fn test_ordinal_suffixes() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(100), "100th");
        assert_eq!(ordinal(111), "111th");
        assert_eq!(ordinal(123), "123rd");
    }

    #[test]
    fn test_relative_age_buckets() {
        assert_eq!(relative_age(0), "Just now");
        assert_eq!(relative_age(59), "Just now");
        assert_eq!(relative_age(60), "1 minute ago");
        assert_eq!(relative_age(120), "2 minutes ago");
        assert_eq!(relative_age(3_600), "1 hour ago");
        assert_eq!(relative_age(7_200), "2 hours ago");
        assert_eq!(relative_age(86_400), "1 day ago");
        assert_eq!(relative_age(2_592_000), "1 month ago");
        assert_eq!(relative_age(31_536_000), "1 year ago");
        assert_eq!(relative_age(63_072_000), "2 years ago");
        // 13 months is still "1 year ago" since the larger bucket wins
        assert_eq!(relative_age(34_000_000), "1 year ago");
        assert_eq!(relative_age(-5), "Just now");
    }

    #[test]
    fn test_parse_bounded_int() {
        assert_eq!(parse_bounded_int("5", 1, 100), Some(5));
        assert_eq!(parse_bounded_int("1", 1, 100), Some(1));
        assert_eq!(parse_bounded_int("100", 1, 100), Some(100));
        assert_eq!(parse_bounded_int("0", 1, 100), None);
        assert_eq!(parse_bounded_int("101", 1, 100), None);
        assert_eq!(parse_bounded_int("abc", 1, 100), None);
        assert_eq!(parse_bounded_int("-3", 1, 100), None);
    }
}
