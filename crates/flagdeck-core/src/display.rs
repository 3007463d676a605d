//! Human-facing formatting shared by every front end.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

// ASCII word characters only; a letter after a non-ASCII one starts a word.
fn word_start() -> &'static Regex {
    static WORD_START: OnceLock<Regex> = OnceLock::new();
    WORD_START.get_or_init(|| {
        Regex::new(r"(^|[^A-Za-z0-9_])([A-Za-z0-9_])").expect("Invalid regex")
    })
}

/// Display form of a flag name.
///
/// The category prefix is dropped, remaining segments are joined with
/// spaces, dashes become spaces and every word is capitalized.
///
/// # Examples
///
/// ```
/// use flagdeck_core::display::format_flag_name;
///
/// assert_eq!(format_flag_name("ui.dark-mode"), "Dark Mode");
/// assert_eq!(format_flag_name("offline-sync"), "Offline Sync");
/// ```
#[must_use]
pub fn format_flag_name(name: &str) -> String {
    let segments: Vec<&str> = name.split('.').collect();
    let base = if segments.len() > 1 {
        segments[1..].join(" ")
    } else {
        name.to_string()
    };
    let spaced = base.replace('-', " ");
    word_start()
        .replace_all(&spaced, |caps: &regex::Captures<'_>| {
            format!("{}{}", &caps[1], caps[2].to_ascii_uppercase())
        })
        .into_owned()
}

/// Short relative label such as `5m ago`; older than a week falls back to the date.
pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format_date(timestamp_ms)
    }
}

/// Relative label for a timestamp against the current clock.
pub fn relative_to_now(at: DateTime<Utc>) -> String {
    format_relative_time(at.timestamp_millis(), Utc::now().timestamp_millis())
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_date(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flag_name_drops_prefix() {
        assert_eq!(format_flag_name("experimental.ai-suggest"), "Ai Suggest");
        assert_eq!(format_flag_name("mobile.offline-sync"), "Offline Sync");
        assert_eq!(format_flag_name("api.v2.rate-limit"), "V2 Rate Limit");
    }

    #[test]
    fn format_flag_name_without_prefix() {
        assert_eq!(format_flag_name("dark-mode"), "Dark Mode");
        assert_eq!(format_flag_name("beta"), "Beta");
    }

    #[test]
    fn format_flag_name_capitalizes_ascii_only() {
        assert_eq!(format_flag_name("x-élan"), "X éLan");
        assert_eq!(format_flag_name("ui.über_mode"), "üBer_mode");
        assert_eq!(format_flag_name("perf.a-b-c"), "A B C");
    }

    #[test]
    fn format_relative_time_units() {
        let now = 10_000_000_000;
        assert_eq!(format_relative_time(now - 30_000, now), "just now");
        assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
        assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
        assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
    }

    #[test]
    fn format_relative_time_falls_back_to_date() {
        let now = DateTime::parse_from_rfc3339("2024-03-20T00:00:00Z")
            .unwrap()
            .timestamp_millis();
        let then = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .timestamp_millis();
        assert_eq!(format_relative_time(then, now), "2024-03-01");
    }

    #[test]
    fn format_timestamp_is_utc_label() {
        assert_eq!(
            format_timestamp(DateTime::from_timestamp(0, 0).unwrap()),
            "1970-01-01 00:00:00 UTC"
        );
    }
}
