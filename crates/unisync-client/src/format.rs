//! Human-readable relative times ("5 minutes ago", "in about 2 hours").

use chrono::{DateTime, Utc};

const MINUTES_IN_HOUR: i64 = 60;
const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

fn round_div(n: i64, d: i64) -> i64 {
    (n as f64 / d as f64).round() as i64
}

/// Distance between two instants in words, without a suffix.
pub fn distance(a: DateTime<Utc>, b: DateTime<Utc>) -> String {
    let seconds = (a - b).num_seconds().abs();
    let minutes = round_div(seconds, 60);

    if minutes == 0 {
        return "less than a minute".to_string();
    }
    if minutes < 45 {
        return plural(minutes, "minute");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        return format!("about {}", plural(round_div(minutes, MINUTES_IN_HOUR), "hour"));
    }
    if minutes < 2_520 {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        return plural(round_div(minutes, MINUTES_IN_DAY), "day");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        return format!("about {}", plural(round_div(minutes, MINUTES_IN_MONTH), "month"));
    }

    let months = minutes / MINUTES_IN_MONTH;
    if months < 12 {
        return plural(round_div(minutes, MINUTES_IN_MONTH), "month");
    }
    let years = months / 12;
    match months % 12 {
        0..=2 => format!("about {}", plural(years, "year")),
        3..=8 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}

/// `at` relative to `now`: "5 minutes ago" or "in 3 days".
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let words = distance(at, now);
    if at > now {
        format!("in {words}")
    } else {
        format!("{words} ago")
    }
}
