use chrono::Duration;

use crate::api::Time;

/// Relative age of `ts`, falling back to the date after a week
pub fn format_timestamp(ts: Time, now: Time) -> String {
    let age = now - ts;
    if age < Duration::hours(1) {
        match age.num_minutes() {
            m if m <= 1 => String::from("Just now"),
            m => format!("{m} minutes ago"),
        }
    } else if age < Duration::days(1) {
        match age.num_hours() {
            1 => String::from("1 hour ago"),
            h => format!("{h} hours ago"),
        }
    } else if age < Duration::days(7) {
        match age.num_days() {
            1 => String::from("Yesterday"),
            d => format!("{d} days ago"),
        }
    } else {
        format_date(ts)
    }
}

pub fn format_date(ts: Time) -> String {
    ts.format("%b %-d, %Y").to_string()
}

pub fn format_date_time(ts: Time) -> String {
    ts.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Up to two uppercase initials, for avatars
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Split user-written text into its lines, for rendering line breaks
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|l| l.trim_end_matches('\r'))
}
