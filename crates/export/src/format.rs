// Display formatters shared by CSV exports and report tables

use chrono::{Datelike, Timelike};

/// `YYYY-MM-DD`.
pub fn format_date<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Hour bucket label `HH:00`; minutes and seconds are always dropped.
pub fn format_time<T: Timelike>(time: &T) -> String {
    format!("{:02}:00", time.hour())
}

/// `N.NN%`, or an empty string when there is no value.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => String::new(),
    }
}

/// Keep the first `max_chars` characters, adding `...` when anything was cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
