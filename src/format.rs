//! Display formatting helpers: currency, compact numbers, dates and text

use chrono::{DateTime, NaiveDate, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Indonesian Rupiah without decimals, e.g. `Rp 1.250.000`
pub fn format_currency(amount: u64) -> String {
    format!("Rp {}", group_thousands(amount, '.'))
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Compact number: `1.2M`, `3.4K` or the plain value
pub fn format_number(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

/// `Jan 5, 2024`
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// `Jan 5, 2024, 09:30 AM`
pub fn format_date_time(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// [`format_date`] over a string; unparseable input is returned unchanged
pub fn format_date_str(value: &str) -> String {
    parse_timestamp(value)
        .map(|ts| format_date(&ts))
        .unwrap_or_else(|| value.to_string())
}

pub fn format_date_time_str(value: &str) -> String {
    parse_timestamp(value)
        .map(|ts| format_date_time(&ts))
        .unwrap_or_else(|| value.to_string())
}

/// Relative time such as `5m ago`; older than a week falls back to the date
pub fn format_time_ago(ts: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let minutes = (*now - *ts).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        format_date(ts)
    }
}

/// Up to two uppercase initials, e.g. `Budi Santoso` -> `BS`
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Cut to `length` characters and append `...` when longer
pub fn truncate(value: &str, length: usize) -> String {
    if value.chars().count() <= length {
        return value.to_string();
    }
    let mut out: String = value.chars().take(length).collect();
    out.push_str("...");
    out
}

/// Pad or cut `value` to exactly `max_width` terminal cells (unicode-aware)
pub fn fit_width(value: &str, max_width: usize) -> String {
    let display_width = value.width();
    if display_width <= max_width {
        return format!("{}{}", value, " ".repeat(max_width - display_width));
    }

    let target_width = max_width.saturating_sub(1);
    let mut truncated = String::new();
    let mut current_width = 0;
    for ch in value.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        truncated.push(ch);
        current_width += ch_width;
    }

    if max_width == 0 {
        return String::new();
    }
    let padding = max_width - current_width - 1;
    format!("{}…{}", truncated, " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_currency_grouping() {
        assert_eq!(format_currency(0), "Rp 0");
        assert_eq!(format_currency(950), "Rp 950");
        assert_eq!(format_currency(1_000), "Rp 1.000");
        assert_eq!(format_currency(1_250_000), "Rp 1.250.000");
        assert_eq!(format_currency(125_000_000), "Rp 125.000.000");
    }

    #[test]
    fn test_compact_numbers() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_500), "1.5K");
        assert_eq!(format_number(2_340_000), "2.3M");
    }

    #[test]
    fn test_dates() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap();
        assert_eq!(format_date(&ts), "Jan 5, 2024");
        assert_eq!(format_date_time(&ts), "Jan 5, 2024, 09:30 AM");
        assert_eq!(format_date_str("2024-01-05T09:30:00Z"), "Jan 5, 2024");
        assert_eq!(format_date_str("2024-01-05"), "Jan 5, 2024");
        assert_eq!(format_date_str("not a date"), "not a date");
    }

    #[test]
    fn test_time_ago() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let ago = |mins: i64| now - chrono::Duration::minutes(mins);
        assert_eq!(format_time_ago(&ago(0), &now), "just now");
        assert_eq!(format_time_ago(&ago(5), &now), "5m ago");
        assert_eq!(format_time_ago(&ago(125), &now), "2h ago");
        assert_eq!(format_time_ago(&ago(60 * 24 * 3), &now), "3d ago");
        assert_eq!(format_time_ago(&ago(60 * 24 * 10), &now), "Feb 29, 2024");
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(initials("Budi Santoso"), "BS");
        assert_eq!(initials("Ahmad Rizki Pratama"), "AR");
        assert_eq!(initials("eko"), "E");
        assert_eq!(truncate("Brake Service", 5), "Brake...");
        assert_eq!(truncate("Oil", 5), "Oil");
        assert_eq!(fit_width("abc", 5), "abc  ");
        assert_eq!(fit_width("abcdef", 4), "abc…");
    }
}
