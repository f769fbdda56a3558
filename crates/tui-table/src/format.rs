//! Formatting helpers for table cells and detail views.

use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthChar;

/// Format an amount in minor units (cents) with the currency's symbol.
///
/// ```ignore
/// assert_eq!(format_currency(123_456, "USD"), "$1,234.56");
/// assert_eq!(format_currency(500, "CHF"), "CHF 5.00");
/// ```
pub fn format_currency(minor_units: i64, currency: &str) -> String {
    let code = currency.to_ascii_uppercase();
    let (symbol, decimals) = match code.as_str() {
        "USD" => ("$".to_string(), 2),
        "EUR" => ("€".to_string(), 2),
        "GBP" => ("£".to_string(), 2),
        "NGN" => ("₦".to_string(), 2),
        "INR" => ("₹".to_string(), 2),
        "JPY" => ("¥".to_string(), 0),
        _ => (format!("{} ", code), 2),
    };

    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();

    if decimals == 0 {
        return format!("{}{}{}", sign, symbol, group_thousands(abs));
    }

    let whole = abs / 100;
    let cents = abs % 100;
    format!("{}{}{}.{:02}", sign, symbol, group_thousands(whole), cents)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `Jan 5, 2024`
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// `Jan 5, 2024 14:03`
pub fn format_date_time(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y %H:%M").to_string()
}

/// Describe `then` relative to `now`, falling back to the date after 30 days.
pub fn format_relative_time(then: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(*then).num_seconds();
    let future = seconds < 0;
    let seconds = seconds.abs();

    if seconds < 60 {
        return "just now".to_string();
    }

    let (amount, unit) = if seconds < 3_600 {
        (seconds / 60, "minute")
    } else if seconds < 86_400 {
        (seconds / 3_600, "hour")
    } else if seconds <= 30 * 86_400 {
        (seconds / 86_400, "day")
    } else {
        return format_date(then);
    };

    let plural = if amount == 1 { "" } else { "s" };
    if future {
        format!("in {} {}{}", amount, unit, plural)
    } else {
        format!("{} {}{} ago", amount, unit, plural)
    }
}

/// Truncate to at most `max_width` display columns, ending in `...` when cut.
pub fn truncate(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let width: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if width <= max_width {
        return text.to_string();
    }

    let (budget, ellipsis) = if max_width <= 3 {
        (max_width, "")
    } else {
        (max_width - 3, "...")
    };

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str(ellipsis);
    out
}

/// Upper-cased first letters of the first two words.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use insta::assert_snapshot;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_currency() {
        assert_snapshot!(format_currency(123_456, "USD"), @"$1,234.56");
        assert_snapshot!(format_currency(1_000, "eur"), @"€10.00");
        assert_snapshot!(format_currency(500, "CHF"), @"CHF 5.00");
        assert_snapshot!(format_currency(-99, "GBP"), @"-£0.99");
        assert_snapshot!(format_currency(1_234_567, "JPY"), @"¥1,234,567");
        assert_snapshot!(format_currency(0, "USD"), @"$0.00");
    }

    #[test]
    fn test_dates() {
        let when = at(2024, 1, 5, 14, 3);
        assert_snapshot!(format_date(&when), @"Jan 5, 2024");
        assert_snapshot!(format_date_time(&when), @"Jan 5, 2024 14:03");
    }

    #[test]
    fn test_relative_time() {
        let now = at(2024, 3, 10, 12, 0);
        assert_eq!(format_relative_time(&(now - Duration::seconds(20)), &now), "just now");
        assert_eq!(format_relative_time(&(now - Duration::minutes(1)), &now), "1 minute ago");
        assert_eq!(format_relative_time(&(now - Duration::minutes(5)), &now), "5 minutes ago");
        assert_eq!(format_relative_time(&(now - Duration::hours(3)), &now), "3 hours ago");
        assert_eq!(format_relative_time(&(now - Duration::days(2)), &now), "2 days ago");
        assert_eq!(format_relative_time(&(now + Duration::days(4)), &now), "in 4 days");
        assert_eq!(format_relative_time(&at(2023, 12, 1, 0, 0), &now), "Dec 1, 2023");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hi", 2), "hi");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hello", 0), "");
        assert_eq!(truncate("Café Müller", 7), "Café...");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("Acme Payments Ltd"), "AP");
        assert_eq!(initials("  zenith  "), "Z");
        assert_eq!(initials(""), "");
    }
}
