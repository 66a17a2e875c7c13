/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None or blank
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(d) =
        chrono::NaiveDate::parse_from_str(date.get(..10).unwrap_or(date), "%Y-%m-%d")
    {
        d.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        // multi-byte names must not split a character
        assert_eq!(truncate_string("ورشة الإصلاح السريع", 6), "ورش...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-01T10:00:00Z"), "Mar 01, 2025");
        assert_eq!(format_date("2025-03-01 10:00:00"), "Mar 01, 2025");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(&None, "-"), "-");
        assert_eq!(format_optional(&Some("  ".into()), "-"), "-");
        assert_eq!(format_optional(&Some("Riyadh".into()), "-"), "Riyadh");
    }
}
