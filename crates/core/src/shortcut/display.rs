//! Formatting helpers shared by every table and panel

/// Placeholder for missing values in tables
pub const EMPTY: &str = "-";

/// Shorten text to `max_chars` characters, ending in `...` when cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let head: String = text.chars().take(keep).collect();
    format!("{head}...")
}

/// Render a timestamp or date as `YYYY-MM-DD`, or [`EMPTY`]
pub fn short_date(value: Option<&str>) -> String {
    match value {
        Some(value) => date_only(value),
        None => EMPTY.to_string(),
    }
}

/// Like [`short_date`] with a custom placeholder
pub fn short_date_or(value: Option<&str>, placeholder: &str) -> String {
    value
        .map(date_only)
        .unwrap_or_else(|| placeholder.to_string())
}

fn date_only(value: &str) -> String {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(value) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    value.chars().take(10).collect()
}

/// Estimate column value
pub fn format_estimate(estimate: Option<u32>) -> String {
    estimate
        .map(|e| e.to_string())
        .unwrap_or_else(|| EMPTY.to_string())
}

/// Render a percentage with one decimal, or `N/A`
pub fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{r:.1}%"))
        .unwrap_or_else(|| "N/A".to_string())
}
