//! Small text and time helpers shared by the config, HTTP and database layers.

/// The trimmed value, or `None` when nothing but whitespace is left.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Normalize a server base URL: quotes and whitespace stripped, trailing
/// slashes removed. `None` unless the value is an `http(s)://` URL.
pub fn http_base(value: &str) -> Option<String> {
    let unquoted = value.replace('"', "");
    let base = non_blank(&unquoted)?.trim_end_matches('/');
    (base.starts_with("http://") || base.starts_with("https://")).then(|| base.to_string())
}

/// At most `max_chars` characters of `value`, with `...` marking a cut.
pub fn excerpt(value: &str, max_chars: usize) -> String {
    let value = value.trim();
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut cut = value
        .chars()
        .take(max_chars.saturating_sub(3))
        .collect::<String>();
    cut.push_str("...");
    cut
}

/// Current Unix timestamp in milliseconds.
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
