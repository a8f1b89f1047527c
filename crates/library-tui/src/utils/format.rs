/// Truncate a string to a maximum length, adding ellipsis if needed
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

/// Truncate then left-align into a fixed-width column
pub fn pad_to_width(s: &str, width: usize) -> String {
    let truncated = truncate_string(s, width);
    let padding = width.saturating_sub(truncated.chars().count());
    format!("{}{}", truncated, " ".repeat(padding))
}
