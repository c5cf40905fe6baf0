//! Loose boolean parsing for query strings and settings.

/// Interpret a user supplied flag.
///
/// `1`, `y`, `yes`, `t`, `true` and `on` (any case) are true; everything else,
/// including the empty string, is false.
pub fn str2bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "t" | "true" | "on"
    )
}
