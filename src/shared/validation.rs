use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slugs (election and candidate URLs)
    /// Must be lowercase alphanumeric with single hyphens between words
    /// - Valid: "john-doe", "ssc-2023", "a"
    /// - Invalid: "-john", "john-", "john--doe", "John", "john_doe"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Normalize a slug the way the dashboard form does before saving:
/// lowercase, whitespace becomes hyphens, trailing hyphens dropped.
pub fn normalize_slug(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let hyphenated: String = lowered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    hyphenated.trim_end_matches('-').to_string()
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first_letter(input: &str) -> String {
    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
