//! Tag parser: #tag, #parent/child

use regex::Regex;
use std::sync::LazyLock;

/// Matches #tag or #parent/child preceded by start of line, whitespace or punctuation
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s(\[,;])#([\p{L}\p{N}_][\p{L}\p{N}_/\-]*)").unwrap()
});

/// Parse all tags on one line, in order (duplicates included)
pub fn parse_tags(line: &str) -> Vec<String> {
    TAG_PATTERN
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('/'))
        // Obsidian requires at least one non-numeric character
        .filter(|name| !name.is_empty() && !name.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}
