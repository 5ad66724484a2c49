//! Heading parser: # H1, ## H2, etc.

use notegraph_core::Heading;
use regex::Regex;
use std::sync::LazyLock;

/// Matches # Heading, ## Heading, etc.
static HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").unwrap());

/// Parse a heading from one line
pub fn parse_heading(line: &str, line_no: usize) -> Option<Heading> {
    let caps = HEADING_PATTERN.captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    let text = caps.get(2)?.as_str().trim();
    if text.is_empty() {
        return None;
    }
    Some(Heading {
        text: text.to_string(),
        level,
        line: line_no,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h1_heading() {
        let heading = parse_heading("# Main Title", 1).unwrap();
        assert_eq!(heading.level, 1);
        assert_eq!(heading.text, "Main Title");
    }

    #[test]
    fn test_closing_hashes_trimmed() {
        let heading = parse_heading("## Section ##", 3).unwrap();
        assert_eq!(heading.level, 2);
        assert_eq!(heading.text, "Section");
        assert_eq!(heading.line, 3);
    }

    #[test]
    fn test_all_heading_levels() {
        for level in 1..=6 {
            let content = format!("{} Heading", "#".repeat(level));
            assert_eq!(parse_heading(&content, 1).unwrap().level, level as u8);
        }
    }

    #[test]
    fn test_not_a_heading() {
        assert!(parse_heading("#tag", 1).is_none());
        assert!(parse_heading("####### Too deep", 1).is_none());
    }
}
