//! Frontmatter extraction: ---\nYAML\n---

use notegraph_core::{Result, normalize_tag};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Matches YAML frontmatter: --- ... ---
static FRONTMATTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---[ \t]*\n([\s\S]*?)\n---[ \t]*(?:\n|$)").unwrap());

/// Separators accepted in a scalar `tags: a, b c` value
static TAG_SPLIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

/// Extract YAML frontmatter from content
///
/// Returns (frontmatter_string, content_without_frontmatter)
pub fn extract_frontmatter(content: &str) -> (Option<&str>, &str) {
    match FRONTMATTER_PATTERN.captures(content) {
        Some(caps) => {
            let fm = caps.get(1).map(|m| m.as_str());
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            (fm, &content[end..])
        }
        None => (None, content),
    }
}

/// Parse frontmatter YAML into a JSON object.
///
/// Non-mapping documents yield `Ok(None)`; malformed YAML is a parse error.
pub fn parse_frontmatter(fm: &str) -> Result<Option<Map<String, Value>>> {
    if fm.trim().is_empty() {
        return Ok(None);
    }
    match serde_yaml::from_str::<Value>(fm) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Ok(None),
        Err(e) => Err(notegraph_core::Error::parse_error(format!(
            "Invalid frontmatter: {}",
            e
        ))),
    }
}

/// A frontmatter list field that may be written as a scalar or a sequence
enum ListField<'a> {
    Scalar(&'a str),
    Sequence(&'a [Value]),
    Absent,
}

impl<'a> ListField<'a> {
    fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::Scalar(s),
            Some(Value::Array(items)) => Self::Sequence(items),
            _ => Self::Absent,
        }
    }
}

/// Tags declared in frontmatter (`tags` or `tag`), `#` stripped, in order,
/// without duplicates.
pub fn frontmatter_tags(map: &Map<String, Value>) -> Vec<String> {
    let field = map.get("tags").or_else(|| map.get("tag"));
    let raw: Vec<String> = match ListField::from_value(field) {
        ListField::Scalar(s) => TAG_SPLIT_PATTERN
            .split(s)
            .map(str::to_string)
            .collect(),
        ListField::Sequence(items) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        ListField::Absent => Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|t| {
            let t = t.trim();
            t.strip_prefix('#').unwrap_or(t).to_string()
        })
        .filter(|t| !t.is_empty() && seen.insert(normalize_tag(t)))
        .collect()
}

/// Aliases declared in frontmatter (`aliases` or `alias`)
pub fn frontmatter_aliases(map: &Map<String, Value>) -> Vec<String> {
    let field = map.get("aliases").or_else(|| map.get("alias"));
    match ListField::from_value(field) {
        ListField::Scalar(s) => vec![s.trim().to_string()],
        ListField::Sequence(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect(),
        ListField::Absent => Vec::new(),
    }
}
