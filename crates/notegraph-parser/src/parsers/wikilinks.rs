//! Wikilink and embed parser: `[[Note]]`, `[[folder/Note]]`, `[[Note#Heading|Alias]]`, `![[Note]]`
//!
//! Links and embeds are matched by one pattern so the result keeps the order
//! in which they appear in the text.

use notegraph_core::{LinkKind, LinkRef};
use regex::Regex;
use std::sync::LazyLock;

/// Matches [[...]] and ![[...]]
static WIKILINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\[\]\n]+?)\]\]").unwrap());

/// File extensions of non-note targets (images, media, documents)
const ATTACHMENT_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "pdf", "mp3", "mp4", "wav", "ogg", "webm",
    "mov", "m4a", "canvas", "excalidraw",
];

/// Parse all wikilinks and embeds on one line
pub fn parse_links(line: &str, line_no: usize) -> Vec<LinkRef> {
    WIKILINK_PATTERN
        .captures_iter(line)
        .filter_map(|caps| {
            let is_embed = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let raw = caps.get(2)?.as_str();
            let kind = if is_embed {
                LinkKind::Embed
            } else {
                LinkKind::WikiLink
            };
            split_target(raw, kind, line_no)
        })
        .collect()
}

/// Split `target#anchor|alias` into a [`LinkRef`].
///
/// Returns `None` for same-note anchors (`[[#Heading]]`) and attachments.
fn split_target(raw: &str, kind: LinkKind, line_no: usize) -> Option<LinkRef> {
    let (target_part, alias) = match raw.split_once('|') {
        // `\|` is how aliases are escaped inside tables
        Some((t, a)) => (t.trim_end_matches('\\'), Some(a.trim())),
        None => (raw, None),
    };

    let (name_part, anchor) = match target_part.split_once('#') {
        Some((n, a)) => (n, Some(a.trim())),
        None => (target_part, None),
    };

    let name = note_name(name_part)?;
    if is_attachment(&name) {
        return None;
    }

    Some(LinkRef {
        target: name,
        anchor: anchor.filter(|a| !a.is_empty()).map(str::to_string),
        alias: alias.filter(|a| !a.is_empty()).map(str::to_string),
        line: line_no,
        kind,
    })
}

/// Reduce a link path to the note name: last path segment, `.md` removed
fn note_name(path: &str) -> Option<String> {
    let last = path.trim().rsplit('/').next()?.trim();
    let name = match last.len().checked_sub(3) {
        Some(cut) if last.is_char_boundary(cut) && last[cut..].eq_ignore_ascii_case(".md") => {
            &last[..cut]
        }
        _ => last,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn is_attachment(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ATTACHMENT_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    })
}
