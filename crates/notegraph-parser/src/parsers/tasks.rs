//! Task parser: - [ ] Task, - [x] Completed

use notegraph_core::TaskItem;
use regex::Regex;
use std::sync::LazyLock;

/// Matches - [ ] or - [x] followed by task text
static TASK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+] \[([ xX])\]\s+(.+)$").unwrap());

/// Parse a task from one line
pub fn parse_task(line: &str, line_no: usize) -> Option<TaskItem> {
    let caps = TASK_PATTERN.captures(line)?;
    Some(TaskItem {
        content: caps.get(2)?.as_str().trim().to_string(),
        is_completed: caps.get(1)?.as_str().eq_ignore_ascii_case("x"),
        line: line_no,
    })
}
