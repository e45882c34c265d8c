//! First-line rewrites on generated commit text.
//!
//! Backends return free-form text. These helpers edit the type or scope of
//! its header in place and leave every other line untouched. A first line
//! that does not look like `type(scope): title` or `type: title` is passed
//! through unchanged.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use super::message::truncate_title;

// `rest` starts at the optional `!` marker so it survives rewrites.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[^():!]*)(?:\((?P<scope>[^)]*)\))?(?P<rest>!?\s*:.*)$")
        .unwrap_or_else(|e| panic!("invalid header pattern: {e}"))
});

/// Replace the commit type on the first line of `message`.
pub fn override_type(message: &str, new_type: &str) -> String {
    rewrite_header(message, |caps| {
        let scope = caps
            .name("scope")
            .map(|m| format!("({})", m.as_str()))
            .unwrap_or_default();
        format!("{}{}{}", new_type, scope, &caps["rest"])
    })
}

/// Replace or insert the scope on the first line of `message`.
///
/// An empty `new_scope` removes the scope segment.
pub fn override_scope(message: &str, new_scope: &str) -> String {
    rewrite_header(message, |caps| {
        let ty = &caps["type"];
        let rest = &caps["rest"];
        if new_scope.is_empty() {
            format!("{ty}{rest}")
        } else {
            format!("{ty}({new_scope}){rest}")
        }
    })
}

/// Truncate the first line of `message` to `max_len` characters.
pub fn limit_header(message: &str, max_len: usize) -> String {
    let mut lines: Vec<String> = message.split('\n').map(str::to_string).collect();
    if let Some(first) = lines.first_mut() {
        *first = truncate_title(first, max_len);
    }
    lines.join("\n")
}

fn rewrite_header<F>(message: &str, rebuild: F) -> String
where
    F: Fn(&Captures<'_>) -> String,
{
    let mut lines: Vec<String> = message.split('\n').map(str::to_string).collect();

    let Some(first) = lines.first_mut() else {
        return message.to_string();
    };

    if let Some(header) = HEADER_RE.captures(first).map(|caps| rebuild(&caps)) {
        *first = header;
    }

    lines.join("\n")
}
