//! Conventional commit message model: type taxonomy, formatting, parsing.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Footer appended to breaking commits.
pub const BREAKING_CHANGE_FOOTER: &str = "BREAKING CHANGE: This commit contains breaking changes";

const ELLIPSIS: &str = "...";

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Test,
    Chore,
    Perf,
    Ci,
    Build,
    Revert,
}

impl CommitType {
    pub const ALL: [CommitType; 11] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Docs,
        CommitType::Style,
        CommitType::Refactor,
        CommitType::Test,
        CommitType::Chore,
        CommitType::Perf,
        CommitType::Ci,
        CommitType::Build,
        CommitType::Revert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Test => "test",
            CommitType::Chore => "chore",
            CommitType::Perf => "perf",
            CommitType::Ci => "ci",
            CommitType::Build => "build",
            CommitType::Revert => "revert",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feat" => Ok(Self::Feat),
            "fix" => Ok(Self::Fix),
            "docs" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "refactor" => Ok(Self::Refactor),
            "test" => Ok(Self::Test),
            "chore" => Ok(Self::Chore),
            "perf" => Ok(Self::Perf),
            "ci" => Ok(Self::Ci),
            "build" => Ok(Self::Build),
            "revert" => Ok(Self::Revert),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

/// Normalize a candidate type string, defaulting to `chore` when unrecognized.
pub fn parse_commit_type(candidate: &str) -> CommitType {
    candidate.trim().parse().unwrap_or(CommitType::Chore)
}

/// Shorten `title` to at most `max_len` characters.
///
/// Titles that fit are returned unchanged. Longer titles keep their first
/// `max_len - 3` characters followed by `...`. When `max_len` is too small to
/// hold the ellipsis plus one character, the title is cut to `max_len`
/// characters without an ellipsis.
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        return title.to_string();
    }

    if max_len <= ELLIPSIS.len() {
        return title.chars().take(max_len).collect();
    }

    let mut truncated: String = title.chars().take(max_len - ELLIPSIS.len()).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w+)(?:\((?P<scope>[^)]*)\))?(?P<bang>!)?\s*:\s*(?P<title>.*)$")
        .unwrap_or_else(|e| panic!("invalid header pattern: {e}"))
});

/// A structured conventional commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    pub commit_type: CommitType,
    /// `None` or an empty string both mean "no scope segment".
    pub scope: Option<String>,
    pub title: String,
    pub body: Vec<String>,
    pub breaking_change: bool,
}

impl ConventionalCommit {
    /// Render the message as commit text.
    ///
    /// ```text
    /// type(scope): title
    ///
    /// - body line
    /// - body line
    ///
    /// BREAKING CHANGE: This commit contains breaking changes
    /// ```
    ///
    /// [`ConventionalCommit::parse`] reads the output back to an equal value
    /// only when the scope contains no `)` and the title has no surrounding
    /// whitespace. Other values are rendered as given.
    pub fn format(&self) -> String {
        let mut out = match self.scope.as_deref().filter(|s| !s.is_empty()) {
            Some(scope) => format!("{}({}): {}", self.commit_type, scope, self.title),
            None => format!("{}: {}", self.commit_type, self.title),
        };

        if !self.body.is_empty() {
            out.push_str("\n\n");
            for line in &self.body {
                out.push_str("- ");
                out.push_str(line);
                out.push('\n');
            }
        }

        if self.breaking_change {
            // Bullets already end in a newline; one more makes the blank line.
            out.push_str(if self.body.is_empty() { "\n\n" } else { "\n" });
            out.push_str(BREAKING_CHANGE_FOOTER);
        }

        out
    }

    /// Parse commit text back into its fields.
    ///
    /// Returns `None` when the first line is not a conventional header.
    /// Unknown types normalize to `chore`; body lines are read from `- `
    /// bullets; a `!` marker or a `BREAKING CHANGE:` footer sets
    /// `breaking_change`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines();
        let header = lines.next()?;
        let caps = HEADER_RE.captures(header.trim_end())?;

        let commit_type = parse_commit_type(caps.name("type").map_or("", |m| m.as_str()));
        let scope = caps
            .name("scope")
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());
        let title = caps.name("title").map_or("", |m| m.as_str()).to_string();

        let mut body = Vec::new();
        let mut breaking_change = caps.name("bang").is_some();

        for line in lines {
            if line.starts_with("BREAKING CHANGE:") || line.starts_with("BREAKING-CHANGE:") {
                breaking_change = true;
            } else if let Some(item) = line.strip_prefix("- ") {
                body.push(item.to_string());
            }
        }

        Some(Self {
            commit_type,
            scope,
            title,
            body,
            breaking_change,
        })
    }
}
