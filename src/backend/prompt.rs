//! Prompt construction for backends that talk to a model directly.

use super::{GenerateRequest, Style};
use crate::commit::CommitType;

/// Maximum length for sanitized diff text.
pub const MAX_DIFF_LENGTH: usize = 30_000;

/// Build the model prompt for generating a commit message from a redacted diff.
pub fn build_prompt(request: &GenerateRequest) -> String {
    let sanitized_diff = sanitize_diff(&request.diff, MAX_DIFF_LENGTH);
    let truncation_note = if request.diff.len() > MAX_DIFF_LENGTH {
        "\n\nNote: The diff was truncated due to size. Focus on the visible changes."
    } else {
        ""
    };

    let types = CommitType::ALL
        .iter()
        .map(CommitType::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let style_rules = match request.style {
        Style::Detailed => {
            "- After the subject, add a blank line and 2-5 bullet points starting with \"- \"\n\
             - Each bullet explains one notable change and why it was made"
        }
        Style::Short => "- Output ONLY the subject line, no body",
    };

    let mut hints = Vec::new();
    if let Some(commit_type) = request.commit_type {
        hints.push(format!("- Use the type `{commit_type}`"));
    }
    if let Some(scope) = request.scope.as_deref().filter(|s| !s.is_empty()) {
        hints.push(format!("- Use the scope `{scope}`"));
    }
    if let Some(max) = request.max_length {
        hints.push(format!(
            "- HARD LIMIT: the subject line MUST be at most {max} characters"
        ));
    }
    let hints_section = if hints.is_empty() {
        String::new()
    } else {
        format!("\n\n## Constraints\n{}", hints.join("\n"))
    };

    format!(
        r#"You are generating a Git commit message following the Conventional Commits specification.

## Diff
```
{sanitized_diff}
```{truncation_note}

## Subject Line Rules
- Format: `type(scope): description` (scope is optional)
- Type: one of {types}
- Description: imperative mood ("add", "fix", "remove"), lowercase after colon, no period at end
- Append `!` after the type or scope only if the change breaks a public interface{hints_section}

## Body Rules
{style_rules}

## Output Format
Respond with ONLY the commit message as plain text. No markdown fences, no explanation."#
    )
}

/// Strip control characters (except newlines and tabs) and cut to `max_len` bytes
/// on a char boundary.
pub fn sanitize_diff(text: &str, max_len: usize) -> String {
    let mut result: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    if result.len() > max_len {
        let mut end = max_len;
        while end > 0 && !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
    }

    result
}

/// Remove a surrounding markdown code fence, if the model added one anyway.
pub fn clean_response(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string (```text, ```git) on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}
