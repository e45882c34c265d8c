//! Yes/no questions on the terminal.

use dialoguer::Input;

/// Asks the user a yes/no question.
pub trait Prompter {
    /// Returns `true` only for an affirmative answer.
    fn confirm(&self, prompt: &str) -> Result<bool, dialoguer::Error>;
}

/// Reads one line from the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str) -> Result<bool, dialoguer::Error> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(is_affirmative(&answer))
    }
}

/// `y` or `yes`, ignoring case and surrounding whitespace.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
