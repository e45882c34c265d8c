//! One-time consent to send diffs off the machine.
//!
//! Consent is recorded as a marker file in the home directory. The marker is
//! written atomically (temp file in the same directory, then rename) and is
//! only readable by its owner on Unix.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::debug;

use super::prompt::Prompter;
use crate::error::ConsentError;

pub const CONSENT_FILE_NAME: &str = ".smartcommit_consent";

/// Tracks whether the user agreed to the security notice.
#[derive(Debug, Clone)]
pub struct ConsentGate {
    marker: PathBuf,
}

impl ConsentGate {
    /// Gate backed by the marker file at `marker`.
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Gate backed by `~/.smartcommit_consent`.
    pub fn in_home_dir() -> Result<Self, ConsentError> {
        let home = dirs::home_dir().ok_or(ConsentError::NoHomeDir)?;
        Ok(Self::new(home.join(CONSENT_FILE_NAME)))
    }

    pub fn marker(&self) -> &Path {
        &self.marker
    }

    pub fn is_granted(&self) -> bool {
        self.marker.is_file()
    }

    /// Write the marker with the current timestamp.
    pub fn record(&self) -> Result<(), ConsentError> {
        let record_err = |source: std::io::Error| ConsentError::Record {
            path: self.marker.clone(),
            source,
        };

        let parent = match self.marker.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(parent).map_err(record_err)?;
        writeln!(file, "consented at {}", Utc::now().to_rfc3339()).map_err(record_err)?;
        file.persist(&self.marker)
            .map_err(|e| record_err(e.error))?;

        debug!(path = %self.marker.display(), "Recorded consent");
        Ok(())
    }

    /// Ask for consent unless it was already given.
    ///
    /// Prints the security notice naming `destination`, then records the
    /// answer. A refusal is [`ConsentError::Declined`].
    pub fn ensure<P>(&self, prompter: &P, destination: &str) -> Result<(), ConsentError>
    where
        P: Prompter + ?Sized,
    {
        if self.is_granted() {
            return Ok(());
        }

        println!("{}", security_notice(destination));

        let agreed = prompter
            .confirm("Do you agree to send diffs to this service? (y/n)")
            .map_err(ConsentError::Prompt)?;
        if !agreed {
            return Err(ConsentError::Declined);
        }

        self.record()?;
        println!("Consent recorded. This notice will not be shown again.\n");
        Ok(())
    }
}

fn security_notice(destination: &str) -> String {
    format!(
        "Security notice\n\
         \n\
         smartcommit sends your staged diff to {destination} to generate a commit message.\n\
         Before anything is sent, likely secrets are redacted: API keys, tokens, passwords,\n\
         private keys, email addresses and card numbers. Redaction is best effort.\n\
         Review your staged changes if they may contain sensitive data.\n"
    )
}
