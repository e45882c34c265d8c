//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. The first config file found: `./.smartcommitrc.json`, then `~/.smartcommitrc.json`
//! 3. Environment variables (see [`Config::with_env_overrides`]), including
//!    any loaded from `./.env` by [`load_dotenv`]. Variables already set in
//!    the environment win over `.env` entries.
//! 4. CLI flags (applied in `main`)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::{BackendKind, Style};
use crate::error::ConfigError;

/// Config file name looked up in the working directory and the home directory.
pub const CONFIG_FILE_NAME: &str = ".smartcommitrc.json";

/// Dotenv file read from the working directory at startup.
pub const DOTENV_FILE_NAME: &str = ".env";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MAX_LENGTH: usize = 100;

pub const ENV_SERVER_URL: &str = "SMARTCOMMIT_SERVER_URL";
pub const ENV_API_KEY: &str = "SMARTCOMMIT_API_KEY";
pub const ENV_TIMEOUT: &str = "SMARTCOMMIT_TIMEOUT";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Resolved configuration. Built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Commit type forced onto every message unless `--type` is given.
    pub default_type: Option<String>,
    pub style: Style,
    pub backend: BackendKind,
    pub server_url: String,
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Gemini model name.
    pub model: String,
    /// Maximum header length passed to the backend and enforced afterwards.
    pub max_length: usize,
    /// Only ever read from `GEMINI_API_KEY`.
    #[serde(skip)]
    pub gemini_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_type: None,
            style: Style::Detailed,
            backend: BackendKind::Server,
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            model: DEFAULT_MODEL.to_string(),
            max_length: DEFAULT_MAX_LENGTH,
            gemini_api_key: None,
        }
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    /// The file the config was read from, if any.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration for `working_dir`, falling back to the home directory.
    ///
    /// Missing files are not an error. A file that exists but cannot be read or
    /// parsed is.
    pub fn load(working_dir: &Path) -> Result<ConfigLoadResult, ConfigError> {
        let home = dirs::home_dir();
        Self::load_from(working_dir, home.as_deref())
    }

    /// Same as [`Config::load`] with an explicit home directory.
    pub fn load_from(
        working_dir: &Path,
        home: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let candidates = std::iter::once(working_dir.join(CONFIG_FILE_NAME))
            .chain(home.map(|h| h.join(CONFIG_FILE_NAME)));

        for path in candidates {
            if path.is_file() {
                let config = Self::read_file(&path)?;
                debug!(path = %path.display(), "Loaded config");
                return Ok(ConfigLoadResult {
                    config,
                    path: Some(path),
                });
            }
        }

        debug!("No config file found, using defaults");
        Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        })
    }

    fn read_file(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config.with_valid_limits(path))
    }

    // Zero is never a usable timeout or header length.
    fn with_valid_limits(mut self, path: &Path) -> Self {
        if self.timeout == 0 {
            warn!(
                "Invalid timeout 0 in {}, using {}s",
                path.display(),
                DEFAULT_TIMEOUT_SECS
            );
            self.timeout = DEFAULT_TIMEOUT_SECS;
        }
        if self.max_length == 0 {
            warn!(
                "Invalid max_length 0 in {}, using {}",
                path.display(),
                DEFAULT_MAX_LENGTH
            );
            self.max_length = DEFAULT_MAX_LENGTH;
        }
        self
    }

    /// Apply `SMARTCOMMIT_SERVER_URL`, `SMARTCOMMIT_API_KEY`,
    /// `SMARTCOMMIT_TIMEOUT` and `GEMINI_API_KEY`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env(ENV_SERVER_URL) {
            self.server_url = url;
        }
        if let Some(key) = non_empty_env(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(raw) = non_empty_env(ENV_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout = secs,
                _ => warn!(
                    "Invalid {} value '{}', keeping {}s",
                    ENV_TIMEOUT, raw, self.timeout
                ),
            }
        }
        if let Some(key) = non_empty_env(ENV_GEMINI_API_KEY) {
            self.gemini_api_key = Some(key);
        }
        self
    }

    pub fn default_type(&self) -> Option<&str> {
        self.default_type.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load `.env` from `working_dir` into the process environment.
///
/// Returns the file path when it was loaded. A missing file is not an error;
/// a malformed one is logged and skipped.
pub fn load_dotenv(working_dir: &Path) -> Option<PathBuf> {
    let path = working_dir.join(DOTENV_FILE_NAME);
    match dotenvy::from_path(&path) {
        Ok(()) => {
            debug!(path = %path.display(), "Loaded environment file");
            Some(path)
        }
        Err(e) if e.not_found() => {
            debug!("No {} file in {}", DOTENV_FILE_NAME, working_dir.display());
            None
        }
        Err(e) => {
            warn!("Failed to load {}: {}", path.display(), e);
            None
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
