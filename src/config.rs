//! Configuration and credential resolution
//!
//! Credentials resolve through two tiers, highest priority first:
//!
//! 1. Explicit runtime configuration (CLI flag or environment, merged by
//!    the CLI layer before it gets here)
//! 2. The local untracked `secrets.toml` file
//!
//! The result is a plain `AppConfig` struct constructed once at process
//! start and passed into every component that needs a credential; nothing
//! downstream reads environment variables or files on its own. A step
//! that needs an absent credential fails once, up front, before any row
//! is processed.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Conventional location of the untracked secrets file.
pub const DEFAULT_SECRETS_PATH: &str = "secrets.toml";

/// Schema of `secrets.toml`. All keys optional; unknown keys ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsFile {
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    google_api_key: Option<String>,
    openai_api_key: Option<String>,
}

impl AppConfig {
    /// Resolve credentials from explicit runtime values plus the secrets
    /// file at `secrets_path`. A missing secrets file is fine; an
    /// unreadable one degrades to a warning so a bad file never blocks
    /// steps that need no credential at all.
    pub fn resolve(
        runtime_google: Option<String>,
        runtime_openai: Option<String>,
        secrets_path: &Path,
    ) -> Self {
        let secrets = load_secrets(secrets_path);

        Self {
            google_api_key: pick_key("Google API key", runtime_google, secrets.google_api_key),
            openai_api_key: pick_key("OpenAI API key", runtime_openai, secrets.openai_api_key),
        }
    }

    /// Build directly from already-resolved values (tests, embedding).
    pub fn with_keys(google: Option<String>, openai: Option<String>) -> Self {
        Self {
            google_api_key: google,
            openai_api_key: openai,
        }
    }

    /// The Google key, or the fatal configuration error for any step that
    /// needs the places provider.
    pub fn require_google_api_key(&self) -> Result<&str> {
        self.google_api_key.as_deref().ok_or_else(|| {
            Error::Config(
                "Google API key not configured. Provide it using one of:\n\
                 1. Flag/environment: --google-api-key <key> or GOOGLE_API_KEY\n\
                 2. Secrets file: secrets.toml (google_api_key = \"your-key\")\n\
                 \n\
                 Keys are issued in the Google Cloud console (enable the Places API)."
                    .to_string(),
            )
        })
    }

    /// The OpenAI key, or the fatal configuration error for the mood
    /// classification and ask steps.
    pub fn require_openai_api_key(&self) -> Result<&str> {
        self.openai_api_key.as_deref().ok_or_else(|| {
            Error::Config(
                "OpenAI API key not configured. Provide it using one of:\n\
                 1. Flag/environment: --openai-api-key <key> or OPENAI_API_KEY\n\
                 2. Secrets file: secrets.toml (openai_api_key = \"your-key\")"
                    .to_string(),
            )
        })
    }

    pub fn has_google_api_key(&self) -> bool {
        self.google_api_key.is_some()
    }

    pub fn has_openai_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

/// Validate a candidate key (non-empty, non-whitespace).
fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Pick one credential across the two tiers, logging where it came from.
fn pick_key(
    label: &str,
    runtime: Option<String>,
    from_file: Option<String>,
) -> Option<String> {
    let runtime = runtime.filter(|k| is_valid_key(k));
    let from_file = from_file.filter(|k| is_valid_key(k));

    if runtime.is_some() && from_file.is_some() {
        warn!(
            "{} found in both runtime configuration and secrets file; \
             using runtime value (highest priority)",
            label
        );
    }

    match (runtime, from_file) {
        (Some(key), _) => {
            info!("{} loaded from runtime configuration", label);
            Some(key)
        }
        (None, Some(key)) => {
            info!("{} loaded from secrets file", label);
            Some(key)
        }
        (None, None) => None,
    }
}

/// Read the secrets file, degrading to defaults on any problem.
fn load_secrets(path: &Path) -> SecretsFile {
    if !path.exists() {
        debug!(path = %path.display(), "No secrets file; relying on runtime configuration");
        return SecretsFile::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), "Secrets file unreadable ({}); ignoring", e);
            return SecretsFile::default();
        }
    };

    match toml::from_str(&content) {
        Ok(secrets) => secrets,
        Err(e) => {
            warn!(path = %path.display(), "Secrets file unparsable ({}); ignoring", e);
            SecretsFile::default()
        }
    }
}
