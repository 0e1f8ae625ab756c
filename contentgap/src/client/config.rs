//! Configuration types for the wiki and page-view clients.

use crate::errors::{GapError, GapResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Configuration for the HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Wikipedia language code, e.g. `fr`.
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Action API endpoint; derived from `lang` when absent.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Base URL of the Wikimedia REST API.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
}

fn default_lang() -> String {
    "fr".to_string()
}

fn default_rest_url() -> String {
    "https://wikimedia.org/api/rest_v1".to_string()
}

fn default_user_agent() -> String {
    format!("SurfaceContentGapBot v{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> f64 {
    30.0
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            api_url: None,
            rest_url: default_rest_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for the given language edition.
    #[must_use]
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            ..Self::default()
        }
    }

    /// Overrides the Action API endpoint.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Action API endpoint.
    #[must_use]
    pub fn api_endpoint(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org/w/api.php", self.lang))
    }

    /// Page-view project name, e.g. `fr.wikipedia`.
    #[must_use]
    pub fn project(&self) -> String {
        format!("{}.wikipedia", self.lang)
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }

    /// Rejects values the clients cannot work with.
    pub fn validate(&self) -> GapResult<()> {
        if self.lang.trim().is_empty() {
            return Err(GapError::invalid_configuration("language code is empty"));
        }
        if !self.timeout_seconds.is_finite() || self.timeout_seconds <= 0.0 {
            return Err(GapError::invalid_configuration(format!(
                "timeout must be positive, got {}",
                self.timeout_seconds
            )));
        }
        Ok(())
    }
}

/// Login credentials.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Account name.
    pub user: String,
    /// Account or bot password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct CredentialsFile {
    login: Credentials,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Parses a TOML document with a `[login]` table holding `user` and
    /// `password`.
    pub fn from_toml_str(content: &str) -> GapResult<Self> {
        let file: CredentialsFile = toml::from_str(content)?;
        Ok(file.login)
    }

    /// Reads credentials from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> GapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
