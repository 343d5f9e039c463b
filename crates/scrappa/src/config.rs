//! Client configuration.

use std::fmt;

use url::Url;

use crate::error::ConfigError;

/// Production base URL of the Scrappa API.
pub const DEFAULT_BASE_URL: &str = "https://scrappa.co/api";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "SCRAPPA_API_KEY";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "SCRAPPA_BASE_URL";

/// Environment variable enabling request logging ("true" or "1").
pub const ENV_DEBUG: &str = "SCRAPPA_DEBUG";

/// Immutable configuration for a [`ScrappaClient`](crate::ScrappaClient).
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    debug: bool,
}

impl ClientConfig {
    /// Create a configuration with the default base URL and debug disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty or blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            debug: false,
        })
    }

    /// Override the base URL. A trailing slash is dropped so endpoint paths
    /// (which start with `/`) concatenate cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL cannot be parsed.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim_end_matches('/');
        Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Load configuration from the process environment.
    ///
    /// Reads `SCRAPPA_API_KEY` (required), `SCRAPPA_BASE_URL` and
    /// `SCRAPPA_DEBUG` (optional).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] if the key variable is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key =
            lookup(ENV_API_KEY).ok_or_else(|| ConfigError::MissingApiKey(ENV_API_KEY.to_string()))?;

        let mut config = Self::new(api_key)?;

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(base_url)?;
        }

        let debug = lookup(ENV_DEBUG)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(config.with_debug(debug))
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("debug", &self.debug)
            .finish()
    }
}
