//! Error types for the Scrappa client.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Message fragments that mark a failure as transient regardless of status.
///
/// The `cloudflare` term catches edge-proxy error pages that sit in front of
/// the API and surface with otherwise ordinary status codes.
static TRANSIENT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)timed?\s*out|timeout|temporarily unavailable|cloudflare")
        .expect("transient message pattern is valid")
});

/// Errors raised while building a [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The credential environment variable is not set.
    #[error("{0} environment variable is not set")]
    MissingApiKey(String),

    /// The API key was provided but is empty.
    #[error("Scrappa API key must not be empty")]
    EmptyApiKey,

    /// The base URL cannot be parsed.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Whether a failed call is worth retrying against another endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Timeout, rate limit, 5xx or an intermediary-layer failure.
    Transient,
    /// Validation, auth, not-found and everything else.
    Permanent,
}

impl FailureClass {
    /// Classify a failure from its HTTP status and extracted message.
    #[must_use]
    pub fn classify(status: u16, message: &str) -> Self {
        if matches!(status, 408 | 429 | 500..=599) || TRANSIENT_MESSAGE.is_match(message) {
            Self::Transient
        } else {
            Self::Permanent
        }
    }

    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// A non-2xx response from the Scrappa API.
///
/// The failure class is fixed when the error is built, so callers never have
/// to re-derive it from the rendered message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("API error ({status}): {message}")]
pub struct UpstreamError {
    status: u16,
    message: String,
    field_errors: Option<BTreeMap<String, Vec<String>>>,
    class: FailureClass,
}

impl UpstreamError {
    /// Build an error from a status and a detail message.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let class = FailureClass::classify(status, &message);
        Self {
            status,
            message,
            field_errors: None,
            class,
        }
    }

    /// Build an error carrying per-field validation messages.
    ///
    /// Non-empty field errors are appended to the detail message as
    /// `field: msg1, msg2; other: msg3`.
    #[must_use]
    pub fn with_field_errors(
        status: u16,
        message: impl Into<String>,
        field_errors: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let mut message = message.into();
        if !field_errors.is_empty() {
            message.push_str(" - ");
            message.push_str(&render_field_errors(&field_errors));
        }
        let class = FailureClass::classify(status, &message);
        Self {
            status,
            message,
            field_errors: Some(field_errors),
            class,
        }
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Detail message, without the `API error (<status>)` prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        self.field_errors.as_ref()
    }

    #[must_use]
    pub const fn class(&self) -> FailureClass {
        self.class
    }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.class.is_transient()
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

fn render_field_errors(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur when calling the Scrappa API.
#[derive(Debug, Error)]
pub enum ScrappaError {
    /// No HTTP response was received (DNS, connection reset, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// A 2xx body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Base URL and endpoint path do not form a valid URL.
    #[error("Invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Client configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScrappaError {
    /// HTTP status of an upstream failure, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream(e) => Some(e.status()),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the failure qualifies for a single fallback attempt.
    ///
    /// Upstream errors carry their own classification. Transport errors are
    /// transient when the request timed out, or when an underlying cause
    /// (a connect timeout, say) reads as a transient failure.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Upstream(e) => e.is_transient(),
            Self::Transport(e) => {
                e.is_timeout() || std::error::Error::source(e).is_some_and(cause_is_transient)
            }
            _ => false,
        }
    }
}

/// Walk an error's cause chain looking for a transient failure message.
///
/// Starts below the transport error itself, whose text embeds the request URL.
fn cause_is_transient(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if TRANSIENT_MESSAGE.is_match(&cause.to_string()) {
            return true;
        }
        current = cause.source();
    }
    false
}

/// Result alias for Scrappa client operations.
pub type Result<T, E = ScrappaError> = std::result::Result<T, E>;
