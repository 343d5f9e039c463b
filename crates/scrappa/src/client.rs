//! HTTP client for the Scrappa API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Result, ScrappaError, UpstreamError};
use crate::params::RequestParams;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Longest raw (non-JSON) error body kept in an error message.
const MAX_ERROR_EXCERPT: usize = 500;

/// Minimal surface the fallback and the actor harness need from a client.
#[async_trait]
pub trait ScrappaApi: Send + Sync {
    /// Issue a GET and return the decoded JSON payload.
    async fn get_json(&self, endpoint: &str, params: &RequestParams) -> Result<Value>;
}

/// Scrappa API client.
///
/// Each call performs exactly one HTTP round-trip: no retries, no timeouts
/// beyond the transport defaults.
#[derive(Debug, Clone)]
pub struct ScrappaClient {
    http: Client,
    config: ClientConfig,
}

impl ScrappaClient {
    /// Create a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be initialised.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("scrappa-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// Create a client from `SCRAPPA_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ScrappaError::Config`] if the API key is missing or invalid.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `endpoint` with `params` encoded into the query string.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx responses and undecodable bodies.
    pub async fn get<T>(&self, endpoint: &str, params: &RequestParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, endpoint, Some(params), None::<&Value>)
            .await
    }

    /// POST `body` as JSON to `endpoint`. No query parameters are sent.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx responses and undecodable bodies.
    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.request(Method::POST, endpoint, None, Some(body)).await
    }

    /// [`ScrappaClient::post`] returning the raw JSON payload.
    ///
    /// # Errors
    ///
    /// Same as [`ScrappaClient::post`].
    pub async fn post_json<B>(&self, endpoint: &str, body: &B) -> Result<Value>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.post(endpoint, body).await
    }

    /// Build the target URL: base URL + endpoint, then encoded parameters.
    pub(crate) fn build_url(&self, endpoint: &str, params: Option<&RequestParams>) -> Result<Url> {
        let raw = format!("{}{endpoint}", self.config.base_url());
        let mut url = Url::parse(&raw).map_err(|source| ScrappaError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        if let Some(params) = params {
            let pairs = params.encode();
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        Ok(url)
    }

    #[instrument(skip(self, params, body))]
    async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<&RequestParams>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(endpoint, params)?;

        if self.config.debug() {
            info!("[Scrappa] {method} {url}");
        }
        debug!(url = %url, "Making Scrappa API request");

        let mut request = self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, self.config.api_key())
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await.into());
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ScrappaApi for ScrappaClient {
    async fn get_json(&self, endpoint: &str, params: &RequestParams) -> Result<Value> {
        self.get(endpoint, params).await
    }
}

/// Normalise a non-2xx response into an [`UpstreamError`].
///
/// The body is read once. JSON bodies contribute `message` and `errors`;
/// anything else (an HTML page from a proxy, say) is used as raw text.
async fn upstream_error(response: Response) -> UpstreamError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    error_from_body(status, &text)
}

fn error_from_body(status: u16, text: &str) -> UpstreamError {
    if let Ok(Value::Object(body)) = serde_json::from_str::<Value>(text) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| format!("HTTP {status}"), str::to_string);
        return match body.get("errors").and_then(field_errors) {
            Some(errors) => UpstreamError::with_field_errors(status, message, errors),
            None => UpstreamError::new(status, message),
        };
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        UpstreamError::new(status, format!("HTTP {status}"))
    } else {
        UpstreamError::new(status, excerpt(trimmed))
    }
}

/// Collect `field -> [messages]` from an `errors` object.
///
/// A bare string counts as a single message. Entries of any other shape are
/// skipped, as is an `errors` value that is not an object.
fn field_errors(errors: &Value) -> Option<BTreeMap<String, Vec<String>>> {
    let errors = errors.as_object()?;
    let collected = errors
        .iter()
        .filter_map(|(field, value)| {
            let messages: Vec<String> = match value {
                Value::String(message) => vec![message.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => return None,
            };
            (!messages.is_empty()).then(|| (field.clone(), messages))
        })
        .collect();
    Some(collected)
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_ERROR_EXCERPT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
