//! Client for the Scrappa scraping API.
//!
//! This crate provides the shared core used by every Scrappa actor:
//!
//! - [`ScrappaClient`] performs one HTTP round-trip per call, encodes query
//!   parameters and normalises failures into [`UpstreamError`]
//! - [`fetch_with_fallback`] retries a Google Maps simple search once against
//!   the advanced search endpoint when the first call fails transiently
//!
//! # Usage
//!
//! ```no_run
//! use scrappa::{ClientConfig, RequestParams, ScrappaClient};
//!
//! # async fn run() -> Result<(), scrappa::ScrappaError> {
//! let config = ClientConfig::new("my-api-key")?;
//! let client = ScrappaClient::new(config)?;
//!
//! let params = RequestParams::new()
//!     .with("query", "coffee berlin")
//!     .with("use_cache", true);
//! let response: serde_json::Value = client.get("/search", &params).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`ClientConfig::from_env`] reads:
//!
//! - `SCRAPPA_API_KEY`: API key (required)
//! - `SCRAPPA_BASE_URL`: base URL override (defaults to `https://scrappa.co/api`)
//! - `SCRAPPA_DEBUG`: set to "true" to log every outgoing request

pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod params;

pub use client::{ScrappaApi, ScrappaClient, API_KEY_HEADER};
pub use config::{ClientConfig, DEFAULT_BASE_URL, ENV_API_KEY, ENV_BASE_URL, ENV_DEBUG};
pub use error::{ConfigError, FailureClass, Result, ScrappaError, UpstreamError};
pub use fallback::{
    fetch_with_fallback, FallbackPolicy, ADVANCED_SEARCH_ENDPOINT, DEFAULT_FALLBACK_ZOOM,
    FALLBACK_MARKER_FIELD, SIMPLE_SEARCH_ENDPOINT,
};
pub use params::{ParamValue, RequestParams};
