//! Single-shot fallback for Google Maps search.
//!
//! `/maps/simple-search` is cheap but sits behind an edge proxy that times out
//! under load. When it fails transiently the same query is replayed once
//! against `/maps/advanced-search` with an explicit zoom level, and the
//! response is tagged with `fallback_used` so consumers can tell a direct hit
//! from a fallback hit.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::ScrappaApi;
use crate::error::Result;
use crate::params::{ParamValue, RequestParams};

/// Primary maps search endpoint.
pub const SIMPLE_SEARCH_ENDPOINT: &str = "/maps/simple-search";

/// Secondary maps search endpoint used after a transient failure.
pub const ADVANCED_SEARCH_ENDPOINT: &str = "/maps/advanced-search";

/// Zoom level sent to the advanced search when the caller gives none.
pub const DEFAULT_FALLBACK_ZOOM: u32 = 13;

/// Field injected into fallback responses.
pub const FALLBACK_MARKER_FIELD: &str = "fallback_used";

/// Which endpoints to try and how to adjust parameters for the second one.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPolicy {
    primary: String,
    secondary: String,
    override_key: String,
    override_value: ParamValue,
}

impl FallbackPolicy {
    /// Build a policy from explicit endpoints and one parameter override.
    #[must_use]
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        override_key: impl Into<String>,
        override_value: impl Into<ParamValue>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            override_key: override_key.into(),
            override_value: override_value.into(),
        }
    }

    /// Simple search, falling back to advanced search at `zoom`.
    #[must_use]
    pub fn maps_search(zoom: u32) -> Self {
        Self::new(SIMPLE_SEARCH_ENDPOINT, ADVANCED_SEARCH_ENDPOINT, "zoom", zoom)
    }

    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    #[must_use]
    pub fn secondary(&self) -> &str {
        &self.secondary
    }

    /// Name recorded in `fallback_used`: the secondary endpoint's last path
    /// segment.
    #[must_use]
    pub fn secondary_name(&self) -> &str {
        self.secondary
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.secondary)
    }

    /// Parameters for the secondary call: the originals plus the override.
    #[must_use]
    pub fn secondary_params(&self, params: &RequestParams) -> RequestParams {
        let mut adjusted = params.clone();
        adjusted.insert(self.override_key.clone(), self.override_value.clone());
        adjusted
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::maps_search(DEFAULT_FALLBACK_ZOOM)
    }
}

/// Call the primary endpoint, replaying once against the secondary endpoint
/// on a transient failure.
///
/// # Errors
///
/// A non-transient primary failure is returned unchanged. A failure on the
/// secondary call is returned as-is; there is no further fallback.
pub async fn fetch_with_fallback<C>(
    client: &C,
    policy: &FallbackPolicy,
    params: &RequestParams,
) -> Result<Value>
where
    C: ScrappaApi + ?Sized,
{
    match client.get_json(policy.primary(), params).await {
        Ok(response) => return Ok(response),
        Err(e) if e.is_transient() => {
            warn!(
                endpoint = policy.primary(),
                fallback = policy.secondary(),
                error = %e,
                "Transient upstream issue, falling back"
            );
        }
        Err(e) => return Err(e),
    }

    let adjusted = policy.secondary_params(params);
    let response = client.get_json(policy.secondary(), &adjusted).await?;
    debug!(fallback = policy.secondary(), "Fallback request succeeded");

    Ok(mark_fallback(response, policy.secondary_name()))
}

/// Inject the fallback marker. Non-object payloads are wrapped under `data`.
fn mark_fallback(response: Value, name: &str) -> Value {
    let mut object = match response {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    object.insert(
        FALLBACK_MARKER_FIELD.to_string(),
        Value::String(name.to_string()),
    );
    Value::Object(object)
}
