//! Google Maps actors: search, advanced search, autocomplete, business
//! details and photos.

use async_trait::async_trait;
use scrappa::{
    fetch_with_fallback, FallbackPolicy, RequestParams, ScrappaApi, ScrappaError,
    ADVANCED_SEARCH_ENDPOINT, DEFAULT_FALLBACK_ZOOM, FALLBACK_MARKER_FIELD, SIMPLE_SEARCH_ENDPOINT,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{apply_cache, CacheMode};
use crate::error::ActorError;
use crate::harness::{array_items, array_len, require, Actor, NotFound, NotFoundPolicy};

const DEFAULT_LANGUAGE: &str = "en";
const BUSINESS_NOT_FOUND: &str = "Business not found";

// ============================================================================
// Search (simple search with advanced-search fallback)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapsSearchInput {
    #[serde(default)]
    pub query: String,
    pub hl: Option<String>,
    pub gl: Option<String>,
    pub use_cache: Option<bool>,
    pub maximum_cache_age: Option<u32>,
    /// Zoom sent to the advanced search if simple search fails transiently.
    pub fallback_zoom: Option<u32>,
}

pub struct MapsSearch;

#[async_trait]
impl Actor for MapsSearch {
    type Input = MapsSearchInput;

    fn name(&self) -> &'static str {
        "maps-search"
    }

    fn endpoint(&self) -> &'static str {
        SIMPLE_SEARCH_ENDPOINT
    }

    fn validate(&self, input: &MapsSearchInput) -> Result<(), ActorError> {
        require(&input.query, "Search query is required")
    }

    fn params(&self, input: &MapsSearchInput) -> Result<RequestParams, ActorError> {
        let mut params = RequestParams::new()
            .with("query", &input.query)
            .with("hl", language(input.hl.as_deref()))
            .with("gl", input.gl.as_deref());
        apply_cache(
            &mut params,
            CacheMode::OnByDefault,
            input.use_cache,
            input.maximum_cache_age,
        );
        Ok(params)
    }

    async fn call(&self, api: &dyn ScrappaApi, input: &MapsSearchInput) -> Result<Value, ActorError> {
        let params = self.params(input)?;
        let policy = FallbackPolicy::maps_search(input.fallback_zoom.unwrap_or(DEFAULT_FALLBACK_ZOOM));
        info!(query = %input.query, "Searching Google Maps");
        Ok(fetch_with_fallback(api, &policy, &params).await?)
    }

    fn items(&self, response: &Value) -> Vec<Value> {
        array_items(response, "items")
    }

    fn summary(&self, input: &MapsSearchInput, response: &Value) -> Value {
        json!({
            "query": input.query,
            "results_found": array_len(response, "items"),
            "fallback_used": response.get(FALLBACK_MARKER_FIELD).cloned().unwrap_or(Value::Null),
        })
    }
}

// ============================================================================
// Advanced search
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapsAdvancedSearchInput {
    #[serde(default)]
    pub query: String,
    pub zoom: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub limit: Option<u32>,
    pub hl: Option<String>,
    pub gl: Option<String>,
}

pub struct MapsAdvancedSearch;

impl Actor for MapsAdvancedSearch {
    type Input = MapsAdvancedSearchInput;

    fn name(&self) -> &'static str {
        "maps-advanced-search"
    }

    fn endpoint(&self) -> &'static str {
        ADVANCED_SEARCH_ENDPOINT
    }

    fn validate(&self, input: &MapsAdvancedSearchInput) -> Result<(), ActorError> {
        const MESSAGE: &str = "Search query and zoom level are required";
        require(&input.query, MESSAGE)?;
        if input.zoom.is_none() {
            return Err(ActorError::InvalidInput(MESSAGE.to_string()));
        }
        Ok(())
    }

    fn params(&self, input: &MapsAdvancedSearchInput) -> Result<RequestParams, ActorError> {
        match (input.latitude, input.longitude) {
            (Some(lat), Some(lon)) => info!(
                query = %input.query,
                zoom = ?input.zoom,
                lat,
                lon,
                "Advanced search at fixed location"
            ),
            _ => info!(
                query = %input.query,
                zoom = ?input.zoom,
                "Advanced search (auto-resolved location)"
            ),
        }

        Ok(RequestParams::new()
            .with("query", &input.query)
            .with("zoom", input.zoom)
            .with("lat", input.latitude)
            .with("lon", input.longitude)
            .with("limit", input.limit)
            .with("hl", language(input.hl.as_deref()))
            .with("gl", input.gl.as_deref()))
    }

    fn items(&self, response: &Value) -> Vec<Value> {
        array_items(response, "items")
    }

    fn summary(&self, input: &MapsAdvancedSearchInput, response: &Value) -> Value {
        json!({
            "query": input.query,
            "results_found": array_len(response, "items"),
            "zoom_level": input.zoom,
            "language": language(input.hl.as_deref()),
            "region": input.gl.as_deref().unwrap_or("worldwide"),
        })
    }
}

// ============================================================================
// Autocomplete
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapsAutocompleteInput {
    #[serde(default)]
    pub query: String,
}

pub struct MapsAutocomplete;

impl Actor for MapsAutocomplete {
    type Input = MapsAutocompleteInput;

    fn name(&self) -> &'static str {
        "maps-autocomplete"
    }

    fn endpoint(&self) -> &'static str {
        "/maps/autocomplete"
    }

    fn validate(&self, input: &MapsAutocompleteInput) -> Result<(), ActorError> {
        require(&input.query, "Search query is required")
    }

    fn params(&self, input: &MapsAutocompleteInput) -> Result<RequestParams, ActorError> {
        Ok(RequestParams::new().with("query", &input.query))
    }

    fn items(&self, response: &Value) -> Vec<Value> {
        array_items(response, "suggestions")
    }

    fn summary(&self, input: &MapsAutocompleteInput, response: &Value) -> Value {
        json!({
            "query": input.query,
            "suggestions_found": array_len(response, "suggestions"),
        })
    }
}

// ============================================================================
// Business lookups (details, photos)
// ============================================================================

/// Input shared by actors that look up a single business.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessInput {
    #[serde(default)]
    pub business_id: String,
    pub use_cache: Option<bool>,
    pub maximum_cache_age: Option<u32>,
}

impl BusinessInput {
    fn validate(&self) -> Result<(), ActorError> {
        require(&self.business_id, "Business ID is required")
    }

    fn params(&self) -> RequestParams {
        let mut params = RequestParams::new().with("business_id", &self.business_id);
        apply_cache(
            &mut params,
            CacheMode::OnByDefault,
            self.use_cache,
            self.maximum_cache_age,
        );
        params
    }

    fn not_found_item(&self) -> Value {
        json!({
            "success": false,
            "business_id": self.business_id,
            "error": BUSINESS_NOT_FOUND,
        })
    }
}

pub struct MapsBusinessDetails;

impl Actor for MapsBusinessDetails {
    type Input = BusinessInput;

    fn name(&self) -> &'static str {
        "maps-business-details"
    }

    fn endpoint(&self) -> &'static str {
        "/maps/business-details"
    }

    fn validate(&self, input: &BusinessInput) -> Result<(), ActorError> {
        input.validate()
    }

    fn params(&self, input: &BusinessInput) -> Result<RequestParams, ActorError> {
        Ok(input.params())
    }

    fn not_found_policy(&self) -> NotFoundPolicy {
        NotFoundPolicy::Record
    }

    fn not_found(&self, input: &BusinessInput, _error: &ScrappaError) -> NotFound {
        NotFound {
            item: input.not_found_item(),
            output: Some(json!({ "data": [], "error": BUSINESS_NOT_FOUND })),
        }
    }

    fn items(&self, response: &Value) -> Vec<Value> {
        array_items(response, "data")
    }

    fn summary(&self, input: &BusinessInput, response: &Value) -> Value {
        let name = response
            .pointer("/data/0/name")
            .and_then(Value::as_str)
            .unwrap_or("Business");
        json!({
            "business_id": input.business_id,
            "name": name,
            "records_found": array_len(response, "data"),
        })
    }
}

pub struct MapsPhotos;

impl MapsPhotos {
    /// Photos arrive either as a bare array or wrapped in `{ "data": [...] }`.
    fn photos(response: &Value) -> Vec<Value> {
        match response {
            Value::Array(photos) => photos.clone(),
            other => array_items(other, "data"),
        }
    }
}

impl Actor for MapsPhotos {
    type Input = BusinessInput;

    fn name(&self) -> &'static str {
        "maps-photos"
    }

    fn endpoint(&self) -> &'static str {
        "/maps/photos"
    }

    fn validate(&self, input: &BusinessInput) -> Result<(), ActorError> {
        input.validate()
    }

    fn params(&self, input: &BusinessInput) -> Result<RequestParams, ActorError> {
        Ok(input.params())
    }

    fn not_found_policy(&self) -> NotFoundPolicy {
        NotFoundPolicy::Record
    }

    fn not_found(&self, input: &BusinessInput, _error: &ScrappaError) -> NotFound {
        NotFound {
            item: input.not_found_item(),
            output: Some(json!({ "photos": [], "total": 0, "error": BUSINESS_NOT_FOUND })),
        }
    }

    fn items(&self, response: &Value) -> Vec<Value> {
        Self::photos(response)
    }

    fn output(&self, response: Value) -> Value {
        let photos = Self::photos(&response);
        json!({ "total": photos.len(), "photos": photos })
    }

    fn summary(&self, input: &BusinessInput, response: &Value) -> Value {
        json!({
            "business_id": input.business_id,
            "photos_found": Self::photos(response).len(),
        })
    }
}

fn language(hl: Option<&str>) -> &str {
    hl.filter(|v| !v.is_empty()).unwrap_or(DEFAULT_LANGUAGE)
}
