//! Google web search.

use scrappa::RequestParams;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ActorError;
use crate::harness::{array_items, array_len, require, Actor};

/// Google SERP query. Everything but `query` is forwarded only when set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleSearchInput {
    #[serde(default)]
    pub query: String,
    pub location: Option<String>,
    pub gl: Option<String>,
    pub hl: Option<String>,
    pub google_domain: Option<String>,
    pub start: Option<u32>,
    pub amount: Option<u32>,
    pub safe: Option<String>,
    pub tbs: Option<String>,
    pub tbm: Option<String>,
    pub lr: Option<String>,
    pub cr: Option<String>,
    pub uule: Option<String>,
    pub nfpr: Option<u8>,
    pub filter: Option<u8>,
}

pub struct GoogleSearch;

impl Actor for GoogleSearch {
    type Input = GoogleSearchInput;

    fn name(&self) -> &'static str {
        "google-search"
    }

    fn endpoint(&self) -> &'static str {
        "/search"
    }

    fn validate(&self, input: &GoogleSearchInput) -> Result<(), ActorError> {
        require(&input.query, "Search query is required")
    }

    fn params(&self, input: &GoogleSearchInput) -> Result<RequestParams, ActorError> {
        Ok(RequestParams::new()
            .with("query", &input.query)
            .with("location", input.location.as_deref())
            .with("gl", input.gl.as_deref())
            .with("hl", input.hl.as_deref())
            .with("google_domain", input.google_domain.as_deref())
            .with("start", input.start)
            .with("amount", input.amount)
            .with("safe", input.safe.as_deref())
            .with("tbs", input.tbs.as_deref())
            .with("tbm", input.tbm.as_deref())
            .with("lr", input.lr.as_deref())
            .with("cr", input.cr.as_deref())
            .with("uule", input.uule.as_deref())
            .with("nfpr", input.nfpr)
            .with("filter", input.filter))
    }

    fn items(&self, response: &Value) -> Vec<Value> {
        array_items(response, "organic_results")
    }

    fn summary(&self, input: &GoogleSearchInput, response: &Value) -> Value {
        json!({
            "query": input.query,
            "organic_results": array_len(response, "organic_results"),
            "related_searches": array_len(response, "related_searches"),
            "related_questions": array_len(response, "related_questions"),
            "inline_videos": array_len(response, "inline_videos"),
            "inline_images": array_len(response, "inline_images"),
            "has_knowledge_graph": is_present(response, "knowledge_graph"),
            "has_local_results": is_present(response, "local_results"),
        })
    }
}

fn is_present(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(|v| !v.is_null())
}
