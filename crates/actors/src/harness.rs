//! Generic actor run: one remote call, persist the result, classify failure.
//!
//! Every integration follows the same flow: validate input, call one
//! endpoint, push dataset items, store the full response under `OUTPUT`,
//! log a summary. The [`Actor`] trait captures the per-endpoint parts and
//! [`run_actor`] owns the control flow.

use async_trait::async_trait;
use scrappa::{RequestParams, ScrappaApi, ScrappaError};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::ActorError;
use crate::storage::{RunStorage, OUTPUT_KEY};

/// How an actor treats a 404 from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// 404 ends the run as a failure.
    Propagate,
    /// 404 is recorded as a placeholder item and the run succeeds.
    Record,
}

/// What to persist when a lookup target does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct NotFound {
    /// Pushed to the dataset.
    pub item: Value,
    /// Stored under `OUTPUT`, if any.
    pub output: Option<Value>,
}

/// Verdict on a 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub enum Inspection {
    Accept,
    NotFound(NotFound),
}

/// Final state of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Response persisted; `items` dataset entries were written.
    Completed { items: usize, summary: Value },
    /// Target did not exist and a placeholder was recorded.
    NotFound { record: Value },
}

/// A single-purpose integration against one Scrappa endpoint.
#[async_trait]
pub trait Actor: Send + Sync {
    /// Input document, deserialized from JSON.
    type Input: DeserializeOwned + Send + Sync;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Endpoint called by the default [`Actor::call`].
    fn endpoint(&self) -> &'static str;

    /// Reject input that is missing required fields.
    fn validate(&self, _input: &Self::Input) -> Result<(), ActorError> {
        Ok(())
    }

    /// Query parameters for the call.
    fn params(&self, input: &Self::Input) -> Result<RequestParams, ActorError>;

    /// Issue the remote call.
    async fn call(&self, api: &dyn ScrappaApi, input: &Self::Input) -> Result<Value, ActorError> {
        let params = self.params(input)?;
        Ok(api.get_json(self.endpoint(), &params).await?)
    }

    fn not_found_policy(&self) -> NotFoundPolicy {
        NotFoundPolicy::Propagate
    }

    /// Placeholder recorded for a 404 under [`NotFoundPolicy::Record`].
    fn not_found(&self, _input: &Self::Input, error: &ScrappaError) -> NotFound {
        NotFound {
            item: json!({ "success": false, "error": error.to_string() }),
            output: None,
        }
    }

    /// Check an application-level failure inside a 2xx payload.
    fn inspect(&self, _input: &Self::Input, _response: &Value) -> Result<Inspection, ActorError> {
        Ok(Inspection::Accept)
    }

    /// Dataset items extracted from the response.
    fn items(&self, response: &Value) -> Vec<Value>;

    /// Document stored under `OUTPUT`.
    fn output(&self, response: Value) -> Value {
        response
    }

    /// Counts and highlights logged at the end of the run.
    fn summary(&self, input: &Self::Input, response: &Value) -> Value;
}

/// Run `actor` once against `api`, persisting into `storage`.
pub async fn run_actor<A>(
    actor: &A,
    api: &dyn ScrappaApi,
    input: &A::Input,
    storage: &RunStorage,
) -> Result<RunOutcome, ActorError>
where
    A: Actor + ?Sized,
{
    actor.validate(input)?;

    let response = match actor.call(api, input).await {
        Ok(response) => response,
        Err(ActorError::Upstream(e))
            if e.is_not_found() && actor.not_found_policy() == NotFoundPolicy::Record =>
        {
            info!(actor = actor.name(), error = %e, "Target not found (404), recording placeholder");
            let not_found = actor.not_found(input, &e);
            return record_not_found(not_found, storage).await;
        }
        Err(e) => return Err(e),
    };

    if let Inspection::NotFound(not_found) = actor.inspect(input, &response)? {
        info!(actor = actor.name(), "API reported target not found, recording placeholder");
        return record_not_found(not_found, storage).await;
    }

    let items = actor.items(&response);
    if items.is_empty() {
        info!(actor = actor.name(), "No results found for the given input");
    } else {
        storage.push_items(&items).await?;
        info!(actor = actor.name(), count = items.len(), "Pushed results to dataset");
    }

    let summary = actor.summary(input, &response);
    storage.set_value(OUTPUT_KEY, &actor.output(response)).await?;

    info!(actor = actor.name(), summary = %summary, "Actor run completed");

    Ok(RunOutcome::Completed {
        items: items.len(),
        summary,
    })
}

/// Deserialize a JSON input document and run the actor with it.
pub async fn run_with_json<A>(
    actor: &A,
    api: &dyn ScrappaApi,
    input: Value,
    storage: &RunStorage,
) -> Result<RunOutcome, ActorError>
where
    A: Actor + ?Sized,
{
    let input: A::Input = serde_json::from_value(input)
        .map_err(|e| ActorError::InvalidInput(format!("Invalid input: {e}")))?;
    run_actor(actor, api, &input, storage).await
}

async fn record_not_found(
    not_found: NotFound,
    storage: &RunStorage,
) -> Result<RunOutcome, ActorError> {
    storage
        .push_items(std::slice::from_ref(&not_found.item))
        .await?;

    match &not_found.output {
        Some(output) => storage.set_value(OUTPUT_KEY, output).await?,
        None => debug!("Not-found result has no OUTPUT record"),
    }

    Ok(RunOutcome::NotFound {
        record: not_found.item,
    })
}

/// Length of the array at `key`, 0 if absent or not an array.
pub(crate) fn array_len(value: &Value, key: &str) -> usize {
    value.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

/// Clone of the array at `key`, empty if absent or not an array.
pub(crate) fn array_items(value: &Value, key: &str) -> Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Reject a missing or blank required string.
pub(crate) fn require(value: &str, message: &str) -> Result<(), ActorError> {
    if value.trim().is_empty() {
        Err(ActorError::InvalidInput(message.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrappa::UpstreamError;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize)]
    struct LookupInput {
        #[serde(default)]
        id: String,
    }

    struct LookupActor {
        policy: NotFoundPolicy,
    }

    #[async_trait]
    impl Actor for LookupActor {
        type Input = LookupInput;

        fn name(&self) -> &'static str {
            "lookup"
        }

        fn endpoint(&self) -> &'static str {
            "/lookup"
        }

        fn validate(&self, input: &LookupInput) -> Result<(), ActorError> {
            require(&input.id, "ID is required")
        }

        fn params(&self, input: &LookupInput) -> Result<RequestParams, ActorError> {
            Ok(RequestParams::new().with("id", &input.id))
        }

        fn not_found_policy(&self) -> NotFoundPolicy {
            self.policy
        }

        fn not_found(&self, input: &LookupInput, _error: &ScrappaError) -> NotFound {
            NotFound {
                item: json!({ "success": false, "id": input.id, "error": "Not found" }),
                output: Some(json!({ "data": [], "error": "Not found" })),
            }
        }

        fn items(&self, response: &Value) -> Vec<Value> {
            array_items(response, "data")
        }

        fn summary(&self, input: &LookupInput, response: &Value) -> Value {
            json!({ "id": input.id, "found": array_len(response, "data") })
        }
    }

    struct ScriptedApi {
        calls: AtomicUsize,
        status: Option<u16>,
        body: Value,
    }

    impl ScriptedApi {
        fn ok(body: Value) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status: None,
                body,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status: Some(status),
                body: Value::Null,
            }
        }
    }

    #[async_trait]
    impl ScrappaApi for ScriptedApi {
        async fn get_json(&self, _endpoint: &str, _params: &RequestParams) -> scrappa::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                Some(status) => Err(UpstreamError::new(status, "Not found").into()),
                None => Ok(self.body.clone()),
            }
        }
    }

    async fn storage() -> (tempfile::TempDir, RunStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = RunStorage::open(dir.path()).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_completed_run_persists_items_and_output() {
        let (_dir, storage) = storage().await;
        let api = ScriptedApi::ok(json!({ "data": [{ "n": 1 }, { "n": 2 }] }));
        let actor = LookupActor {
            policy: NotFoundPolicy::Propagate,
        };

        let outcome = run_with_json(&actor, &api, json!({ "id": "abc" }), &storage)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed {
                items: 2,
                summary: json!({ "id": "abc", "found": 2 }),
            }
        );
        assert_eq!(storage.dataset_items().await.unwrap().len(), 2);
        assert_eq!(
            storage.get_value(OUTPUT_KEY).await.unwrap(),
            Some(json!({ "data": [{ "n": 1 }, { "n": 2 }] }))
        );
    }

    #[tokio::test]
    async fn test_empty_results_still_store_output() {
        let (_dir, storage) = storage().await;
        let api = ScriptedApi::ok(json!({ "data": [] }));
        let actor = LookupActor {
            policy: NotFoundPolicy::Propagate,
        };

        let outcome = run_with_json(&actor, &api, json!({ "id": "abc" }), &storage)
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Completed { items: 0, .. }));
        assert!(storage.dataset_items().await.unwrap().is_empty());
        assert!(storage.get_value(OUTPUT_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_call() {
        let (_dir, storage) = storage().await;
        let api = ScriptedApi::ok(json!({}));
        let actor = LookupActor {
            policy: NotFoundPolicy::Propagate,
        };

        let err = run_with_json(&actor, &api, json!({}), &storage)
            .await
            .unwrap_err();

        assert!(matches!(err, ActorError::InvalidInput(ref m) if m == "ID is required"));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_found_recorded_under_record_policy() {
        let (_dir, storage) = storage().await;
        let api = ScriptedApi::failing(404);
        let actor = LookupActor {
            policy: NotFoundPolicy::Record,
        };

        let outcome = run_with_json(&actor, &api, json!({ "id": "gone" }), &storage)
            .await
            .unwrap();

        let expected = json!({ "success": false, "id": "gone", "error": "Not found" });
        assert_eq!(outcome, RunOutcome::NotFound { record: expected.clone() });
        assert_eq!(storage.dataset_items().await.unwrap(), vec![expected]);
        assert_eq!(
            storage.get_value(OUTPUT_KEY).await.unwrap(),
            Some(json!({ "data": [], "error": "Not found" }))
        );
    }

    #[tokio::test]
    async fn test_not_found_propagates_under_propagate_policy() {
        let (_dir, storage) = storage().await;
        let api = ScriptedApi::failing(404);
        let actor = LookupActor {
            policy: NotFoundPolicy::Propagate,
        };

        let err = run_with_json(&actor, &api, json!({ "id": "gone" }), &storage)
            .await
            .unwrap_err();

        assert_eq!(err.upstream().and_then(ScrappaError::status), Some(404));
        assert!(storage.dataset_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_propagate_under_record_policy() {
        let (_dir, storage) = storage().await;
        let api = ScriptedApi::failing(500);
        let actor = LookupActor {
            policy: NotFoundPolicy::Record,
        };

        let err = run_with_json(&actor, &api, json!({ "id": "x" }), &storage)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API error (500): Not found");
    }
}
