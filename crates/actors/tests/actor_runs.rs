//! End-to-end actor runs against a mock Scrappa API.

use scrappa::{ClientConfig, ScrappaClient};
use scrappa_actors::{ActorError, ActorKind, RunOutcome, RunStorage, OUTPUT_KEY};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    client: ScrappaClient,
    storage: RunStorage,
    _dir: TempDir,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let config = ClientConfig::new("test-key")
        .unwrap()
        .with_base_url(format!("{}/api", server.uri()))
        .unwrap();
    let client = ScrappaClient::new(config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let storage = RunStorage::open(dir.path()).await.unwrap();

    Harness {
        server,
        client,
        storage,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_maps_search_falls_back_and_persists() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/simple-search"))
        .and(query_param("use_cache", "1"))
        .respond_with(ResponseTemplate::new(504).set_body_string("Gateway Time-out"))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/maps/advanced-search"))
        .and(query_param("zoom", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "name": "Joe's Pizza" }, { "name": "Prince Street Pizza" }]
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = ActorKind::MapsSearch
        .run(
            &h.client,
            json!({ "query": "pizza manhattan", "fallback_zoom": 15 }),
            &h.storage,
        )
        .await
        .unwrap();

    let RunOutcome::Completed { items, summary } = outcome else {
        panic!("expected completed run");
    };
    assert_eq!(items, 2);
    assert_eq!(summary["fallback_used"], "advanced-search");

    let output = h.storage.get_value(OUTPUT_KEY).await.unwrap().unwrap();
    assert_eq!(output["fallback_used"], "advanced-search");
    assert_eq!(h.storage.dataset_items().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_maps_search_validation_error_is_not_retried() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/simple-search"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Validation failed" })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let err = ActorKind::MapsSearch
        .run(&h.client, json!({ "query": "pizza" }), &h.storage)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "API error (422): Validation failed");
    assert!(h.storage.get_value(OUTPUT_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_business_details_404_is_recorded() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/business-details"))
        .and(query_param("business_id", "missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&h.server)
        .await;

    let outcome = ActorKind::MapsBusinessDetails
        .run(&h.client, json!({ "business_id": "missing" }), &h.storage)
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::NotFound { .. }));
    assert_eq!(
        h.storage.dataset_items().await.unwrap(),
        vec![json!({ "success": false, "business_id": "missing", "error": "Business not found" })]
    );
    assert_eq!(
        h.storage.get_value(OUTPUT_KEY).await.unwrap(),
        Some(json!({ "data": [], "error": "Business not found" }))
    );
}

#[tokio::test]
async fn test_autocomplete_404_propagates() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/autocomplete"))
        .respond_with(ResponseTemplate::new(404).set_body_string(""))
        .mount(&h.server)
        .await;

    let err = ActorKind::MapsAutocomplete
        .run(&h.client, json!({ "query": "caf" }), &h.storage)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "API error (404): HTTP 404");
    assert!(h.storage.dataset_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_photos_output_wraps_bare_array() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "photo_id": "a", "photo_url": "https://example.com/a.jpg" },
            { "photo_id": "b", "photo_url": "https://example.com/b.jpg" }
        ])))
        .mount(&h.server)
        .await;

    ActorKind::MapsPhotos
        .run(&h.client, json!({ "business_id": "0x1" }), &h.storage)
        .await
        .unwrap();

    let output = h.storage.get_value(OUTPUT_KEY).await.unwrap().unwrap();
    assert_eq!(output["total"], 2);
    assert_eq!(output["photos"][1]["photo_id"], "b");
}

#[tokio::test]
async fn test_google_search_with_empty_results() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("query", "zzqx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "organic_results": [] })))
        .mount(&h.server)
        .await;

    let outcome = ActorKind::GoogleSearch
        .run(&h.client, json!({ "query": "zzqx" }), &h.storage)
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { items: 0, .. }));
    assert_eq!(
        h.storage.get_value(OUTPUT_KEY).await.unwrap(),
        Some(json!({ "organic_results": [] }))
    );
}

#[tokio::test]
async fn test_linkedin_profile_url_is_normalized() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/linkedin/profile"))
        .and(query_param("url", "https://www.linkedin.com/in/jane-doe"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "name": "Jane Doe", "skills": ["Rust"] })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = ActorKind::LinkedinProfile
        .run(
            &h.client,
            json!({ "url": "https://fr.linkedin.com/in/jane-doe/?originalSubdomain=fr" }),
            &h.storage,
        )
        .await
        .unwrap();

    let RunOutcome::Completed { summary, .. } = outcome else {
        panic!("expected completed run");
    };
    assert_eq!(summary["skills_count"], 1);
    assert_eq!(h.storage.dataset_items().await.unwrap()[0]["name"], "Jane Doe");
}

#[tokio::test]
async fn test_linkedin_company_invalid_url_makes_no_call() {
    let h = harness().await;

    let err = ActorKind::LinkedinCompany
        .run(
            &h.client,
            json!({ "url": "https://www.linkedin.com/in/jane-doe" }),
            &h.storage,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ActorError::InvalidInput(_)));
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_required_field() {
    let h = harness().await;

    let err = ActorKind::MapsAdvancedSearch
        .run(&h.client, json!({ "query": "pizza" }), &h.storage)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Search query and zoom level are required");
}
