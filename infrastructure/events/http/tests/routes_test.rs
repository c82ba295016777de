use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Duration as ChronoDuration;
use chrono_tz::America::New_York;
use events_http::{EventHandlers, EventServices, RefreshWorker};
use events_models::Event;
use events_query_handlers::{
    BucketCache, DiscoveryConfig, EventQueryService, PageRefresher, QueueDispatcher,
};
use redis_connection::MemoryStore;
use serde_json::Value;
use test_utils::*;
use tower::ServiceExt;

fn events() -> Vec<Event> {
    let now = local_time(New_York, 2024, 5, 15, 12, 0);
    let mut jazz = event_in(2, "Evening Orchestra", &tampa_bay(), now + ChronoDuration::hours(8));
    jazz.description = "An evening with the Pajazzo orchestra downtown".to_string();
    vec![
        event_in(1, "Sunset Concert", &tampa_bay(), now + ChronoDuration::hours(6)),
        jazz,
    ]
}

fn setup_test_app() -> Router {
    init_tracing();
    let clock = Arc::new(FixedClock::at(local_time(New_York, 2024, 5, 15, 12, 0)));
    let store = Arc::new(InMemoryStore::seeded().with_events(events()));
    let query = Arc::new(EventQueryService::new(
        store.clone(),
        store,
        clock.clone(),
        DiscoveryConfig::default(),
    ));

    let (dispatcher, jobs) = QueueDispatcher::bounded(16);
    let cache = Arc::new(BucketCache::new(
        Arc::new(MemoryStore::default()),
        Arc::new(dispatcher),
        clock,
        Duration::from_secs(3600),
    ));
    RefreshWorker::new(PageRefresher::new(query.clone(), cache.clone()), jobs).start();

    EventHandlers::routes().with_state(EventServices::new(query, cache))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_list_events_for_city() {
    let app = setup_test_app();
    let (status, body) =
        get_json(&app, &format!("/v2/events/?city={TAMPA_BAY}&when=today&price=free")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["id"], 1);
    assert_eq!(body["next"], Value::Null);
    assert!(body.get("search_key").is_none());
}

#[tokio::test]
async fn test_malformed_token_is_bad_request() {
    let app = setup_test_app();
    let (status, body) = get_json(&app, "/v2/events/?when=soon").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_QUERY_PARAMS");
}

#[tokio::test]
async fn test_map_requires_city_and_radius() {
    let app = setup_test_app();
    let (status, body) = get_json(&app, "/v2/events/map/").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "REQUIRED_FIELDS");
    assert_eq!(body["error"]["details"], "city, radius");
}

#[tokio::test]
async fn test_search_reports_search_key() {
    let app = setup_test_app();
    let (status, body) =
        get_json(&app, &format!("/v2/events/search/?city={TAMPA_BAY}&search=jaz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search_key"], "jaz");
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"], 2);
}

#[tokio::test]
async fn test_count_honours_limit() {
    let app = setup_test_app();
    let (_, body) = get_json(&app, &format!("/v2/events/count/?city={TAMPA_BAY}")).await;
    assert_eq!(body["count"], 2);

    let (_, body) =
        get_json(&app, &format!("/v2/events/count/?city={TAMPA_BAY}&limit=1")).await;
    assert_eq!(body["count"], 1);

    let (status, _) = get_json(&app, "/v2/events/count/?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_when_tab_lists_every_bucket() {
    let app = setup_test_app();
    let (status, body) = get_json(&app, &format!("/v2/events/when/?city={TAMPA_BAY}")).await;

    assert_eq!(status, StatusCode::OK);
    let sections = body.as_array().unwrap();
    assert_eq!(sections[0]["bucket"], "now");
    let today = sections.iter().find(|s| s["bucket"] == "today").unwrap();
    assert_eq!(today["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_paginated_page_is_filled_in_by_worker() {
    let app = setup_test_app();
    let uri = format!("/v2/events/when_paginated/?city={TAMPA_BAY}");

    let (status, first) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["count"], 0);
    assert_eq!(first["results"], Value::Array(Vec::new()));

    let mut page = first;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let (_, body) = get_json(&app, &uri).await;
        if body["count"] != 0 {
            page = body;
            break;
        }
    }
    assert_eq!(page["count"], 9);
    assert_eq!(page["results"].as_array().unwrap().len(), 3);
    assert_eq!(page["results"][1]["bucket"], "today");
}

#[tokio::test]
async fn test_repeated_when_keys_are_or_combined() {
    let app = setup_test_app();
    let (status, body) = get_json(
        &app,
        &format!("/v2/events/?city={TAMPA_BAY}&when=tomorrow&when=today"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (_, body) = get_json(
        &app,
        &format!("/v2/events/?city={TAMPA_BAY}&when=tomorrow&when=weekend"),
    )
    .await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_tabs_validate_like_listings() {
    let app = setup_test_app();
    for uri in [
        "/v2/events/when/?limit=0",
        "/v2/events/prices/?map_radius=-1",
        "/v2/events/categories/?limit=0",
        "/v2/events/when_paginated/?map_radius=-5",
    ] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "INVALID_QUERY_PARAMS", "{uri}");
    }
}
