use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use deskio_core::{record, Desk, RecordStore, Ticket, TicketKind};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{
    config::Config,
    files::FileStore,
    server::{self, routes, AppState},
};

async fn app(dir: &tempfile::TempDir) -> (Router, Arc<dyn RecordStore>) {
    let store: Arc<dyn RecordStore> = Arc::new(FileStore::new(dir.path()));
    store.init().await.unwrap();
    let state = AppState::new(Desk::new(store.clone()), &Config::default());
    (server::router(Arc::new(state)), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri).header(CONTENT_TYPE, "application/json");
    let request = request.body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty)).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(&body.to_string())).await
}

#[tokio::test]
async fn incident_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let (app, store) = app(&dir).await;

    let (status, body) = post(&app, "/incident", json!({"affected_user": "alice", "host_name": "PC1", "description": "no boots"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"ticketNumber": "INC000001"}));

    let ticket = store.find_ticket("INC000001").await.unwrap().unwrap();
    assert_eq!(ticket.kind, TicketKind::Incident);
    assert_eq!(ticket.affected_user, "alice");
    assert_eq!(ticket.short_description, "On Site Ticket");

    let (_, body) = post(&app, "/incident", json!({"affected_user": "bob", "host_name": "PC2", "description": "slow"})).await;
    assert_eq!(body["ticketNumber"], "INC000002");
}

#[tokio::test]
async fn service_request() {
    let dir = tempfile::tempdir().unwrap();
    let (app, store) = app(&dir).await;
    post(&app, "/incident", json!({"affected_user": "alice", "host_name": "PC1", "description": "no boots"})).await;

    let form = json!({"request_is_for": "bob", "host_name": "PC2", "short_description": "Mouse", "description": "new mouse"});
    let (status, body) = post(&app, "/service-request", form).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticketNumber"], "REQ000001");
    let ticket = store.find_ticket("REQ000001").await.unwrap().unwrap();
    assert_eq!(ticket.affected_user, "bob");
    assert_eq!(ticket.short_description, "Mouse");
}

#[tokio::test]
async fn rating_acknowledged() {
    let dir = tempfile::tempdir().unwrap();
    let (app, store) = app(&dir).await;
    let (status, body) = post(&app, "/rating", json!({"rating": "happy", "value": 3})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "message": "Thank you for your feedback!"}));
    let ratings = store.all_ratings().await.unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].value, Some(json!(3)));
}

#[tokio::test]
async fn rejected_payloads() {
    let dir = tempfile::tempdir().unwrap();
    let (app, store) = app(&dir).await;

    let (status, body) = post(&app, "/incident", json!({"affected_user": "alice", "description": "no boots"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("host_name"));

    let (status, body) = send(&app, Method::POST, "/incident", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = post(&app, "/rating", json!([1, 2])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/rating", json!({"rating": "happy", "timestamp": "yesterday"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(store.all_tickets().await.unwrap().is_empty());
    assert!(store.all_ratings().await.unwrap().is_empty());
}

#[tokio::test]
async fn dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(&dir).await;

    let (status, body) = send(&app, Method::GET, "/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": routes::NO_RATINGS}));

    for (rating, value, timestamp) in [
        ("happy", 3, "2024-01-10T09:00:00"),
        ("happy", 3, "2024-01-10T10:00:00"),
        ("neutral", 2, "2024-02-01T09:00:00"),
    ] {
        post(&app, "/rating", json!({"rating": rating, "value": value, "timestamp": timestamp})).await;
    }

    let (status, body) = send(&app, Method::GET, "/dashboard?year=2024&month=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["distribution"], json!({"happy": 2, "neutral": 1}));
    assert_eq!(body["options"], json!({"years": [2024], "months": [1, 2]}));

    let (_, body) = send(&app, Method::GET, "/dashboard?from=2024-01-01&to=2024-01-31", None).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["options"]["months"], json!([1, 2]));

    let (_, body) = send(&app, Method::GET, "/dashboard?year=2023", None).await;
    assert_eq!(body, json!({"message": routes::NO_MATCHING_RATINGS}));

    let (status, _) = send(&app, Method::GET, "/dashboard?month=june", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exhausted_sequence_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (app, store) = app(&dir).await;
    let last = Ticket {
        ticket_number: "INC999999".to_string(),
        kind: TicketKind::Incident,
        affected_user: "alice".to_string(),
        host_name: "PC1".to_string(),
        short_description: "On Site Ticket".to_string(),
        description: "no boots".to_string(),
        timestamp: record::now(),
    };
    store.append(&last.into()).await.unwrap();

    let (status, body) = post(&app, "/incident", json!({"affected_user": "bob", "host_name": "PC2", "description": "slow"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("INC"));
    assert_eq!(store.all_tickets().await.unwrap().len(), 1);

    let (status, body) = post(&app, "/service-request", json!({"request_is_for": "bob", "host_name": "PC2", "description": "mouse"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticketNumber"], "REQ000001");
}

#[tokio::test]
async fn storage_failure_is_an_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(&dir).await;
    std::fs::write(dir.path().join("tickets.json"), "{ not a ticket list").unwrap();
    std::fs::write(dir.path().join("ratings.json"), "[1, 2").unwrap();

    let (status, body) = post(&app, "/incident", json!({"affected_user": "alice", "host_name": "PC1", "description": "no boots"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (status, _) = post(&app, "/rating", json!({"rating": "sad", "value": 1})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(&app, Method::GET, "/dashboard", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}
