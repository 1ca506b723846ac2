#![cfg(feature = "server")]

//! Router tests: seed an on-disk database, then exercise the endpoints
//! through a real Axum router.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

use world_catalog::api::{prepare_database, router, AppState};
use world_catalog::{seed_reference_data, StoragePlan, Store};

/// Seeded database in a temp dir. The dir must outlive the router.
fn seeded_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("world.db");
    let plan = Arc::new(StoragePlan::world().unwrap());

    let mut store = Store::open(&db_path, Arc::clone(&plan)).unwrap();
    store.setup_database().unwrap();
    seed_reference_data(&mut store).unwrap();
    drop(store);

    (dir, router(AppState::new(db_path, plan)))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, serde_json::from_slice(&body).expect("Failed to parse JSON"))
}

fn names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = seeded_app();

    let (status, body) = get_json(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "OK");
}

#[tokio::test]
async fn test_get_states_ascending() {
    let (_dir, app) = seeded_app();

    let (status, body) = get_json(app, "/api/main/get-states").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["California", "Nebraska", "New York"]);
    assert_eq!(body["data"][0]["code"], "CA");
    assert_eq!(body["data"][0]["balance"], 20_000);
}

#[tokio::test]
async fn test_get_states_descending() {
    let (_dir, app) = seeded_app();

    let (status, body) = get_json(app, "/api/main/get-states2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["New York", "Nebraska", "California"]);
}

#[tokio::test]
async fn test_get_cities() {
    let (_dir, app) = seeded_app();

    let (status, body) = get_json(app, "/api/main/get-cities").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        names(&body),
        vec!["Los Angeles", "San Francisco", "New York", "Buffalo", "Utica", "Omaha"]
    );

    let omaha = &body["data"][5];
    assert_eq!(omaha["population"], 485);
    assert_eq!(omaha["region_code"], "NE");
}

#[tokio::test]
async fn test_storage_plan() {
    let (_dir, app) = seeded_app();

    let (status, body) = get_json(app, "/api/main/storage-plan").await;

    assert_eq!(status, StatusCode::OK);
    let settlements = &body["data"]["entities"][1];
    assert_eq!(settlements["entity"], "Settlement");
    assert_eq!(settlements["storage"]["schema"], "world");
    assert_eq!(settlements["storage"]["table"], "settlements");
}

#[tokio::test]
async fn test_missing_database_returns_error_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let db_path: PathBuf = dir.path().join("data").join("absent.db");
    let plan = Arc::new(StoragePlan::world().unwrap());
    let app = router(AppState::new(db_path.clone(), plan));

    let (status, body) = get_json(app, "/api/main/get-states").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    assert_eq!(body["error"], "Listing regions failed");

    // Reads are side-effect free: no directory, no empty database file
    assert!(!db_path.exists());
    assert!(!db_path.parent().unwrap().exists());
}

#[tokio::test]
async fn test_missing_tables_return_error() {
    let dir = tempfile::tempdir().unwrap();
    // Database file exists but was never set up: queries fail with "no such table"
    let db_path: PathBuf = dir.path().join("empty.db");
    let plan = Arc::new(StoragePlan::world().unwrap());
    Store::open(&db_path, Arc::clone(&plan)).unwrap();
    let app = router(AppState::new(db_path, plan));

    let (status, body) = get_json(app, "/api/main/get-cities").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Listing settlements failed");
}

#[tokio::test]
async fn test_prepare_database_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("startup").join("world.db");
    let plan = Arc::new(StoragePlan::world().unwrap());

    let first = prepare_database(db_path.clone(), Arc::clone(&plan)).await.unwrap();
    assert_eq!(first.regions_added, 3);
    assert_eq!(first.settlements_added, 6);

    let second = prepare_database(db_path.clone(), Arc::clone(&plan)).await.unwrap();
    assert!(second.is_noop());

    let app = router(AppState::new(db_path, plan));
    let (status, body) = get_json(app, "/api/main/get-states").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["California", "Nebraska", "New York"]);
}
