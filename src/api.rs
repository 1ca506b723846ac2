// REST API with Axum
// Read-only endpoints over the seeded catalog. Every request opens its own
// Store on the existing database file for the duration of the query and
// drops it before responding. Reads never create files.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::{SortOrder, Store};
use crate::plan::StoragePlan;
use crate::seed::{seed_reference_data, SeedReport};

/// Create the database file and tables, then seed reference data. Runs on
/// the blocking pool; call before binding the listener.
pub async fn prepare_database(db_path: PathBuf, plan: Arc<StoragePlan>) -> Result<SeedReport> {
    tokio::task::spawn_blocking(move || {
        let mut store = Store::open(&db_path, plan)?;
        store.setup_database()?;
        seed_reference_data(&mut store)
    })
    .await
    .context("Seeding task failed")?
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    plan: Arc<StoragePlan>,
}

impl AppState {
    pub fn new(db_path: PathBuf, plan: Arc<StoragePlan>) -> Self {
        Self {
            db_path: Arc::new(db_path),
            plan,
        }
    }

    /// Run `query` against a store scoped to this call, on the blocking pool.
    async fn with_store<T, F>(&self, query: F) -> Result<T>
    where
        F: FnOnce(&Store) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = Arc::clone(&self.db_path);
        let plan = Arc::clone(&self.plan);

        tokio::task::spawn_blocking(move || {
            let store = Store::open_existing(&path, plan)?;
            query(&store)
        })
        .await
        .context("Query task failed")?
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

fn respond<T: Serialize>(result: Result<T>, what: &str) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))).into_response(),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "{what} failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<T>::failure(format!("{what} failed"))),
            )
                .into_response()
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/main/get-states - Regions ascending by name
async fn get_states(State(state): State<AppState>) -> Response {
    let result = state
        .with_store(|store| store.list_regions(SortOrder::Ascending))
        .await;
    respond(result, "Listing regions")
}

/// GET /api/main/get-states2 - Regions descending by name
async fn get_states_desc(State(state): State<AppState>) -> Response {
    let result = state
        .with_store(|store| store.list_regions(SortOrder::Descending))
        .await;
    respond(result, "Listing regions")
}

/// GET /api/main/get-cities - Settlement summaries
async fn get_cities(State(state): State<AppState>) -> Response {
    let result = state
        .with_store(|store| store.list_settlement_summaries())
        .await;
    respond(result, "Listing settlements")
}

/// GET /api/main/storage-plan - Computed table and column names
async fn get_storage_plan(State(state): State<AppState>) -> Response {
    respond(Ok(state.plan.as_ref().clone()), "Describing storage plan")
}

pub fn router(state: AppState) -> Router {
    let main_routes = Router::new()
        .route("/get-states", get(get_states))
        .route("/get-states2", get(get_states_desc))
        .route("/get-cities", get(get_cities))
        .route("/storage-plan", get(get_storage_plan));

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .nest("/main", main_routes);

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
