//! HTTP API module - REST endpoints for the tracker
//!
//! The canonical state source is local persistence; this surface exposes
//! the encounter operations to tracker clients and doubles as the
//! characters CRUD resource a future sync layer would consume.

mod characters;
mod encounter;
mod images;
mod inventory;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::encounter::EncounterService;
use crate::images::ImageStore;
use crate::store::{InventoryStore, RosterStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub encounter: Arc<EncounterService>,
    pub inventory: Arc<InventoryStore>,
    pub images: Arc<ImageStore>,
    pub hp_shortcuts: Arc<Vec<i32>>,
}

/// Build the API router
///
/// Loads the persisted roster into the encounter service, so this runs
/// once at startup.
pub async fn router(db: Arc<Database>, hp_shortcuts: Vec<i32>) -> Router {
    let roster_store = RosterStore::new(db.pool().clone());
    let encounter = Arc::new(EncounterService::load(roster_store).await);
    let inventory = Arc::new(InventoryStore::new(db.pool().clone()));
    let images = Arc::new(ImageStore::new(db.pool().clone()));

    let state = AppState {
        db,
        encounter,
        inventory,
        images,
        hp_shortcuts: Arc::new(hp_shortcuts),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(characters::router())
        .merge(encounter::router())
        .merge(inventory::router())
        .merge(images::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "trackd",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "ok",
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database: "error",
            }),
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}
