//! Inventory API - template catalog browsing and editing

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::store::{InventoryError, NewTemplate, TemplatePatch};

/// Build the inventory router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/categories/{id}", axum::routing::delete(delete_category))
        .route("/api/templates", get(list_templates).post(create_template))
        .route(
            "/api/templates/{id}",
            axum::routing::put(update_template).delete(delete_template),
        )
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: InventoryError) -> Response {
    let status = match e {
        InventoryError::InvalidSlug => StatusCode::BAD_REQUEST,
        InventoryError::CategoryNotFound | InventoryError::TemplateNotFound => {
            StatusCode::NOT_FOUND
        }
        InventoryError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> Response {
    match state.inventory.list_categories().await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => error_response(e),
    }
}

/// Category creation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCategoryRequest {
    id: String,
    name: String,
    #[serde(default)]
    sort_order: i32,
}

/// POST /api/categories
async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Response {
    match state
        .inventory
        .create_category(&req.id, &req.name, req.sort_order)
        .await
    {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/categories/{id}
/// Templates in the category are deleted with it
async fn delete_category(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.inventory.delete_category(&id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// Template list filter
#[derive(Debug, Deserialize)]
struct TemplateQuery {
    category: Option<String>,
}

/// GET /api/templates?category=enemies
async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Response {
    match state.inventory.list_templates(query.category.as_deref()).await {
        Ok(templates) => Json(templates).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/templates
async fn create_template(
    State(state): State<AppState>,
    Json(req): Json<NewTemplate>,
) -> Response {
    match state.inventory.create_template(req).await {
        Ok(template) => (StatusCode::CREATED, Json(template)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/templates/{id}
async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TemplatePatch>,
) -> Response {
    match state.inventory.update_template(id, patch).await {
        Ok(template) => Json(template).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/templates/{id}
async fn delete_template(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.inventory.delete_template(id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
