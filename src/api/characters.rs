//! Characters resource - the roster as a CRUD surface

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use super::AppState;
use crate::encounter::{CombatantUpdate, NewCombatant};

/// Build the characters router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/characters",
            get(list_characters).post(create_characters),
        )
        .route(
            "/api/characters/{id}",
            put(update_character).delete(delete_character),
        )
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// GET /api/characters
/// The current roster, in turn order
async fn list_characters(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.encounter.snapshot().await)
}

/// POST /api/characters
/// Add one or more combatants (count > 1 spawns a numbered group)
async fn create_characters(
    State(state): State<AppState>,
    Json(params): Json<NewCombatant>,
) -> impl IntoResponse {
    let created = state.encounter.add(params).await;
    (StatusCode::CREATED, Json(created))
}

/// PUT /api/characters/{id}
/// Apply one tagged update intent; setting initiative re-sorts the roster
async fn update_character(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<CombatantUpdate>,
) -> impl IntoResponse {
    match state.encounter.update(id, update).await {
        Some(combatant) => Json(combatant).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "character not found".to_string(),
            }),
        )
            .into_response(),
    }
}

/// DELETE /api/characters/{id}
/// Removing an absent id is a no-op, so this always answers 204
async fn delete_character(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    state.encounter.remove(id).await;
    StatusCode::NO_CONTENT
}
