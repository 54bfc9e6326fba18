//! Encounter operations - rolling, turn advancement, ordering, clears

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::encounter::{parse_dice, CombatantKind, Confirm};

/// Build the encounter router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/encounter/roll", post(roll_initiative))
        .route("/api/encounter/next-turn", post(next_turn))
        .route("/api/encounter/order", put(reorder))
        .route("/api/encounter/clear", post(clear))
        .route("/api/roll", post(roll_notation))
        .route("/api/config/hp-shortcuts", get(hp_shortcuts))
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// POST /api/encounter/roll
/// Re-rolls enemy/ally initiative and every tie-breaker, then sorts
async fn roll_initiative(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.encounter.roll_initiative().await)
}

/// POST /api/encounter/next-turn
/// Advances the turn pointer; answers the now-active combatant,
/// or null when the roster is empty
async fn next_turn(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.encounter.next_turn().await)
}

/// Reorder request - the full id sequence after a drag-and-drop
#[derive(Debug, Deserialize)]
struct ReorderRequest {
    order: Vec<Uuid>,
}

/// PUT /api/encounter/order
/// Applies a drag-and-drop permutation; a stale sequence is rejected so
/// the client can refetch and retry
async fn reorder(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> impl IntoResponse {
    if state.encounter.reorder(&req.order).await {
        Json(state.encounter.snapshot().await).into_response()
    } else {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "order does not match the current roster".to_string(),
            }),
        )
            .into_response()
    }
}

/// Which combatants a clear request targets
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ClearScope {
    All,
    Enemies,
    Allies,
}

/// Clear request - destructive, so the confirmation travels with it
#[derive(Debug, Deserialize)]
struct ClearRequest {
    scope: ClearScope,
    #[serde(default)]
    confirm: bool,
}

/// Clear response
#[derive(Debug, Serialize)]
struct ClearResponse {
    cleared: bool,
}

/// POST /api/encounter/clear
/// An unconfirmed request is the declined path: nothing changes and no
/// error is raised
async fn clear(State(state): State<AppState>, Json(req): Json<ClearRequest>) -> impl IntoResponse {
    let confirm = Confirm::from_flag(req.confirm);
    let cleared = match req.scope {
        ClearScope::All => state.encounter.clear_all(confirm).await,
        ClearScope::Enemies => state.encounter.clear_kind(CombatantKind::Enemy, confirm).await,
        ClearScope::Allies => state.encounter.clear_kind(CombatantKind::Ally, confirm).await,
    };
    Json(ClearResponse { cleared })
}

/// Dice roll request
#[derive(Debug, Deserialize)]
struct RollRequest {
    /// Dice notation, e.g. "2d6+3"
    notation: String,
}

/// Dice roll response
#[derive(Debug, Serialize)]
struct RollResponse {
    notation: String,
    total: i32,
}

/// POST /api/roll
/// Utility roll for attack and damage dice; stored attack strings are
/// never parsed server-side
async fn roll_notation(Json(req): Json<RollRequest>) -> impl IntoResponse {
    match parse_dice(&req.notation) {
        Ok(roll) => Json(RollResponse {
            notation: roll.to_string(),
            total: roll.roll(),
        })
        .into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })).into_response(),
    }
}

/// GET /api/config/hp-shortcuts
/// The configured quick-adjust deltas for hp buttons
async fn hp_shortcuts(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.hp_shortcuts.as_ref().clone())
}
