//! Image endpoints - upload and content-hash serving

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::images::ImagePayloadError;

/// Build the images router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/images", post(upload_image))
        .route("/api/images/{hash}", get(get_image))
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Upload request - base64 bytes or a full data URL
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest {
    data: String,
    mime_type: Option<String>,
}

/// Upload response
#[derive(Debug, Serialize)]
struct UploadResponse {
    hash: String,
}

/// POST /api/images
/// Stores the image and answers its content hash, which combatant and
/// template records carry as their `image` field
async fn upload_image(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Response {
    match state
        .images
        .store_base64(&req.data, req.mime_type.as_deref())
        .await
    {
        Ok(hash) => (StatusCode::CREATED, Json(UploadResponse { hash })).into_response(),
        Err(e @ (ImagePayloadError::InvalidBase64 | ImagePayloadError::InvalidDataUrl)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
        Err(ImagePayloadError::Db(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
    }
}

/// GET /api/images/{hash}
/// Serves the stored bytes with their original content type
async fn get_image(State(state): State<AppState>, Path(hash): Path<String>) -> Response {
    match state.images.get(&hash).await {
        Ok(Some(image)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, image.mime_type)],
            image.data,
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "image not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
    }
}
