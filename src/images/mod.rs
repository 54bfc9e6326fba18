//! Content-addressed image storage
//!
//! Combatant avatars and character-sheet scans are stored by their
//! SHA-256 hash:
//! - Deduplication (same image content = same hash)
//! - Immutable caching (hash never changes)
//! - Portable storage (images live in the SQLite database)
//!
//! Combatant and template records carry only the hash string; the
//! encounter engine treats it as opaque.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::debug;

/// Image data from storage
#[derive(Debug, Clone)]
pub struct ImageData {
    pub hash: String,
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Content-addressed image store
#[derive(Clone)]
pub struct ImageStore {
    pool: SqlitePool,
}

impl ImageStore {
    /// Create a new image store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Compute SHA-256 hash of data
    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    /// Store image bytes, returning the content hash (deduplicated)
    pub async fn store(&self, data: &[u8], mime_type: &str) -> Result<String, sqlx::Error> {
        let hash = Self::compute_hash(data);
        let created_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO image_store (hash, data, mime_type, size_bytes, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(hash) DO UPDATE SET reference_count = reference_count + 1",
        )
        .bind(&hash)
        .bind(data)
        .bind(mime_type)
        .bind(data.len() as i64)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        debug!("Stored image with hash {} ({} bytes)", hash, data.len());
        Ok(hash)
    }

    /// Store a base64 payload (optionally a full `data:` URL)
    pub async fn store_base64(
        &self,
        payload: &str,
        mime_type: Option<&str>,
    ) -> Result<String, ImagePayloadError> {
        let (data, mime) = decode_payload(payload, mime_type)?;
        self.store(&data, &mime).await.map_err(ImagePayloadError::Db)
    }

    /// Get image by hash
    pub async fn get(&self, hash: &str) -> Result<Option<ImageData>, sqlx::Error> {
        let row: Option<(String, Vec<u8>, String)> =
            sqlx::query_as("SELECT hash, data, mime_type FROM image_store WHERE hash = ?")
                .bind(hash)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(hash, data, mime_type)| ImageData {
            hash,
            data,
            mime_type,
        }))
    }
}

/// Errors turning a client image payload into stored bytes
#[derive(Debug, thiserror::Error)]
pub enum ImagePayloadError {
    #[error("invalid base64 image payload")]
    InvalidBase64,
    #[error("invalid data URL")]
    InvalidDataUrl,
    #[error(transparent)]
    Db(sqlx::Error),
}

/// Decode a raw base64 string or a `data:<mime>;base64,<payload>` URL
fn decode_payload(
    payload: &str,
    mime_type: Option<&str>,
) -> Result<(Vec<u8>, String), ImagePayloadError> {
    if let Some(rest) = payload.strip_prefix("data:") {
        let (mime, b64) = rest
            .split_once(";base64,")
            .ok_or(ImagePayloadError::InvalidDataUrl)?;
        let data = BASE64
            .decode(b64.trim())
            .map_err(|_| ImagePayloadError::InvalidBase64)?;
        return Ok((data, mime.to_string()));
    }

    let data = BASE64
        .decode(payload.trim())
        .map_err(|_| ImagePayloadError::InvalidBase64)?;
    Ok((data, mime_type.unwrap_or("image/png").to_string()))
}
