//! Database initialization module
//!
//! Provides one-time database setup functionality for the trackd_init
//! tool.

use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use crate::db::Database;
use crate::store::InventoryStore;

/// Initialize a new tracker database
///
/// # Arguments
/// * `path` - Path to the SQLite database file (must not exist)
/// * `seed` - Whether to install the stock categories and enemy presets
///
/// # Errors
/// * Database file already exists
/// * Database creation fails
pub async fn init_database(path: &Path, seed: bool) -> Result<()> {
    // Fail if database already exists
    if path.exists() {
        bail!(
            "Database file already exists: {}. Remove it first or use a different path.",
            path.display()
        );
    }

    let Some(path_str) = path.to_str() else {
        bail!("Database path is not valid UTF-8: {}", path.display());
    };

    info!("Creating new database at {}", path.display());

    // Create the database (runs migrations)
    let db = Database::new(Some(path_str)).await?;

    if seed {
        let inventory = InventoryStore::new(db.pool().clone());
        inventory.seed_defaults().await?;
        let templates = inventory.list_templates(None).await?;
        info!("Seeded {} stock templates", templates.len());
    }

    info!("Database initialization complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_and_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db");

        init_database(&path, true).await.unwrap();
        assert!(path.exists());

        let db = Database::new(Some(path.to_str().unwrap())).await.unwrap();
        let count: (i32,) = sqlx::query_as("SELECT COUNT(*) FROM templates")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 4);
    }

    #[tokio::test]
    async fn test_init_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db");
        std::fs::write(&path, b"").unwrap();

        assert!(init_database(&path, true).await.is_err());
    }
}
