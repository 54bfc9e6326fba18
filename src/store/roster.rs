//! Roster persistence round-trip
//!
//! The roster is loaded once at startup and written back after every
//! mutation. A save rewrites all rows inside one transaction with an
//! explicit position column, since roster order is turn order.

use anyhow::{anyhow, Result};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::encounter::{Combatant, CombatantKind};

/// Roster storage with database backing
#[derive(Clone)]
pub struct RosterStore {
    pool: SqlitePool,
}

impl RosterStore {
    /// Create a new roster store with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the persisted roster, in stored order
    ///
    /// Malformed stored data is discarded: the tracker starts with an
    /// empty roster rather than surfacing an error to the user.
    pub async fn load(&self) -> Vec<Combatant> {
        match self.try_load().await {
            Ok(combatants) => combatants,
            Err(e) => {
                warn!("Discarding stored roster: {e:#}");
                Vec::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Vec<Combatant>> {
        let rows: Vec<CharacterRow> = sqlx::query_as(
            r#"
            SELECT id, name, kind, initiative, initiative_modifier, ac, attacks,
                   tie_breaker, is_turn, image, hp, max_hp
            FROM characters ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_combatant()).collect()
    }

    /// Persist the full roster, replacing whatever was stored
    pub async fn save(&self, combatants: &[Combatant]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM characters").execute(&mut *tx).await?;

        for (position, c) in combatants.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO characters
                    (id, name, kind, initiative, initiative_modifier, ac, attacks,
                     tie_breaker, is_turn, image, hp, max_hp, position)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(c.id.to_string())
            .bind(&c.name)
            .bind(c.kind.as_str())
            .bind(c.initiative)
            .bind(c.initiative_modifier)
            .bind(c.ac)
            .bind(&c.attacks)
            .bind(c.tie_breaker)
            .bind(c.is_turn)
            .bind(&c.image)
            .bind(c.hp)
            .bind(c.max_hp)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Row type for SQLite queries
#[derive(sqlx::FromRow)]
struct CharacterRow {
    id: String,
    name: String,
    kind: String,
    initiative: i32,
    initiative_modifier: i32,
    ac: i32,
    attacks: String,
    tie_breaker: i32,
    is_turn: bool,
    image: Option<String>,
    hp: Option<i32>,
    max_hp: Option<i32>,
}

impl CharacterRow {
    fn into_combatant(self) -> Result<Combatant> {
        let id = Uuid::parse_str(&self.id)?;
        let kind = CombatantKind::from_str(&self.kind)
            .ok_or_else(|| anyhow!("unknown combatant kind: {}", self.kind))?;

        Ok(Combatant {
            id,
            name: self.name,
            kind,
            initiative: self.initiative,
            initiative_modifier: self.initiative_modifier,
            ac: self.ac,
            attacks: self.attacks,
            tie_breaker: self.tie_breaker,
            is_turn: self.is_turn,
            image: self.image,
            hp: self.hp,
            max_hp: self.max_hp,
        })
    }
}
