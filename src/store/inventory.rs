//! Template inventory - reusable combatant presets
//!
//! A read-mostly catalog the tracker UI browses when adding combatants:
//! categories (players/allies/enemies) each holding presets with the
//! stats a combatant is created from. Feeding a template into the roster
//! is indistinguishable from adding from scratch.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::encounter::CombatantKind;

/// Category ids are slugs: lowercase alphanumeric and hyphens,
/// starting and ending alphanumeric
static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap());

/// Inventory operation errors
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("category id must be 2-32 characters, lowercase alphanumeric and hyphens")]
    InvalidSlug,
    #[error("category not found")]
    CategoryNotFound,
    #[error("template not found")]
    TemplateNotFound,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// A named grouping of templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// A reusable combatant preset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub category_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CombatantKind,
    pub ac: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
    pub initiative_modifier: i32,
    pub attacks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub sort_order: i32,
    pub created_at: String,
}

/// Creation parameters for a template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub category_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CombatantKind,
    #[serde(default = "default_ac")]
    pub ac: i32,
    #[serde(default)]
    pub hp: Option<i32>,
    #[serde(default)]
    pub max_hp: Option<i32>,
    #[serde(default)]
    pub initiative_modifier: i32,
    #[serde(default)]
    pub attacks: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Sparse template update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    pub category_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<CombatantKind>,
    pub ac: Option<i32>,
    pub hp: Option<i32>,
    pub max_hp: Option<i32>,
    pub initiative_modifier: Option<i32>,
    pub attacks: Option<String>,
    pub image: Option<String>,
    pub sort_order: Option<i32>,
}

/// Attack entry as carried inside a template's opaque `attacks` JSON
///
/// Structured attack data lives here with the catalog; the encounter
/// engine stores the string untouched and never parses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub name: String,
    /// "melee" | "ranged" | "spell" | "other"
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_hit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Attack {
    fn melee(name: &str, to_hit: &str, damage: &str, damage_type: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: "melee".to_string(),
            to_hit: Some(to_hit.to_string()),
            damage: Some(damage.to_string()),
            damage_type: Some(damage_type.to_string()),
            description: None,
        }
    }

    fn ranged(name: &str, to_hit: &str, damage: &str, damage_type: &str) -> Self {
        Self {
            kind: "ranged".to_string(),
            ..Self::melee(name, to_hit, damage, damage_type)
        }
    }
}

/// Validate a category slug
pub fn validate_slug(id: &str) -> Result<String, InventoryError> {
    let normalized = id.trim().to_lowercase();
    if normalized.len() < 2 || normalized.len() > 32 || normalized.contains("--") {
        return Err(InventoryError::InvalidSlug);
    }
    if !SLUG_REGEX.is_match(&normalized) {
        return Err(InventoryError::InvalidSlug);
    }
    Ok(normalized)
}

/// Template inventory with database backing
#[derive(Clone)]
pub struct InventoryStore {
    pool: SqlitePool,
}

impl InventoryStore {
    /// Create a new inventory store with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all categories in display order
    pub async fn list_categories(&self) -> Result<Vec<Category>, InventoryError> {
        let rows: Vec<(String, String, i32)> =
            sqlx::query_as("SELECT id, name, sort_order FROM categories ORDER BY sort_order, id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, sort_order)| Category {
                id,
                name,
                sort_order,
            })
            .collect())
    }

    /// Create a category with a validated slug id
    pub async fn create_category(
        &self,
        id: &str,
        name: &str,
        sort_order: i32,
    ) -> Result<Category, InventoryError> {
        let id = validate_slug(id)?;

        sqlx::query("INSERT INTO categories (id, name, sort_order) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(sort_order)
            .execute(&self.pool)
            .await?;

        Ok(Category {
            id,
            name: name.to_string(),
            sort_order,
        })
    }

    /// Delete a category; its templates go with it
    pub async fn delete_category(&self, id: &str) -> Result<bool, InventoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List templates, optionally restricted to one category
    ///
    /// Rows with unparseable stored data are discarded with a warning
    /// rather than failing the whole catalog.
    pub async fn list_templates(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<Template>, InventoryError> {
        let rows: Vec<TemplateRow> = match category_id {
            Some(cat) => {
                sqlx::query_as(
                    "SELECT id, category_id, name, kind, ac, hp, max_hp, initiative_modifier, \
                     attacks, image, sort_order, created_at \
                     FROM templates WHERE category_id = ? ORDER BY sort_order, created_at",
                )
                .bind(cat)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, category_id, name, kind, ac, hp, max_hp, initiative_modifier, \
                     attacks, image, sort_order, created_at \
                     FROM templates ORDER BY sort_order, created_at",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .filter_map(|r| match r.into_template() {
                Some(t) => Some(t),
                None => {
                    warn!("Discarding malformed template row");
                    None
                }
            })
            .collect())
    }

    /// Get one template
    pub async fn get_template(&self, id: Uuid) -> Result<Template, InventoryError> {
        let row: Option<TemplateRow> = sqlx::query_as(
            "SELECT id, category_id, name, kind, ac, hp, max_hp, initiative_modifier, \
             attacks, image, sort_order, created_at \
             FROM templates WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.and_then(|r| r.into_template())
            .ok_or(InventoryError::TemplateNotFound)
    }

    /// Create a template under an existing category
    pub async fn create_template(&self, new: NewTemplate) -> Result<Template, InventoryError> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM categories WHERE id = ?")
            .bind(&new.category_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(InventoryError::CategoryNotFound);
        }

        let template = Template {
            id: Uuid::new_v4(),
            category_id: new.category_id,
            name: new.name,
            kind: new.kind,
            ac: new.ac,
            hp: new.hp,
            max_hp: new.max_hp.or(new.hp),
            initiative_modifier: new.initiative_modifier,
            attacks: new.attacks,
            image: new.image,
            sort_order: new.sort_order,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.insert_template(&template).await?;
        Ok(template)
    }

    /// Merge a sparse patch into an existing template
    pub async fn update_template(
        &self,
        id: Uuid,
        patch: TemplatePatch,
    ) -> Result<Template, InventoryError> {
        let mut template = self.get_template(id).await?;

        if let Some(category_id) = patch.category_id {
            template.category_id = category_id;
        }
        if let Some(name) = patch.name {
            template.name = name;
        }
        if let Some(kind) = patch.kind {
            template.kind = kind;
        }
        if let Some(ac) = patch.ac {
            template.ac = ac;
        }
        if let Some(hp) = patch.hp {
            template.hp = Some(hp);
        }
        if let Some(max_hp) = patch.max_hp {
            template.max_hp = Some(max_hp);
        }
        if let Some(modifier) = patch.initiative_modifier {
            template.initiative_modifier = modifier;
        }
        if let Some(attacks) = patch.attacks {
            template.attacks = attacks;
        }
        if let Some(image) = patch.image {
            template.image = Some(image);
        }
        if let Some(sort_order) = patch.sort_order {
            template.sort_order = sort_order;
        }

        sqlx::query(
            "UPDATE templates SET category_id = ?, name = ?, kind = ?, ac = ?, hp = ?, \
             max_hp = ?, initiative_modifier = ?, attacks = ?, image = ?, sort_order = ? \
             WHERE id = ?",
        )
        .bind(&template.category_id)
        .bind(&template.name)
        .bind(template.kind.as_str())
        .bind(template.ac)
        .bind(template.hp)
        .bind(template.max_hp)
        .bind(template.initiative_modifier)
        .bind(&template.attacks)
        .bind(&template.image)
        .bind(template.sort_order)
        .bind(template.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(template)
    }

    /// Delete a template
    pub async fn delete_template(&self, id: Uuid) -> Result<bool, InventoryError> {
        let result = sqlx::query("DELETE FROM templates WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Install the stock categories and enemy presets when the catalog
    /// is empty. Idempotent; an existing catalog is never touched.
    pub async fn seed_defaults(&self) -> Result<(), InventoryError> {
        if self.list_categories().await?.is_empty() {
            info!("Seeding default categories");
            self.create_category("players", "Players", 1).await?;
            self.create_category("allies", "Allies", 2).await?;
            self.create_category("enemies", "Enemies", 3).await?;
        }

        if self.list_templates(None).await?.is_empty() {
            info!("Seeding stock enemy templates");
            for (order, (name, ac, hp, attacks)) in stock_enemies().into_iter().enumerate() {
                let new = NewTemplate {
                    category_id: "enemies".to_string(),
                    name: name.to_string(),
                    kind: CombatantKind::Enemy,
                    ac,
                    hp: Some(hp),
                    max_hp: Some(hp),
                    initiative_modifier: 0,
                    attacks: serde_json::to_string(&attacks)
                        .expect("stock attack list serializes"),
                    image: None,
                    sort_order: order as i32 + 1,
                };
                self.create_template(new).await?;
            }
        }

        Ok(())
    }

    async fn insert_template(&self, t: &Template) -> Result<(), InventoryError> {
        sqlx::query(
            "INSERT INTO templates \
             (id, category_id, name, kind, ac, hp, max_hp, initiative_modifier, \
              attacks, image, sort_order, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(t.id.to_string())
        .bind(&t.category_id)
        .bind(&t.name)
        .bind(t.kind.as_str())
        .bind(t.ac)
        .bind(t.hp)
        .bind(t.max_hp)
        .bind(t.initiative_modifier)
        .bind(&t.attacks)
        .bind(&t.image)
        .bind(t.sort_order)
        .bind(&t.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// The stock low-level enemies every fresh catalog starts with
fn stock_enemies() -> Vec<(&'static str, i32, i32, Vec<Attack>)> {
    vec![
        (
            "Bandit",
            12,
            11,
            vec![
                Attack::melee("Scimitar", "+3", "1d6+1", "slashing"),
                Attack::ranged("Light Crossbow", "+3", "1d8", "piercing"),
            ],
        ),
        (
            "Skeleton",
            13,
            13,
            vec![
                Attack::melee("Shortsword", "+4", "1d6+2", "piercing"),
                Attack::ranged("Shortbow", "+4", "1d6+2", "piercing"),
            ],
        ),
        (
            "Guard",
            16,
            11,
            vec![Attack::melee("Spear", "+3", "1d6+1", "piercing")],
        ),
        (
            "Zombie",
            8,
            22,
            vec![Attack::melee("Slam", "+3", "1d6+1", "bludgeoning")],
        ),
    ]
}

/// Row type for SQLite queries
#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: String,
    category_id: String,
    name: String,
    kind: String,
    ac: i32,
    hp: Option<i32>,
    max_hp: Option<i32>,
    initiative_modifier: i32,
    attacks: String,
    image: Option<String>,
    sort_order: i32,
    created_at: String,
}

impl TemplateRow {
    fn into_template(self) -> Option<Template> {
        let id = Uuid::parse_str(&self.id).ok()?;
        let kind = CombatantKind::from_str(&self.kind)?;

        Some(Template {
            id,
            category_id: self.category_id,
            name: self.name,
            kind,
            ac: self.ac,
            hp: self.hp,
            max_hp: self.max_hp,
            initiative_modifier: self.initiative_modifier,
            attacks: self.attacks,
            image: self.image,
            sort_order: self.sort_order,
            created_at: self.created_at,
        })
    }
}

fn default_ac() -> i32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn store() -> InventoryStore {
        let db = Database::new(None).await.unwrap();
        InventoryStore::new(db.pool().clone())
    }

    #[test]
    fn test_slug_validation() {
        assert_eq!(validate_slug("enemies").unwrap(), "enemies");
        assert_eq!(validate_slug("My-Group").unwrap(), "my-group");

        assert!(matches!(validate_slug("a"), Err(InventoryError::InvalidSlug)));
        assert!(matches!(validate_slug("-bad"), Err(InventoryError::InvalidSlug)));
        assert!(matches!(validate_slug("bad-"), Err(InventoryError::InvalidSlug)));
        assert!(matches!(validate_slug("a--b"), Err(InventoryError::InvalidSlug)));
        assert!(matches!(validate_slug("no spaces"), Err(InventoryError::InvalidSlug)));
    }

    #[tokio::test]
    async fn test_seed_defaults_is_idempotent() {
        let store = store().await;

        store.seed_defaults().await.unwrap();
        store.seed_defaults().await.unwrap();

        let categories = store.list_categories().await.unwrap();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0].id, "players");

        let templates = store.list_templates(None).await.unwrap();
        assert_eq!(templates.len(), 4);
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Bandit", "Skeleton", "Guard", "Zombie"]);

        // Stock attacks are valid JSON a client can decode
        let bandit = &templates[0];
        let attacks: Vec<Attack> = serde_json::from_str(&bandit.attacks).unwrap();
        assert_eq!(attacks.len(), 2);
        assert_eq!(attacks[0].name, "Scimitar");
    }

    #[tokio::test]
    async fn test_template_crud() {
        let store = store().await;
        store.create_category("enemies", "Enemies", 1).await.unwrap();

        let created = store
            .create_template(NewTemplate {
                category_id: "enemies".to_string(),
                name: "Cultist".to_string(),
                kind: CombatantKind::Enemy,
                ac: 12,
                hp: Some(9),
                max_hp: None,
                initiative_modifier: 1,
                attacks: String::new(),
                image: None,
                sort_order: 0,
            })
            .await
            .unwrap();

        // max_hp follows hp when unset
        assert_eq!(created.max_hp, Some(9));

        let updated = store
            .update_template(
                created.id,
                TemplatePatch {
                    ac: Some(13),
                    ..TemplatePatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.ac, 13);
        assert_eq!(updated.name, "Cultist");

        assert!(store.delete_template(created.id).await.unwrap());
        assert!(!store.delete_template(created.id).await.unwrap());
        assert!(matches!(
            store.get_template(created.id).await,
            Err(InventoryError::TemplateNotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_template_requires_category() {
        let store = store().await;

        let result = store
            .create_template(NewTemplate {
                category_id: "nowhere".to_string(),
                name: "Ghost".to_string(),
                kind: CombatantKind::Enemy,
                ac: 11,
                hp: None,
                max_hp: None,
                initiative_modifier: 0,
                attacks: String::new(),
                image: None,
                sort_order: 0,
            })
            .await;

        assert!(matches!(result, Err(InventoryError::CategoryNotFound)));
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let store = store().await;
        store.seed_defaults().await.unwrap();

        assert!(store.delete_category("enemies").await.unwrap());
        assert!(store.list_templates(None).await.unwrap().is_empty());
        assert_eq!(store.list_categories().await.unwrap().len(), 2);
    }
}
