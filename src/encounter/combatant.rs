//! Combatant records and creation parameters

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the encounter a combatant fights on
///
/// Drives the initiative-rolling policy: enemies and allies roll fresh
/// dice every encounter, players keep the value they declared at the
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatantKind {
    Player,
    Enemy,
    Ally,
}

impl CombatantKind {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<CombatantKind> {
        match s.to_lowercase().as_str() {
            "player" | "pc" => Some(CombatantKind::Player),
            "enemy" | "monster" => Some(CombatantKind::Enemy),
            "ally" => Some(CombatantKind::Ally),
            _ => None,
        }
    }

    /// Canonical lowercase name, as stored and serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            CombatantKind::Player => "player",
            CombatantKind::Enemy => "enemy",
            CombatantKind::Ally => "ally",
        }
    }

    /// Whether this kind gets a fresh d20 initiative on every roll
    pub fn rolls_initiative(&self) -> bool {
        matches!(self, CombatantKind::Enemy | CombatantKind::Ally)
    }
}

/// A participant in the tracked encounter
///
/// Serialized in camelCase so the wire and stored shapes match what
/// tracker clients expect (`initiativeModifier`, `tieBreaker`, `isTurn`).
/// `attacks` is an opaque string (typically JSON) that the engine never
/// parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CombatantKind,
    #[serde(default)]
    pub initiative: i32,
    #[serde(default)]
    pub initiative_modifier: i32,
    #[serde(default = "default_ac")]
    pub ac: i32,
    #[serde(default)]
    pub attacks: String,
    /// Hidden secondary sort key, re-rolled on every initiative roll
    #[serde(default)]
    pub tie_breaker: i32,
    #[serde(default)]
    pub is_turn: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
}

/// Parameters for adding combatants to a roster
///
/// Missing numeric inputs take the documented defaults rather than
/// failing: initiative and modifier 0, ac 10, count 1, attacks empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCombatant {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CombatantKind,
    #[serde(default)]
    pub initiative: i32,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub hp: Option<i32>,
    #[serde(default)]
    pub initiative_modifier: i32,
    #[serde(default = "default_ac")]
    pub ac: i32,
    #[serde(default)]
    pub attacks: String,
}

impl NewCombatant {
    /// Minimal parameters with everything else defaulted
    pub fn new(name: &str, kind: CombatantKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            initiative: 0,
            count: 1,
            image: None,
            hp: None,
            initiative_modifier: 0,
            ac: default_ac(),
            attacks: String::new(),
        }
    }

    /// Set a fixed initiative (players pre-declare theirs)
    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    /// Spawn several near-identical combatants at once
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Set hit points (max_hp follows at creation)
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = Some(hp);
        self
    }

    /// Set the initiative roll bonus
    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.initiative_modifier = modifier;
        self
    }
}

impl Combatant {
    /// Materialize one combatant from creation parameters
    ///
    /// `name` is the final display name (the roster applies bulk
    /// suffixing before calling this). Fresh id, zero tie-breaker, not
    /// anyone's turn, max_hp mirrors hp.
    pub fn from_params(params: &NewCombatant, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind: params.kind,
            initiative: params.initiative,
            initiative_modifier: params.initiative_modifier,
            ac: params.ac,
            attacks: params.attacks.clone(),
            tie_breaker: 0,
            is_turn: false,
            image: params.image.clone(),
            hp: params.hp,
            max_hp: params.hp,
        }
    }
}

/// Sparse non-resorting field updates (see `CombatantUpdate::SetFields`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_modifier: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn default_ac() -> i32 {
    10
}

fn default_count() -> u32 {
    1
}
