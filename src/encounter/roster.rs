//! Roster state and turn-order rules
//!
//! The roster owns the ordered sequence of combatants and every mutation
//! that touches it, so the sort and single-active-turn invariants are
//! enforced in one place:
//! - Order is `(initiative desc, tie_breaker desc)` right after a roll;
//!   drag-reorders and edits may perturb it until the next roll.
//! - At most one combatant has the turn flag at any time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::combatant::{Combatant, CombatantKind, FieldPatch, NewCombatant};
use super::dice::roll_d20;

/// Caller confirmation for destructive bulk operations
///
/// `Declined` aborts the operation with no state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Confirmed,
    Declined,
}

impl Confirm {
    /// Build from a client-supplied flag
    pub fn from_flag(confirmed: bool) -> Confirm {
        if confirmed {
            Confirm::Confirmed
        } else {
            Confirm::Declined
        }
    }
}

/// A single update intent for one combatant
///
/// Whether an update re-sorts the roster is decided by the variant, not
/// by inspecting which fields happen to be present: only `SetInitiative`
/// re-sorts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CombatantUpdate {
    /// Hand-correct the initiative value; the order snaps to the new
    /// ranking immediately. The last-rolled tie-breaker still applies.
    SetInitiative { value: i32 },
    /// Apply a hit-point delta. Absent hp counts as 0; the result is
    /// not clamped, so hp may go negative or above max_hp.
    AdjustHp { delta: i32 },
    Rename { name: String },
    SetKind { kind: CombatantKind },
    /// Sparse update of the remaining stat fields; never re-sorts.
    SetFields {
        #[serde(flatten)]
        patch: FieldPatch,
    },
}

/// The ordered collection of all current combatants
#[derive(Debug, Clone, Default)]
pub struct Roster {
    combatants: Vec<Combatant>,
}

impl Roster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a roster from persisted combatants, preserving order
    pub fn from_combatants(combatants: Vec<Combatant>) -> Self {
        Self { combatants }
    }

    /// Current sequence, in turn order
    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Look up a combatant by id
    pub fn get(&self, id: Uuid) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    /// The combatant whose turn it currently is, if any
    pub fn active(&self) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.is_turn)
    }

    /// Add `params.count` combatants to the end of the roster
    ///
    /// Bulk spawns get 1-based numeric name suffixes ("Goblin 1",
    /// "Goblin 2", ...); a single spawn keeps the plain name. No re-sort
    /// happens on add. Returns the created combatants in order.
    pub fn add(&mut self, params: &NewCombatant) -> Vec<Combatant> {
        let count = params.count.max(1);
        let mut created = Vec::with_capacity(count as usize);

        for i in 0..count {
            let name = if count > 1 {
                format!("{} {}", params.name, i + 1)
            } else {
                params.name.clone()
            };
            created.push(Combatant::from_params(params, name));
        }

        self.combatants.extend(created.iter().cloned());
        created
    }

    /// Remove the combatant with the given id; absent ids are a no-op
    ///
    /// Removing the active combatant leaves no one flagged; the next
    /// `next_turn` call restarts from the top of the order.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.combatants.len();
        self.combatants.retain(|c| c.id != id);
        self.combatants.len() != before
    }

    /// Apply a single update intent; absent ids are a no-op
    ///
    /// Returns the updated combatant. `SetInitiative` re-sorts the whole
    /// roster as a side effect; every other intent leaves the order
    /// untouched.
    pub fn update(&mut self, id: Uuid, update: CombatantUpdate) -> Option<Combatant> {
        let combatant = self.combatants.iter_mut().find(|c| c.id == id)?;

        let resort = match update {
            CombatantUpdate::SetInitiative { value } => {
                combatant.initiative = value;
                true
            }
            CombatantUpdate::AdjustHp { delta } => {
                combatant.hp = Some(combatant.hp.unwrap_or(0) + delta);
                false
            }
            CombatantUpdate::Rename { name } => {
                combatant.name = name;
                false
            }
            CombatantUpdate::SetKind { kind } => {
                combatant.kind = kind;
                false
            }
            CombatantUpdate::SetFields { patch } => {
                if let Some(modifier) = patch.initiative_modifier {
                    combatant.initiative_modifier = modifier;
                }
                if let Some(ac) = patch.ac {
                    combatant.ac = ac;
                }
                if let Some(hp) = patch.hp {
                    combatant.hp = Some(hp);
                }
                if let Some(max_hp) = patch.max_hp {
                    combatant.max_hp = Some(max_hp);
                }
                if let Some(attacks) = patch.attacks {
                    combatant.attacks = attacks;
                }
                if let Some(image) = patch.image {
                    combatant.image = Some(image);
                }
                false
            }
        };

        if resort {
            self.sort();
        }
        self.get(id).cloned()
    }

    /// Empty the whole roster; requires explicit confirmation
    pub fn clear_all(&mut self, confirm: Confirm) -> bool {
        if confirm == Confirm::Declined {
            return false;
        }
        self.combatants.clear();
        true
    }

    /// Remove every combatant of one kind; requires explicit confirmation
    pub fn clear_kind(&mut self, kind: CombatantKind, confirm: Confirm) -> bool {
        if confirm == Confirm::Declined {
            return false;
        }
        self.combatants.retain(|c| c.kind != kind);
        true
    }

    /// Replace the roster order with a caller-supplied permutation
    ///
    /// Used by drag-and-drop. Applies only when `order` is exactly a
    /// permutation of the current ids (a stale client cannot drop or
    /// duplicate combatants); otherwise a no-op. No field changes, the
    /// turn flag stays where it was.
    pub fn reorder(&mut self, order: &[Uuid]) -> bool {
        if order.len() != self.combatants.len() {
            return false;
        }

        let index: HashMap<Uuid, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        if index.len() != self.combatants.len() {
            return false;
        }
        if !self.combatants.iter().all(|c| index.contains_key(&c.id)) {
            return false;
        }

        self.combatants.sort_by_key(|c| index[&c.id]);
        true
    }

    /// Roll initiative for the encounter
    ///
    /// Every combatant draws a fresh d20 tie-breaker. Enemies and allies
    /// additionally roll d20 + modifier for initiative; players keep the
    /// value they declared and rely on the tie-breaker alone. Any
    /// in-progress turn pointer is dropped, then the sort rule applies.
    pub fn roll_initiative(&mut self) {
        for c in &mut self.combatants {
            c.tie_breaker = roll_d20();
            if c.kind.rolls_initiative() {
                c.initiative = roll_d20() + c.initiative_modifier;
            }
            c.is_turn = false;
        }
        self.sort();
    }

    /// Advance the turn pointer by one position in current order
    ///
    /// No-op on an empty roster. When no one is flagged (fresh roll, or
    /// the active combatant was removed), the pointer lands on index 0.
    /// Repeated calls cycle through the roster endlessly.
    pub fn next_turn(&mut self) -> Option<&Combatant> {
        if self.combatants.is_empty() {
            return None;
        }

        let current = self.combatants.iter().position(|c| c.is_turn);
        let next = current.map_or(0, |i| (i + 1) % self.combatants.len());

        for (i, c) in self.combatants.iter_mut().enumerate() {
            c.is_turn = i == next;
        }
        self.combatants.get(next)
    }

    /// Descending by initiative, ties broken descending by tie-breaker.
    /// Stable: equal on both keys keeps prior relative order.
    fn sort(&mut self) {
        self.combatants.sort_by(|a, b| {
            b.initiative
                .cmp(&a.initiative)
                .then(b.tie_breaker.cmp(&a.tie_breaker))
        });
    }
}
