//! Encounter service - shared roster state with persistence
//!
//! Owns the roster behind a single lock; every public operation runs to
//! completion against the in-memory state, then writes the result back
//! to storage. Persistence is fire-and-forget: a failed write is logged
//! and neither retried nor rolled back, so the worst case is a stale
//! stored roster.

use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::combatant::{Combatant, CombatantKind, NewCombatant};
use super::roster::{CombatantUpdate, Confirm, Roster};
use crate::store::RosterStore;

/// Shared encounter state for the daemon
pub struct EncounterService {
    roster: RwLock<Roster>,
    store: RosterStore,
}

impl EncounterService {
    /// Load the persisted roster and wrap it for shared use
    pub async fn load(store: RosterStore) -> Self {
        let roster = Roster::from_combatants(store.load().await);
        Self {
            roster: RwLock::new(roster),
            store,
        }
    }

    /// Current roster sequence, in turn order
    pub async fn snapshot(&self) -> Vec<Combatant> {
        self.roster.read().await.combatants().to_vec()
    }

    /// Add combatants; returns the created records
    pub async fn add(&self, params: NewCombatant) -> Vec<Combatant> {
        let mut roster = self.roster.write().await;
        let created = roster.add(&params);
        let snapshot = roster.combatants().to_vec();
        drop(roster);

        self.persist(&snapshot).await;
        created
    }

    /// Remove by id; absent ids are a silent no-op
    pub async fn remove(&self, id: Uuid) {
        let mut roster = self.roster.write().await;
        let removed = roster.remove(id);
        let snapshot = roster.combatants().to_vec();
        drop(roster);

        if removed {
            self.persist(&snapshot).await;
        }
    }

    /// Apply one update intent; returns the updated combatant
    pub async fn update(&self, id: Uuid, update: CombatantUpdate) -> Option<Combatant> {
        let mut roster = self.roster.write().await;
        let updated = roster.update(id, update);
        let snapshot = roster.combatants().to_vec();
        drop(roster);

        if updated.is_some() {
            self.persist(&snapshot).await;
        }
        updated
    }

    /// Empty the roster (requires confirmation)
    pub async fn clear_all(&self, confirm: Confirm) -> bool {
        let mut roster = self.roster.write().await;
        let cleared = roster.clear_all(confirm);
        let snapshot = roster.combatants().to_vec();
        drop(roster);

        if cleared {
            self.persist(&snapshot).await;
        }
        cleared
    }

    /// Remove all combatants of one kind (requires confirmation)
    pub async fn clear_kind(&self, kind: CombatantKind, confirm: Confirm) -> bool {
        let mut roster = self.roster.write().await;
        let cleared = roster.clear_kind(kind, confirm);
        let snapshot = roster.combatants().to_vec();
        drop(roster);

        if cleared {
            self.persist(&snapshot).await;
        }
        cleared
    }

    /// Roll initiative for the encounter; returns the sorted roster
    pub async fn roll_initiative(&self) -> Vec<Combatant> {
        let mut roster = self.roster.write().await;
        roster.roll_initiative();
        let snapshot = roster.combatants().to_vec();
        drop(roster);

        self.persist(&snapshot).await;
        snapshot
    }

    /// Advance the turn pointer; returns the now-active combatant
    pub async fn next_turn(&self) -> Option<Combatant> {
        let mut roster = self.roster.write().await;
        let active = roster.next_turn().cloned();
        let snapshot = roster.combatants().to_vec();
        drop(roster);

        if active.is_some() {
            self.persist(&snapshot).await;
        }
        active
    }

    /// Apply a drag-and-drop permutation; false when it does not match
    /// the current roster
    pub async fn reorder(&self, order: &[Uuid]) -> bool {
        let mut roster = self.roster.write().await;
        let applied = roster.reorder(order);
        let snapshot = roster.combatants().to_vec();
        drop(roster);

        if applied {
            self.persist(&snapshot).await;
        }
        applied
    }

    async fn persist(&self, combatants: &[Combatant]) {
        if let Err(e) = self.store.save(combatants).await {
            warn!("Failed to persist roster: {e:#}");
        }
    }
}
