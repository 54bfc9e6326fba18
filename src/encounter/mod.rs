//! Encounter tracking module
//!
//! Implements the turn-order core of the tracker:
//! - Combatant records (players, enemies, allies)
//! - Initiative rolling with hidden tie-breakers
//! - Cyclic turn advancement
//! - Manual reordering and initiative edits
//! - Dice notation rolling (e.g., "2d6+3")

mod combatant;
mod dice;
mod roster;
mod service;

pub use combatant::{Combatant, CombatantKind, FieldPatch, NewCombatant};
pub use dice::{parse_dice, roll_d20, DiceRoll};
pub use roster::{CombatantUpdate, Confirm, Roster};
pub use service::EncounterService;
