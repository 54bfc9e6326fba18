//! Storage collaborators - roster persistence and the template inventory

mod inventory;
mod roster;

pub use inventory::{
    Attack, Category, InventoryError, InventoryStore, NewTemplate, Template, TemplatePatch,
};
pub use roster::RosterStore;
