//! Data layer - recipes, items, XP tables, profiles and material preferences

pub mod game_data;
pub mod item;
pub mod materials;
pub mod profile;
pub mod recipe;
pub mod xp_table;

pub use game_data::{EquipmentMeta, GameData};
pub use item::{ItemCatalog, ItemMeta};
pub use materials::{MaterialPreference, MaterialPreferences};
pub use profile::{EquipmentOwnership, Profile, SkillProgress};
pub use recipe::{Recipe, RecipeCatalog};
pub use xp_table::{XpTable, XpTables};
