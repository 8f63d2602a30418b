//! Normalized game data bundle and its loading boundary
//!
//! The data file is read once, converted into canonical shapes and validated
//! in a single pass. Everything downstream is read-only.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{humanize_key, EquipmentKey, ItemKey, SkillKey};
use crate::data::item::{ItemCatalog, ItemMeta};
use crate::data::materials::MaterialPreferences;
use crate::data::recipe::{RawRecipe, Recipe, RecipeCatalog};
use crate::data::xp_table::{XpTable, XpTables};

/// Default XP-to-next-level for skills without usable tables
pub const DEFAULT_FALLBACK_XP: u64 = 1000;

/// Metadata of a piece of equipment / crafting station
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentMeta {
    pub name: Option<String>,
    pub tier: u32,
}

/// Everything the planner reads about the game
#[derive(Debug, Clone)]
pub struct GameData {
    pub recipes: RecipeCatalog,
    pub xp_tables: XpTables,
    pub items: ItemCatalog,
    pub equipment: BTreeMap<EquipmentKey, EquipmentMeta>,
    pub names: BTreeMap<String, String>,
    pub materials: MaterialPreferences,
}

/// File representation of the data bundle
#[derive(Debug, Deserialize)]
struct GameDataFile {
    #[serde(default)]
    recipes: Vec<RawRecipe>,
    #[serde(default)]
    skills: BTreeMap<SkillKey, XpTable>,
    #[serde(default)]
    items: BTreeMap<ItemKey, ItemMeta>,
    #[serde(default)]
    equipment: BTreeMap<EquipmentKey, EquipmentMeta>,
    #[serde(default)]
    names: BTreeMap<String, String>,
}

/// Parse `.json` files with serde_json and everything else as TOML
pub(crate) fn parse_by_extension<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(toml::from_str(content)?)
    }
}

impl GameData {
    /// Assemble a bundle from already-normalized parts
    pub fn new(recipes: RecipeCatalog, skills: BTreeMap<SkillKey, XpTable>) -> Self {
        Self {
            recipes,
            xp_tables: XpTables::new(skills, DEFAULT_FALLBACK_XP),
            items: ItemCatalog::new(),
            equipment: BTreeMap::new(),
            names: BTreeMap::new(),
            materials: MaterialPreferences::new(),
        }
    }

    /// Convenience constructor from a plain recipe list
    pub fn from_recipes(recipes: Vec<Recipe>, skills: BTreeMap<SkillKey, XpTable>) -> Self {
        let mut catalog = RecipeCatalog::new();
        for recipe in recipes {
            catalog.add(recipe);
        }
        Self::new(catalog, skills)
    }

    pub fn with_items(mut self, items: ItemCatalog) -> Self {
        self.items = items;
        self
    }

    pub fn with_materials(mut self, materials: MaterialPreferences) -> Self {
        self.materials = materials;
        self
    }

    pub fn with_names(mut self, names: BTreeMap<String, String>) -> Self {
        self.names = names;
        self
    }

    pub fn with_equipment(mut self, equipment: BTreeMap<EquipmentKey, EquipmentMeta>) -> Self {
        self.equipment = equipment;
        self
    }

    pub fn with_fallback_xp(mut self, fallback: u64) -> Self {
        self.xp_tables.set_fallback(fallback);
        self
    }

    /// Load a data bundle from a `.json` or `.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: GameDataFile = parse_by_extension(path, &content)?;
        let data = Self::from_file(file)?;
        tracing::info!(
            path = %path.display(),
            recipes = data.recipes.len(),
            items = data.items.len(),
            "loaded game data"
        );
        Ok(data)
    }

    /// Parse a data bundle from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: GameDataFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    /// Parse a data bundle from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: GameDataFile = serde_json::from_str(content)?;
        Self::from_file(file)
    }

    fn from_file(file: GameDataFile) -> Result<Self> {
        let recipes = RecipeCatalog::from_raw(file.recipes)?;
        let items: ItemCatalog = file.items.into_iter().collect();
        let data = Self::new(recipes, file.skills)
            .with_items(items)
            .with_equipment(file.equipment)
            .with_names(file.names);
        data.report_integrity();
        Ok(data)
    }

    /// Warn about data problems the planner can survive but should not hide
    fn report_integrity(&self) {
        let skills: BTreeSet<&str> = self
            .recipes
            .all()
            .iter()
            .filter(|r| !r.dev_only)
            .map(|r| r.skill.as_str())
            .collect();
        for skill in skills {
            if self.xp_tables.table(skill).map_or(true, |t| t.is_empty()) {
                tracing::warn!(
                    skill,
                    fallback = self.xp_tables.fallback(),
                    "no XP table for skill; planning will use the fallback requirement"
                );
            }
        }
    }

    /// Display name of an item
    pub fn item_label(&self, key: &str) -> String {
        if let Some(name) = self.names.get(key) {
            return name.clone();
        }
        if let Some(name) = self.names.get(&format!("{}_LocalizationNameKey", key)) {
            return name.clone();
        }
        if let Some(name) = self.items.get(key).and_then(|m| m.name.as_ref()) {
            return name.clone();
        }
        key.to_string()
    }

    /// Display name of a skill
    pub fn skill_label(&self, key: &str) -> String {
        self.names
            .get(key)
            .cloned()
            .unwrap_or_else(|| humanize_key(key))
    }

    /// Display name of a piece of equipment
    pub fn equipment_label(&self, key: &str) -> String {
        if let Some(name) = self.equipment.get(key).and_then(|m| m.name.as_ref()) {
            return name.clone();
        }
        self.item_label(key)
    }

    /// Tier of a piece of equipment (0 when unknown)
    pub fn equipment_tier(&self, key: &str) -> u32 {
        self.equipment.get(key).map_or(0, |m| m.tier)
    }
}
