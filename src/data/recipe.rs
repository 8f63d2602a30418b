//! Crafting recipes - the canonical, normalized recipe shape
//!
//! Recipes specify the skill they train, their unlock and difficulty levels,
//! input and output items, and the equipment needed to craft them. Raw file
//! shapes are converted into [`Recipe`] once at load time so the planner never
//! has to guess at field names.

use serde::{Deserialize, Serialize};

use crate::core::error::{PlannerError, Result};
use crate::core::types::{EquipmentKey, ItemKey, Level, RecipeKey, SkillKey};

/// A crafting recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier
    pub key: RecipeKey,
    /// Human-readable name
    pub name: String,
    /// Skill this recipe belongs to
    pub skill: SkillKey,
    /// Skill level at which the recipe becomes available
    pub unlock_level: Level,
    /// Skill level at which the recipe can no longer fail
    pub difficulty: Level,
    /// Multiplier applied to the XP this recipe grants
    pub xp_multiplier: f64,
    /// Input items consumed per craft, in declaration order
    pub inputs: Vec<(ItemKey, u32)>,
    /// Output items produced per craft, in declaration order
    pub outputs: Vec<(ItemKey, u32)>,
    /// Equipment the player must own to craft this
    pub equipment: Option<EquipmentKey>,
    /// Developer-only recipes never take part in planning
    pub dev_only: bool,
    /// Processing conversions grant no skill XP
    pub grants_xp: bool,
}

impl Recipe {
    /// Quantity of `item` produced per craft, if this recipe produces it
    pub fn output_quantity(&self, item: &str) -> Option<u32> {
        self.outputs
            .iter()
            .find(|(key, _)| key == item)
            .map(|(_, qty)| *qty)
    }

    /// The single output item, when the recipe produces exactly one
    pub fn sole_output(&self) -> Option<&str> {
        match self.outputs.as_slice() {
            [(key, _)] => Some(key.as_str()),
            _ => None,
        }
    }

    /// Whether the recipe is available at `level` of its skill
    pub fn is_unlocked_at(&self, level: Level) -> bool {
        level >= self.unlock_level
    }

    /// Level needed before crafting this no longer blocks a dependent recipe
    pub fn mastery_level(&self) -> Level {
        self.unlock_level.max(self.difficulty)
    }
}

/// Catalog of all loaded recipes
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipe to the catalog
    pub fn add(&mut self, recipe: Recipe) {
        self.recipes.push(recipe);
    }

    /// Get a recipe by key
    pub fn get(&self, key: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.key == key)
    }

    /// Get all recipes for a specific skill
    pub fn for_skill<'a>(&'a self, skill: &'a str) -> impl Iterator<Item = &'a Recipe> {
        self.recipes.iter().filter(move |r| r.skill == skill)
    }

    /// Get all recipes
    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Parse recipes from a TOML string holding a `[[recipes]]` array
    pub fn parse_toml(content: &str) -> Result<Self> {
        let file: RecipeFile = toml::from_str(content)?;
        Self::from_raw(file.recipes)
    }

    /// Build a catalog from raw file records, rejecting duplicate keys
    pub(crate) fn from_raw(raw: Vec<RawRecipe>) -> Result<Self> {
        let mut catalog = Self::new();
        let mut seen = ahash::AHashSet::new();
        for record in raw {
            let recipe = record.into_recipe()?;
            if !seen.insert(recipe.key.clone()) {
                return Err(PlannerError::InvalidData(format!(
                    "duplicate recipe key: {}",
                    recipe.key
                )));
            }
            catalog.add(recipe);
        }
        Ok(catalog)
    }
}

/// File representation of a recipes list
#[derive(Debug, Deserialize)]
struct RecipeFile {
    #[serde(default)]
    recipes: Vec<RawRecipe>,
}

/// File representation of a single recipe
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawRecipe {
    key: String,
    #[serde(default)]
    name: Option<String>,
    skill: String,
    #[serde(default)]
    unlock_level: Level,
    #[serde(default)]
    difficulty: Level,
    #[serde(default = "default_multiplier")]
    xp_multiplier: f64,
    #[serde(default)]
    inputs: Vec<RawItemAmount>,
    #[serde(default)]
    outputs: Vec<RawItemAmount>,
    #[serde(default)]
    equipment: Option<String>,
    #[serde(default)]
    dev_only: bool,
    #[serde(default = "default_true")]
    grants_xp: bool,
}

/// File representation of an item amount
#[derive(Debug, Clone, Deserialize)]
struct RawItemAmount {
    item: String,
    quantity: u32,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl RawRecipe {
    fn into_recipe(self) -> Result<Recipe> {
        if self.key.trim().is_empty() {
            return Err(PlannerError::InvalidData("recipe with empty key".into()));
        }
        if self.skill.trim().is_empty() {
            return Err(PlannerError::InvalidData(format!(
                "recipe {} has no skill",
                self.key
            )));
        }
        if !self.xp_multiplier.is_finite() || self.xp_multiplier < 0.0 {
            return Err(PlannerError::InvalidData(format!(
                "recipe {} has invalid xp_multiplier {}",
                self.key, self.xp_multiplier
            )));
        }

        let inputs = normalize_amounts(&self.key, "input", self.inputs)?;
        let outputs = normalize_amounts(&self.key, "output", self.outputs)?;
        let equipment = self.equipment.filter(|e| !e.trim().is_empty());
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.key.clone());

        Ok(Recipe {
            key: self.key,
            name,
            skill: self.skill,
            unlock_level: self.unlock_level,
            difficulty: self.difficulty,
            xp_multiplier: self.xp_multiplier,
            inputs,
            outputs,
            equipment,
            dev_only: self.dev_only,
            grants_xp: self.grants_xp,
        })
    }
}

/// Merge duplicate entries (keeping first position) and drop zero quantities
fn normalize_amounts(
    recipe_key: &str,
    kind: &str,
    raw: Vec<RawItemAmount>,
) -> Result<Vec<(ItemKey, u32)>> {
    let mut out: Vec<(ItemKey, u32)> = Vec::with_capacity(raw.len());
    for amount in raw {
        if amount.item.trim().is_empty() {
            return Err(PlannerError::InvalidData(format!(
                "recipe {} has an {} with an empty item key",
                recipe_key, kind
            )));
        }
        if amount.quantity == 0 {
            tracing::warn!(recipe = recipe_key, item = %amount.item, "dropping zero-quantity {}", kind);
            continue;
        }
        match out.iter_mut().find(|(key, _)| *key == amount.item) {
            Some((_, qty)) => *qty = qty.saturating_add(amount.quantity),
            None => out.push((amount.item, amount.quantity)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_toml_parsing() {
        let toml_content = r#"
[[recipes]]
key = "recipe_iron_ingot"
name = "Iron Ingot"
skill = "skill_smelting"
unlock_level = 2
difficulty = 10
equipment = "crafter_furnace"

[[recipes.inputs]]
item = "item_raw_iron_ore"
quantity = 4

[[recipes.outputs]]
item = "item_iron_ingot"
quantity = 2

[[recipes]]
key = "recipe_plank"
skill = "skill_carpentry"
xp_multiplier = 1.5

[[recipes.inputs]]
item = "item_raw_log"
quantity = 1
"#;

        let catalog = RecipeCatalog::parse_toml(toml_content).expect("Failed to parse TOML");
        assert_eq!(catalog.len(), 2);

        let ingot = catalog.get("recipe_iron_ingot").expect("Should have ingot");
        assert_eq!(ingot.name, "Iron Ingot");
        assert_eq!(ingot.unlock_level, 2);
        assert_eq!(ingot.difficulty, 10);
        assert_eq!(ingot.inputs, vec![("item_raw_iron_ore".to_string(), 4)]);
        assert_eq!(ingot.output_quantity("item_iron_ingot"), Some(2));
        assert_eq!(ingot.equipment.as_deref(), Some("crafter_furnace"));
        assert!(ingot.grants_xp);
        assert!(!ingot.dev_only);

        let plank = catalog.get("recipe_plank").expect("Should have plank");
        assert_eq!(plank.name, "recipe_plank");
        assert!(plank.outputs.is_empty());
        assert!((plank.xp_multiplier - 1.5).abs() < 1e-12);
        assert_eq!(catalog.for_skill("skill_carpentry").count(), 1);
    }

    #[test]
    fn test_duplicate_inputs_merged_and_zero_dropped() {
        let toml_content = r#"
[[recipes]]
key = "recipe_rope"
skill = "skill_tailoring"
inputs = [
    { item = "item_fiber", quantity = 2 },
    { item = "item_resin", quantity = 0 },
    { item = "item_fiber", quantity = 3 },
]
"#;
        let catalog = RecipeCatalog::parse_toml(toml_content).expect("Should parse");
        let rope = catalog.get("recipe_rope").unwrap();
        assert_eq!(rope.inputs, vec![("item_fiber".to_string(), 5)]);
    }

    #[test]
    fn test_duplicate_recipe_key_rejected() {
        let toml_content = r#"
[[recipes]]
key = "recipe_a"
skill = "skill_x"

[[recipes]]
key = "recipe_a"
skill = "skill_x"
"#;
        match RecipeCatalog::parse_toml(toml_content) {
            Err(PlannerError::InvalidData(msg)) => assert!(msg.contains("recipe_a")),
            other => panic!("Expected InvalidData, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_equipment_is_none() {
        let toml_content = r#"
[[recipes]]
key = "recipe_a"
skill = "skill_x"
equipment = ""
"#;
        let catalog = RecipeCatalog::parse_toml(toml_content).unwrap();
        assert!(catalog.get("recipe_a").unwrap().equipment.is_none());
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let toml_content = r#"
[[recipes]]
key = "recipe_a"
skill = "skill_x"
xp_multiplier = -2.0
"#;
        assert!(RecipeCatalog::parse_toml(toml_content).is_err());
    }

    #[test]
    fn test_sole_output_and_mastery() {
        let recipe = Recipe {
            key: "recipe_unlock".into(),
            name: "Build Forge".into(),
            skill: "skill_smithing".into(),
            unlock_level: 8,
            difficulty: 5,
            xp_multiplier: 1.0,
            inputs: vec![],
            outputs: vec![("crafter_forge".into(), 1)],
            equipment: None,
            dev_only: false,
            grants_xp: true,
        };
        assert_eq!(recipe.sole_output(), Some("crafter_forge"));
        assert_eq!(recipe.mastery_level(), 8);
        assert!(recipe.is_unlocked_at(8));
        assert!(!recipe.is_unlocked_at(7));
    }
}
