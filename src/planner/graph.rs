//! Crafting graph index
//!
//! Built once from the recipe catalog and immutable afterwards:
//! - producer index: item -> recipes producing it, by (difficulty, unlock level)
//! - usage index: item -> number of recipes consuming it
//! - skill index: skill -> recipes of that skill, in catalog order
//!
//! Developer-only recipes are excluded from every index.

use ahash::AHashMap;

use crate::data::recipe::{Recipe, RecipeCatalog};

/// Read-only indices over the non-developer recipes
#[derive(Debug, Clone)]
pub struct CraftingGraph<'a> {
    recipes: &'a RecipeCatalog,
    producers: AHashMap<&'a str, Vec<usize>>,
    usage: AHashMap<&'a str, u32>,
    by_skill: AHashMap<&'a str, Vec<usize>>,
}

impl<'a> CraftingGraph<'a> {
    pub fn build(recipes: &'a RecipeCatalog) -> Self {
        let mut producers: AHashMap<&'a str, Vec<usize>> = AHashMap::new();
        let mut usage: AHashMap<&'a str, u32> = AHashMap::new();
        let mut by_skill: AHashMap<&'a str, Vec<usize>> = AHashMap::new();

        for (idx, recipe) in recipes.all().iter().enumerate() {
            if recipe.dev_only {
                continue;
            }
            by_skill.entry(recipe.skill.as_str()).or_default().push(idx);
            for (item, _) in &recipe.outputs {
                let list = producers.entry(item.as_str()).or_default();
                if !list.contains(&idx) {
                    list.push(idx);
                }
            }
            for (item, _) in &recipe.inputs {
                *usage.entry(item.as_str()).or_insert(0) += 1;
            }
        }

        let all = recipes.all();
        for list in producers.values_mut() {
            // Stable: equal (difficulty, unlock) keep catalog order
            list.sort_by_key(|&idx| (all[idx].difficulty, all[idx].unlock_level));
        }

        Self {
            recipes,
            producers,
            usage,
            by_skill,
        }
    }

    /// Recipes producing `item`, easiest first
    pub fn producers(&self, item: &str) -> impl Iterator<Item = &'a Recipe> + '_ {
        let all = self.recipes.all();
        self.producers
            .get(item)
            .into_iter()
            .flatten()
            .map(move |&idx| &all[idx])
    }

    /// Whether any non-developer recipe produces `item`
    pub fn has_producer(&self, item: &str) -> bool {
        self.producers.contains_key(item)
    }

    /// Number of non-developer recipes consuming `item`
    pub fn usage_count(&self, item: &str) -> u32 {
        self.usage.get(item).copied().unwrap_or(0)
    }

    /// Non-developer recipes of `skill`, in catalog order
    pub fn recipes_for_skill(&self, skill: &str) -> impl Iterator<Item = &'a Recipe> + '_ {
        let all = self.recipes.all();
        self.by_skill
            .get(skill)
            .into_iter()
            .flatten()
            .map(move |&idx| &all[idx])
    }

    /// Recipes that unlock `equipment`: their sole output is the equipment
    /// key, or their key carries the unlock prefix and names the equipment
    pub fn unlockers(&self, equipment: &str, unlock_prefix: &str) -> Vec<&'a Recipe> {
        let mut found: Vec<&'a Recipe> = self
            .recipes
            .all()
            .iter()
            .filter(|r| !r.dev_only)
            .filter(|r| {
                r.sole_output() == Some(equipment)
                    || (!unlock_prefix.is_empty()
                        && r.key.starts_with(unlock_prefix)
                        && r.key.contains(equipment))
            })
            .collect();
        found.sort_by_key(|r| (r.unlock_level, r.difficulty));
        found
    }
}
