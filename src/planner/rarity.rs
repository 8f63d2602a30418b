//! Rarity and material-burden heuristics
//!
//! Burden is a ranking tie-breaker, not a price: higher means less desirable.
//! It grows with quantity and with item rarity, and has no other invariant.

use std::collections::BTreeMap;

use crate::core::types::ItemKey;
use crate::data::item::ItemCatalog;
use crate::data::recipe::Recipe;
use crate::planner::graph::CraftingGraph;

/// Floor of the usage-based rarity weight
const MIN_USAGE_WEIGHT: f64 = 0.2;

/// Gatherable leaves count as common
const LEAF_FACTOR: f64 = 0.5;

/// Surcharge per tier above the first
const TIER_SURCHARGE: f64 = 0.25;

/// Item levels are scaled against this divisor
const ITEM_LEVEL_DIVISOR: f64 = 60.0;

const RAW_FACTOR: f64 = 0.6;
const RELIC_FACTOR: f64 = 1.8;

/// Crafting-chain penalty per depth level, capped at `MAX_DEPTH_PENALTY_LEVELS`
const DEPTH_PENALTY: f64 = 0.5;
const MAX_DEPTH_PENALTY_LEVELS: usize = 2;

pub struct RarityScorer<'g, 'a> {
    graph: &'g CraftingGraph<'a>,
    items: &'a ItemCatalog,
}

impl<'g, 'a> RarityScorer<'g, 'a> {
    pub fn new(graph: &'g CraftingGraph<'a>, items: &'a ItemCatalog) -> Self {
        Self { graph, items }
    }

    /// Heuristic rarity of `item` reached at crafting depth `depth`
    pub fn rarity(&self, item: &str, depth: usize) -> f64 {
        let uses = self.graph.usage_count(item) as f64;
        let mut rarity = (1.0 / (1.0 + uses)).max(MIN_USAGE_WEIGHT);

        if !self.graph.has_producer(item) {
            rarity *= LEAF_FACTOR;
        }

        if let Some(meta) = self.items.get(item) {
            if let Some(tier) = meta.tier.filter(|t| *t > 0) {
                rarity *= 1.0 + TIER_SURCHARGE * (tier - 1) as f64;
            }
            if let Some(item_level) = meta.item_level.filter(|l| *l > 0) {
                rarity *= 1.0 + item_level as f64 / ITEM_LEVEL_DIVISOR;
            }
        }

        if self.items.is_raw(item) {
            rarity *= RAW_FACTOR;
        }
        if self.items.is_relic(item) {
            rarity *= RELIC_FACTOR;
        }

        rarity * (1.0 + DEPTH_PENALTY * depth.min(MAX_DEPTH_PENALTY_LEVELS) as f64)
    }

    /// Rarity-weighted burden of `crafts` copies of `recipe`, with the direct
    /// input requirements sorted by item key
    pub fn material_burden(
        &self,
        recipe: &Recipe,
        crafts: u64,
        depth: usize,
    ) -> (f64, Vec<(ItemKey, u64)>) {
        let mut requirements: BTreeMap<ItemKey, u64> = BTreeMap::new();
        let mut score = 0.0;
        for (item, qty) in &recipe.inputs {
            let need = *qty as u64 * crafts;
            *requirements.entry(item.clone()).or_insert(0) += need;
            score += need as f64 * self.rarity(item, depth);
        }
        (score, requirements.into_iter().collect())
    }
}
