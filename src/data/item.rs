//! Item metadata and raw/relic classification

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::ItemKey;

/// Optional per-item metadata
///
/// Items without metadata are treated as ordinary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemMeta {
    /// Display name
    pub name: Option<String>,
    /// Tier (1 = base tier)
    pub tier: Option<u32>,
    /// Item level
    pub item_level: Option<u32>,
    /// Free-form category tags
    pub categories: Vec<String>,
    /// Gatherable raw material
    pub raw: bool,
    /// Relic-grade (rare) material
    pub relic: bool,
}

impl ItemMeta {
    /// Derive the raw/relic flags from the category tags
    pub fn normalized(mut self) -> Self {
        for category in &self.categories {
            let lower = category.to_lowercase();
            if lower.contains("raw") {
                self.raw = true;
            }
            if lower.contains("relic") {
                self.relic = true;
            }
        }
        self
    }
}

/// Lookup over all item metadata
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: BTreeMap<ItemKey, ItemMeta>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<ItemKey>, meta: ItemMeta) {
        self.items.insert(key.into(), meta.normalized());
    }

    pub fn get(&self, key: &str) -> Option<&ItemMeta> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw material by metadata flag or by the `_raw_` naming convention
    pub fn is_raw(&self, key: &str) -> bool {
        if self.items.get(key).map_or(false, |m| m.raw) {
            return true;
        }
        key.to_lowercase().contains("_raw_")
    }

    /// Relic-grade material by metadata flag or by any `relic` in the key
    pub fn is_relic(&self, key: &str) -> bool {
        if self.items.get(key).map_or(false, |m| m.relic) {
            return true;
        }
        key.to_lowercase().contains("relic")
    }
}

impl FromIterator<(ItemKey, ItemMeta)> for ItemCatalog {
    fn from_iter<T: IntoIterator<Item = (ItemKey, ItemMeta)>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for (key, meta) in iter {
            catalog.insert(key, meta);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_derived_from_categories() {
        let meta = ItemMeta {
            categories: vec!["Category.Items.Raw".into(), "Relic.Tier3".into()],
            ..Default::default()
        }
        .normalized();
        assert!(meta.raw);
        assert!(meta.relic);
    }

    #[test]
    fn test_naming_heuristics() {
        let catalog = ItemCatalog::new();
        assert!(catalog.is_raw("item_raw_flax"));
        assert!(catalog.is_raw("item_wood_raw_material"));
        assert!(catalog.is_relic("item_relic_shard"));
        assert!(catalog.is_relic("item_relicshard"));
        assert!(catalog.is_relic("item_amber_Relic"));
        assert!(!catalog.is_raw("item_linen"));
        assert!(!catalog.is_relic("item_linen"));
    }

    #[test]
    fn test_metadata_flags_win() {
        let mut catalog = ItemCatalog::new();
        catalog.insert(
            "item_amber",
            ItemMeta {
                relic: true,
                ..Default::default()
            },
        );
        assert!(catalog.is_relic("item_amber"));
        assert!(!catalog.is_raw("item_amber"));
    }
}
