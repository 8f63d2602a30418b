//! Aggregate shopping list over the recommended option of every step

use std::collections::BTreeMap;
use std::io;

use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::ItemKey;
use crate::data::game_data::GameData;
use crate::planner::plan::PlanStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    pub item_key: ItemKey,
    pub item_name: String,
    pub qty: u64,
}

/// Base materials of each step's first option, summed and sorted by key
pub fn shopping_list(steps: &[PlanStep], data: &GameData) -> Vec<ShoppingItem> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for option in steps.iter().filter_map(|s| s.options.first()) {
        for (item, qty) in &option.materials {
            *totals.entry(item.as_str()).or_insert(0) += qty;
        }
    }
    totals
        .into_iter()
        .map(|(item, qty)| ShoppingItem {
            item_key: item.to_string(),
            item_name: data.item_label(item),
            qty,
        })
        .collect()
}

/// Write `item_key,item_name,qty` rows
pub fn write_shopping_csv<W: io::Write>(writer: W, items: &[ShoppingItem]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for item in items {
        csv.serialize(item)?;
    }
    if items.is_empty() {
        csv.write_record(["item_key", "item_name", "qty"])?;
    }
    csv.flush()?;
    Ok(())
}
