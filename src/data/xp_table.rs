//! Skill XP tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{Level, SkillKey};

/// XP needed to advance from level L to L+1, indexed by L
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XpTable {
    pub xp_to_level: Vec<u64>,
}

impl XpTable {
    pub fn new(xp_to_level: Vec<u64>) -> Self {
        Self { xp_to_level }
    }

    /// Requirement for `level`, or `None` once the table is exhausted
    pub fn required(&self, level: Level) -> Option<u64> {
        self.xp_to_level.get(level as usize).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.xp_to_level.is_empty()
    }
}

/// All skill tables plus the fallback requirement used for missing data
#[derive(Debug, Clone)]
pub struct XpTables {
    tables: BTreeMap<SkillKey, XpTable>,
    fallback: u64,
}

impl XpTables {
    pub fn new(tables: BTreeMap<SkillKey, XpTable>, fallback: u64) -> Self {
        Self {
            tables,
            fallback: fallback.max(1),
        }
    }

    /// Find a table by exact key, then by a case/punctuation-insensitive match
    pub fn table(&self, skill: &str) -> Option<&XpTable> {
        if let Some(table) = self.tables.get(skill) {
            return Some(table);
        }
        let target = normalize_skill_key(skill);
        self.tables
            .iter()
            .find(|(key, _)| normalize_skill_key(key) == target)
            .map(|(_, table)| table)
    }

    /// XP required to advance `skill` from `level` to `level + 1`
    ///
    /// Missing, empty, exhausted or zero entries fall back to the configured
    /// constant so planning can proceed.
    pub fn xp_required(&self, skill: &str, level: Level) -> u64 {
        match self.table(skill).and_then(|t| t.required(level)) {
            Some(xp) if xp > 0 => xp,
            _ => {
                tracing::debug!(skill, level, fallback = self.fallback, "using fallback XP requirement");
                self.fallback
            }
        }
    }

    pub fn fallback(&self) -> u64 {
        self.fallback
    }

    pub fn skills(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|k| k.as_str())
    }

    pub fn set_fallback(&mut self, fallback: u64) {
        self.fallback = fallback.max(1);
    }
}

fn normalize_skill_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> XpTables {
        let mut map = BTreeMap::new();
        map.insert("skill_armor_smithing".to_string(), XpTable::new(vec![100, 200, 300]));
        map.insert("skill_empty".to_string(), XpTable::new(vec![]));
        XpTables::new(map, 1000)
    }

    #[test]
    fn test_required_by_level() {
        let t = tables();
        assert_eq!(t.xp_required("skill_armor_smithing", 0), 100);
        assert_eq!(t.xp_required("skill_armor_smithing", 2), 300);
    }

    #[test]
    fn test_fallback_for_missing_or_exhausted() {
        let t = tables();
        assert_eq!(t.xp_required("skill_armor_smithing", 3), 1000);
        assert_eq!(t.xp_required("skill_empty", 0), 1000);
        assert_eq!(t.xp_required("skill_unknown", 5), 1000);
    }

    #[test]
    fn test_normalized_lookup() {
        let t = tables();
        assert!(t.table("skill_armorsmithing").is_some());
        assert!(t.table("Skill-Armor-Smithing").is_some());
    }
}
