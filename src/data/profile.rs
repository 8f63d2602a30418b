//! Player profile - the caller-supplied starting point of a planning run

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{EquipmentKey, Level, SkillKey};
use crate::data::game_data::parse_by_extension;

/// Current and target progress of one skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillProgress {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_level")]
    pub current_level: Level,
    #[serde(default)]
    pub current_xp: u64,
    pub target_level: Level,
}

impl SkillProgress {
    pub fn new(current_level: Level, current_xp: u64, target_level: Level) -> Self {
        Self {
            name: None,
            current_level,
            current_xp,
            target_level,
        }
    }

    /// Levels still to gain
    pub fn deficit(&self) -> Level {
        self.target_level.saturating_sub(self.current_level)
    }
}

fn default_level() -> Level {
    1
}

/// Ownership of one piece of equipment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentOwnership {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owned: bool,
}

/// Player profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub skills: BTreeMap<SkillKey, SkillProgress>,
    #[serde(default, alias = "crafters")]
    pub equipment: BTreeMap<EquipmentKey, EquipmentOwnership>,
    /// Premium accounts earn a fixed XP multiplier on every craft
    #[serde(default)]
    pub premium_account: bool,
    /// Reject options whose materials include relic-grade items
    #[serde(default)]
    pub avoid_relics: bool,
    /// Largest tolerated feeder-skill level deficit; negative means unlimited
    #[serde(default = "default_max_gap")]
    pub max_cross_skill_gap: i32,
}

fn default_max_gap() -> i32 {
    5
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            skills: BTreeMap::new(),
            equipment: BTreeMap::new(),
            premium_account: false,
            avoid_relics: false,
            max_cross_skill_gap: default_max_gap(),
        }
    }
}

impl Profile {
    /// Load a profile from a `.json` or `.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        parse_by_extension(path, &content)
    }

    /// Whether `equipment` is marked owned
    pub fn owns(&self, equipment: &str) -> bool {
        self.equipment.get(equipment).map_or(false, |e| e.owned)
    }

    /// Display name of a skill, when the profile carries one
    pub fn skill_name(&self, skill: &str) -> Option<&str> {
        self.skills.get(skill).and_then(|s| s.name.as_deref())
    }

    /// Total levels needed across all skills
    pub fn total_deficit(&self) -> u64 {
        self.skills.values().map(|s| s.deficit() as u64).sum()
    }
}
