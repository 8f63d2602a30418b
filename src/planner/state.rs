//! Simulation state owned by one planning run
//!
//! Skill levels, XP into the current level, targets and owned equipment are
//! seeded from the profile, mutated step by step by the orchestrator and
//! discarded at the end of the run.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::core::types::{EquipmentKey, Level, SkillKey, XP_EPSILON};
use crate::data::profile::Profile;
use crate::data::xp_table::XpTables;

#[derive(Debug, Clone)]
pub struct SimState {
    levels: BTreeMap<SkillKey, Level>,
    xp: BTreeMap<SkillKey, u64>,
    targets: BTreeMap<SkillKey, Level>,
    owned: BTreeSet<EquipmentKey>,
    default_level: Level,
}

impl SimState {
    /// Seed from a profile, normalizing XP into `[0, requirement)`
    pub fn from_profile(profile: &Profile, tables: &XpTables, default_level: Level) -> Self {
        let mut state = Self {
            levels: BTreeMap::new(),
            xp: BTreeMap::new(),
            targets: BTreeMap::new(),
            owned: profile
                .equipment
                .iter()
                .filter(|(_, e)| e.owned)
                .map(|(k, _)| k.clone())
                .collect(),
            default_level,
        };

        for (skill, progress) in &profile.skills {
            let level = progress.current_level;
            let mut xp = progress.current_xp;
            if level >= progress.target_level {
                xp = 0;
            } else {
                let required = tables.xp_required(skill, level);
                if xp >= required {
                    tracing::warn!(
                        skill = skill.as_str(),
                        xp,
                        required,
                        "profile XP exceeds the level requirement; clamping"
                    );
                    xp = required.saturating_sub(1);
                }
            }
            state.levels.insert(skill.clone(), level);
            state.xp.insert(skill.clone(), xp);
            state.targets.insert(skill.clone(), progress.target_level);
        }
        state
    }

    pub fn level(&self, skill: &str) -> Level {
        self.levels.get(skill).copied().unwrap_or(self.default_level)
    }

    pub fn xp_into_level(&self, skill: &str) -> u64 {
        self.xp.get(skill).copied().unwrap_or(0)
    }

    pub fn target(&self, skill: &str) -> Option<Level> {
        self.targets.get(skill).copied()
    }

    /// Whether the skill has a target it has not reached yet
    pub fn needs_levels(&self, skill: &str) -> bool {
        self.target(skill).map_or(false, |t| self.level(skill) < t)
    }

    pub fn owns(&self, equipment: &str) -> bool {
        self.owned.contains(equipment)
    }

    /// Recipes without equipment are always usable
    pub fn can_use(&self, equipment: Option<&str>) -> bool {
        equipment.map_or(true, |e| self.owns(e))
    }

    /// Mark equipment owned; returns whether it was newly granted
    pub fn grant(&mut self, equipment: &str) -> bool {
        self.owned.insert(equipment.to_string())
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn targets_complete(&self) -> bool {
        self.targets
            .iter()
            .all(|(skill, target)| self.level(skill) >= *target)
    }

    /// Levels still needed across all targets
    pub fn remaining_levels(&self) -> u32 {
        self.targets
            .iter()
            .map(|(skill, target)| target.saturating_sub(self.level(skill)))
            .sum()
    }

    /// Target skills by descending deficit; ties keep key order
    pub fn seed_queue(&self) -> VecDeque<SkillKey> {
        let mut skills: Vec<(&SkillKey, Level)> = self
            .targets
            .iter()
            .map(|(skill, target)| (skill, target.saturating_sub(self.level(skill))))
            .collect();
        skills.sort_by(|a, b| b.1.cmp(&a.1));
        skills.into_iter().map(|(s, _)| s.clone()).collect()
    }

    /// Credit `gained` XP to `skill`: advance exactly one level, then carry
    /// overflow into further levels while it covers a full requirement and
    /// `goal` has not been reached.
    ///
    /// Overflow is only rounded when stored as in-level XP, which stays in
    /// `[0, requirement)`. XP is reset to 0 once `goal` is reached. Returns
    /// the new level.
    pub fn apply_xp(&mut self, skill: &str, gained: f64, goal: Level, tables: &XpTables) -> Level {
        let from = self.level(skill);
        let goal = goal.max(from + 1);
        let needed = tables
            .xp_required(skill, from)
            .saturating_sub(self.xp_into_level(skill)) as f64;
        let mut overflow = (gained - needed).max(0.0);
        let mut level = from + 1;
        let mut xp_into: u64 = 0;

        while overflow > XP_EPSILON && level < goal {
            let required = tables.xp_required(skill, level);
            if overflow + XP_EPSILON >= required as f64 {
                overflow -= required as f64;
                level += 1;
            } else {
                xp_into = (overflow.round() as u64).min(required.saturating_sub(1));
                overflow = 0.0;
            }
        }
        if level >= goal {
            xp_into = 0;
        }

        self.levels.insert(skill.to_string(), level);
        self.xp.insert(skill.to_string(), xp_into);
        level
    }
}
