//! Plan records emitted by the resolver
//!
//! Steps and options are fully self-describing: rendering them only needs
//! display names for item and skill keys, never another lookup into the
//! recipe data.

use serde::{Deserialize, Serialize};

use crate::core::types::{EquipmentKey, ItemKey, Level, RecipeKey, SkillKey};

/// One intermediate (or final) craft performed by an option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftSummary {
    pub recipe_key: RecipeKey,
    pub recipe_name: String,
    /// Skill the producing recipe belongs to
    pub skill: SkillKey,
    pub crafts: u64,
    /// Items produced across all crafts
    pub outputs: Vec<(ItemKey, u64)>,
    /// Expected XP credited to the step's skill (zero for other skills)
    pub expected_xp: f64,
}

/// A feeder skill that is under-leveled for an intermediate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrereqGap {
    pub skill: SkillKey,
    pub required_level: Level,
    pub item: ItemKey,
    pub deficit: Level,
}

/// A scored, fully expanded candidate action for one plan step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStepOption {
    pub recipe_key: RecipeKey,
    pub recipe_name: String,
    pub equipment: Option<EquipmentKey>,
    pub crafts: u64,
    /// Expected XP per craft of the recipe (including same-skill sub-crafts)
    pub xp_per_craft: f64,
    /// Expected XP of the whole option at `crafts`
    pub total_xp: f64,
    /// Success chance of one attempt at the step's level
    pub success_chance: f64,
    /// Rarity-weighted burden of the direct inputs at `crafts`
    pub material_burden: f64,
    /// Flattened base materials to gather, sorted by key
    pub materials: Vec<(ItemKey, u64)>,
    /// Indented expansion trace
    pub trace: Vec<String>,
    /// Every craft performed, innermost first, the recipe itself last
    pub craft_plan: Vec<CraftSummary>,
    pub prereq_gaps: Vec<PrereqGap>,
}

impl PlanStepOption {
    /// The expansion trace as one block of text
    pub fn materials_tree(&self) -> String {
        self.trace.join("\n")
    }
}

/// One unit of the emitted plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub skill: SkillKey,
    pub from_level: Level,
    pub to_level: Level,
    /// Ranked options, best first; empty when nothing was feasible
    pub options: Vec<PlanStepOption>,
    pub note: Option<String>,
}

impl PlanStep {
    /// A step carrying only an annotation
    pub fn note_only(skill: impl Into<SkillKey>, level: Level, note: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            from_level: level,
            to_level: level,
            options: Vec::new(),
            note: Some(note.into()),
        }
    }

    pub fn recommended(&self) -> Option<&PlanStepOption> {
        self.options.first()
    }
}
