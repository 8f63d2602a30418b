//! Prerequisite resolution for blocked skills
//!
//! When a skill has no feasible option, or its best option needs a feeder
//! skill that is too low, the resolver proposes one step that unblocks it:
//! - craft an unlock recipe for missing equipment (recursively unlocking the
//!   equipment that recipe needs, or leveling the unlock recipe's skill)
//! - advance a feeder skill by one level
//!
//! The resolver never mutates state; the orchestrator applies the step.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{EquipmentKey, Level, SkillKey};
use crate::data::recipe::Recipe;
use crate::planner::context::PlanningContext;
use crate::planner::expander::Expander;
use crate::planner::plan::{PlanStep, PlanStepOption, PrereqGap};
use crate::planner::ranker::{GapPolicy, OptionRanker};
use crate::planner::state::SimState;

/// A step unblocking a skill
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Advance `step.skill` by one level with the attached options
    Advance(PlanStep),
    /// Craft an unlock recipe once; `equipment` becomes owned
    Unlock {
        step: PlanStep,
        equipment: EquipmentKey,
    },
}

impl Resolution {
    pub fn step(&self) -> &PlanStep {
        match self {
            Resolution::Advance(step) => step,
            Resolution::Unlock { step, .. } => step,
        }
    }
}

pub struct PrerequisiteResolver<'s, 'a> {
    ctx: &'s PlanningContext<'a>,
    state: &'s SimState,
    ranker: OptionRanker<'s, 'a>,
}

impl<'s, 'a> PrerequisiteResolver<'s, 'a> {
    pub fn new(ctx: &'s PlanningContext<'a>, state: &'s SimState) -> Self {
        Self {
            ctx,
            state,
            ranker: OptionRanker::new(ctx, state),
        }
    }

    /// Unblock `skill` at `level`, which has no feasible option
    ///
    /// Tries the reported missing equipment first, then feeder leveling.
    pub fn resolve_missing(&self, skill: &str, level: Level, missing_equipment: Option<&str>) -> Option<Resolution> {
        if let Some(equipment) = missing_equipment {
            if let Some(resolution) = self.unlock_equipment(equipment, &mut BTreeSet::new()) {
                return Some(resolution);
            }
        }
        self.feeder_for(skill, level)
    }

    /// Unblock the best option of `target_skill`, which needs under-leveled
    /// feeder skills
    ///
    /// The gap with the largest deficit is resolved first; ties go to the
    /// first gap found.
    pub fn resolve_gap(&self, option: &PlanStepOption, target_skill: &str) -> Option<Resolution> {
        let gap = option
            .prereq_gaps
            .iter()
            .fold(None::<&PrereqGap>, |best, g| match best {
                Some(b) if b.deficit >= g.deficit => Some(b),
                _ => Some(g),
            })?;

        let current = self.state.level(&gap.skill);
        let ranked = self.ranker.best_options(
            &gap.skill,
            current,
            self.ctx.config.top_k,
            GapPolicy::Enforce,
        );
        if ranked.options.is_empty() {
            tracing::debug!(
                feeder = gap.skill.as_str(),
                level = current,
                "feeder skill has no options; resolving its own prerequisites"
            );
            return self.resolve_missing(&gap.skill, current, ranked.missing_equipment.as_deref());
        }

        let note = format!(
            "Prerequisite: level {} to {} for {} used by {}",
            self.ctx.data.skill_label(&gap.skill),
            gap.required_level,
            self.ctx.data.item_label(&gap.item),
            self.ctx.data.skill_label(target_skill),
        );
        Some(Resolution::Advance(PlanStep {
            skill: gap.skill.clone(),
            from_level: current,
            to_level: gap.required_level.min(current + 1),
            options: ranked.options,
            note: Some(note),
        }))
    }

    /// Make `equipment` owned, or take one step towards it
    ///
    /// `visited` guards against unlock chains that loop back on themselves.
    pub fn unlock_equipment(&self, equipment: &str, visited: &mut BTreeSet<EquipmentKey>) -> Option<Resolution> {
        if self.state.owns(equipment) || !visited.insert(equipment.to_string()) {
            return None;
        }
        let unlockers = self
            .ctx
            .graph
            .unlockers(equipment, &self.ctx.config.unlock_recipe_prefix);
        if unlockers.is_empty() {
            tracing::debug!(equipment, "no recipe unlocks this equipment");
            return None;
        }

        for recipe in unlockers {
            if let Some(station) = recipe.equipment.as_deref().filter(|e| !self.state.owns(e)) {
                if let Some(resolution) = self.unlock_equipment(station, visited) {
                    return Some(resolution);
                }
                continue;
            }

            let skill = recipe.skill.as_str();
            let current = self.state.level(skill);
            if !recipe.is_unlocked_at(current) {
                let ranked = self.ranker.best_options(skill, current, self.ctx.config.top_k, GapPolicy::Ignore);
                if ranked.options.is_empty() {
                    if let Some(next) = ranked.missing_equipment.as_deref() {
                        if let Some(resolution) = self.unlock_equipment(next, visited) {
                            return Some(resolution);
                        }
                    }
                    continue;
                }
                let note = format!(
                    "Level {} to {} to unlock {}",
                    self.ctx.data.skill_label(skill),
                    recipe.unlock_level,
                    self.ctx.data.equipment_label(equipment),
                );
                return Some(Resolution::Advance(PlanStep {
                    skill: skill.to_string(),
                    from_level: current,
                    to_level: current + 1,
                    options: ranked.options,
                    note: Some(note),
                }));
            }

            if let Some(resolution) = self.craft_unlock(recipe, equipment, visited) {
                return Some(resolution);
            }
        }
        None
    }

    fn craft_unlock(
        &self,
        recipe: &'a Recipe,
        equipment: &str,
        visited: &mut BTreeSet<EquipmentKey>,
    ) -> Option<Resolution> {
        let skill = recipe.skill.as_str();
        let current = self.state.level(skill);
        let expansion = Expander::new(self.ctx, self.state).expand(recipe, 1, skill);
        if let Some(station) = expansion.missing_equipment.as_deref() {
            return self.unlock_equipment(station, visited);
        }

        let (burden, _) = self.ctx.scorer().material_burden(recipe, 1, 0);
        let option = self
            .ranker
            .build_option(recipe, 1, skill, current, &expansion, burden, Vec::new());
        let note = format!(
            "Unlock required equipment: {}",
            self.ctx.data.equipment_label(equipment)
        );
        tracing::debug!(equipment, recipe = recipe.key.as_str(), "unlock step proposed");
        Some(Resolution::Unlock {
            step: PlanStep {
                skill: skill.to_string(),
                from_level: current,
                to_level: current,
                options: vec![option],
                note: Some(note),
            },
            equipment: equipment.to_string(),
        })
    }

    /// Advance the cheapest feeder skill whose producers the skill's unlocked
    /// recipes depend on
    ///
    /// A producer of another skill is blocking while that skill is below
    /// `max(unlock, difficulty - 1)`. The smallest deficit with options wins.
    pub fn feeder_for(&self, skill: &str, level: Level) -> Option<Resolution> {
        let mut ranked_cache: BTreeMap<SkillKey, Vec<PlanStepOption>> = BTreeMap::new();
        let mut best: Option<(Level, &'a str, &'a str, Level)> = None;

        for recipe in self.ctx.graph.recipes_for_skill(skill) {
            if !recipe.is_unlocked_at(level) {
                continue;
            }
            for (item, _) in &recipe.inputs {
                for producer in self.ctx.graph.producers(item) {
                    if producer.skill == skill {
                        continue;
                    }
                    let required = producer
                        .unlock_level
                        .max(producer.difficulty.saturating_sub(1));
                    let current = self.state.level(&producer.skill);
                    if required <= current {
                        continue;
                    }
                    let deficit = required - current;
                    if best.map_or(false, |(d, ..)| deficit >= d) {
                        continue;
                    }
                    let options = ranked_cache.entry(producer.skill.clone()).or_insert_with(|| {
                        self.ranker
                            .best_options(&producer.skill, current, self.ctx.config.top_k, GapPolicy::Enforce)
                            .options
                    });
                    if options.is_empty() {
                        continue;
                    }
                    best = Some((deficit, producer.skill.as_str(), item.as_str(), required));
                }
            }
        }

        let (_, feeder, item, required) = best?;
        let options = ranked_cache.remove(feeder).unwrap_or_default();
        let current = self.state.level(feeder);
        let note = format!(
            "Prerequisite: level {} towards {} (needs {}) for {}",
            self.ctx.data.skill_label(feeder),
            self.ctx.data.item_label(item),
            required,
            self.ctx.data.skill_label(skill),
        );
        Some(Resolution::Advance(PlanStep {
            skill: feeder.to_string(),
            from_level: current,
            to_level: current + 1,
            options,
            note: Some(note),
        }))
    }

    /// Unowned equipment used by `skill`'s recipes, by (locked, tier, unlock
    /// level, key)
    pub fn unowned_equipment(&self, skill: &str, level: Level) -> Vec<EquipmentKey> {
        let mut found: Vec<(bool, u32, Level, &'a str)> = Vec::new();
        for recipe in self.ctx.graph.recipes_for_skill(skill) {
            let Some(equipment) = recipe.equipment.as_deref() else {
                continue;
            };
            if self.state.owns(equipment) {
                continue;
            }
            let entry = (
                !recipe.is_unlocked_at(level),
                self.ctx.data.equipment_tier(equipment),
                recipe.unlock_level,
                equipment,
            );
            match found.iter_mut().find(|e| e.3 == equipment) {
                Some(existing) if entry < *existing => *existing = entry,
                Some(_) => {}
                None => found.push(entry),
            }
        }
        found.sort();
        found.into_iter().map(|e| e.3.to_string()).collect()
    }
}
