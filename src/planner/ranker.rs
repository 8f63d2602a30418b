//! Option ranking for one (skill, level)
//!
//! Candidates are scored by XP per unit of material burden on a single craft,
//! then sized to cover the XP still missing at the level and filtered against
//! material preferences, relic avoidance and cross-skill gap tolerance.

use ordered_float::OrderedFloat;

use crate::core::types::{EquipmentKey, Level};
use crate::data::recipe::Recipe;
use crate::planner::context::PlanningContext;
use crate::planner::expander::{Expander, Expansion};
use crate::planner::plan::{PlanStepOption, PrereqGap};
use crate::planner::state::SimState;

/// Whether options needing an under-leveled feeder skill are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapPolicy {
    /// Reject options whose largest feeder deficit exceeds the tolerance
    Enforce,
    /// Keep them; used when ranking a skill only to unlock equipment
    Ignore,
}

/// Ranked options plus the first missing-equipment signal seen
#[derive(Debug, Clone, Default)]
pub struct RankOutcome {
    pub options: Vec<PlanStepOption>,
    pub missing_equipment: Option<EquipmentKey>,
}

struct Candidate<'a> {
    recipe: &'a Recipe,
    unit_xp: f64,
    unit_burden: f64,
    score: OrderedFloat<f64>,
}

pub struct OptionRanker<'s, 'a> {
    ctx: &'s PlanningContext<'a>,
    state: &'s SimState,
    expander: Expander<'s, 'a>,
}

impl<'s, 'a> OptionRanker<'s, 'a> {
    pub fn new(ctx: &'s PlanningContext<'a>, state: &'s SimState) -> Self {
        Self {
            ctx,
            state,
            expander: Expander::new(ctx, state),
        }
    }

    /// Up to `top_k` options for leveling `skill` at `level`, best first
    pub fn best_options(&self, skill: &str, level: Level, top_k: usize, gaps: GapPolicy) -> RankOutcome {
        let mut outcome = RankOutcome::default();
        let mut candidates = self.candidates(skill, level, &mut outcome.missing_equipment);
        // Stable: equal scores keep catalog order
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        let xp_needed = self.xp_needed(skill, level);

        for candidate in candidates {
            if outcome.options.len() >= top_k {
                break;
            }
            let recipe = candidate.recipe;
            let crafts = ((xp_needed / candidate.unit_xp).ceil() as u64).max(1);
            let full = self.expander.expand(recipe, crafts, skill);

            if let Some(item) = self
                .ctx
                .data
                .materials
                .first_disabled(full.materials.iter().map(|(k, _)| k.as_str()))
            {
                tracing::debug!(recipe = recipe.key.as_str(), item, "rejected: disabled material");
                continue;
            }
            if self.ctx.avoid_relics {
                if let Some((item, _)) = full
                    .materials
                    .iter()
                    .find(|(k, _)| self.ctx.data.items.is_relic(k))
                {
                    tracing::debug!(recipe = recipe.key.as_str(), item = item.as_str(), "rejected: relic material");
                    continue;
                }
            }
            if let Some(equipment) = &full.missing_equipment {
                outcome
                    .missing_equipment
                    .get_or_insert_with(|| equipment.clone());
                continue;
            }

            let prereq_gaps = self.expander.dependency_gaps(recipe, skill);
            if gaps == GapPolicy::Enforce && self.exceeds_tolerance(&prereq_gaps) {
                tracing::debug!(
                    recipe = recipe.key.as_str(),
                    gaps = prereq_gaps.len(),
                    "rejected: feeder skill gap above tolerance"
                );
                continue;
            }

            let option = self.build_option(
                recipe,
                crafts,
                skill,
                level,
                &full,
                candidate.unit_burden * crafts as f64,
                prereq_gaps,
            );
            outcome.options.push(option);
        }

        tracing::debug!(
            skill,
            level,
            options = outcome.options.len(),
            missing = ?outcome.missing_equipment,
            "ranked options"
        );
        outcome
    }

    /// Package an expansion as a plan option
    #[allow(clippy::too_many_arguments)]
    pub fn build_option(
        &self,
        recipe: &'a Recipe,
        crafts: u64,
        skill: &str,
        level: Level,
        expansion: &Expansion<'a>,
        material_burden: f64,
        prereq_gaps: Vec<PrereqGap>,
    ) -> PlanStepOption {
        let model = &self.ctx.xp;
        let total_xp = expansion.xp_for_skill(skill, level, model);
        PlanStepOption {
            recipe_key: recipe.key.clone(),
            recipe_name: recipe.name.clone(),
            equipment: recipe.equipment.clone(),
            crafts,
            xp_per_craft: if crafts > 0 {
                total_xp / crafts as f64
            } else {
                0.0
            },
            total_xp,
            success_chance: model.success_chance(recipe, level),
            material_burden,
            materials: expansion.materials.clone(),
            trace: expansion.trace.clone(),
            craft_plan: expansion.craft_summaries(skill, level, model),
            prereq_gaps,
        }
    }

    /// XP-granting recipes of `skill` usable now, scored on one craft
    fn candidates(
        &self,
        skill: &str,
        level: Level,
        missing: &mut Option<EquipmentKey>,
    ) -> Vec<Candidate<'a>> {
        let scorer = self.ctx.scorer();
        let mut candidates = Vec::new();

        for recipe in self.ctx.graph.recipes_for_skill(skill) {
            if !recipe.grants_xp
                || !self.state.can_use(recipe.equipment.as_deref())
                || !recipe.is_unlocked_at(level)
            {
                continue;
            }
            let unit = self.expander.expand(recipe, 1, skill);
            if let Some(equipment) = unit.missing_equipment {
                tracing::debug!(
                    recipe = recipe.key.as_str(),
                    equipment = equipment.as_str(),
                    "skipped: intermediate needs missing equipment"
                );
                missing.get_or_insert(equipment);
                continue;
            }
            let unit_xp = unit.xp_for_skill(skill, level, &self.ctx.xp);
            if unit_xp <= 0.0 {
                continue;
            }
            let (unit_burden, _) = scorer.material_burden(recipe, 1, 0);
            candidates.push(Candidate {
                recipe,
                unit_xp,
                unit_burden,
                score: OrderedFloat(unit_xp / (1.0 + unit_burden)),
            });
        }
        candidates
    }

    /// XP still missing at `level`; in-level XP only counts at the current level
    fn xp_needed(&self, skill: &str, level: Level) -> f64 {
        let required = self.ctx.xp_tables().xp_required(skill, level);
        let banked = if level == self.state.level(skill) {
            self.state.xp_into_level(skill)
        } else {
            0
        };
        required.saturating_sub(banked) as f64
    }

    fn exceeds_tolerance(&self, gaps: &[PrereqGap]) -> bool {
        match self.ctx.max_cross_skill_gap {
            Some(max) => gaps.iter().any(|g| g.deficit > max),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::core::config::PlannerConfig;
    use crate::data::game_data::GameData;
    use crate::data::item::{ItemCatalog, ItemMeta};
    use crate::data::materials::MaterialPreferences;
    use crate::data::profile::{Profile, SkillProgress};
    use crate::data::xp_table::XpTable;

    fn recipe(key: &str, skill: &str, unlock: Level, difficulty: Level, inputs: &[(&str, u32)], output: &str) -> Recipe {
        Recipe {
            key: key.into(),
            name: key.into(),
            skill: skill.into(),
            unlock_level: unlock,
            difficulty,
            xp_multiplier: 1.0,
            inputs: inputs.iter().map(|(k, q)| (k.to_string(), *q)).collect(),
            outputs: vec![(output.to_string(), 1)],
            equipment: None,
            dev_only: false,
            grants_xp: true,
        }
    }

    fn data() -> GameData {
        let mut skills = BTreeMap::new();
        skills.insert("skill_cooking".to_string(), XpTable::new(vec![500; 30]));
        GameData::from_recipes(
            vec![
                recipe("recipe_stew", "skill_cooking", 1, 6, &[("item_meat", 4), ("item_salt", 2)], "item_stew"),
                recipe("recipe_bread", "skill_cooking", 1, 6, &[("item_flour", 1)], "item_bread"),
                recipe("recipe_feast", "skill_cooking", 1, 6, &[("item_bread", 1), ("item_truffle", 1)], "item_feast"),
                recipe("recipe_cake", "skill_cooking", 8, 12, &[("item_flour", 1)], "item_cake"),
            ],
            skills,
        )
    }

    fn sample_profile() -> Profile {
        let mut profile = Profile::default();
        profile
            .skills
            .insert("skill_cooking".into(), SkillProgress::new(3, 100, 10));
        profile
    }

    #[test]
    fn test_ranked_by_xp_per_burden() {
        let data = data();
        let config = PlannerConfig::default();
        let profile = sample_profile();
        let ctx = PlanningContext::new(&data, &profile, &config);
        let state = SimState::from_profile(&profile, &data.xp_tables, 1);
        let ranker = OptionRanker::new(&ctx, &state);

        let outcome = ranker.best_options("skill_cooking", 3, 3, GapPolicy::Enforce);
        let keys: Vec<_> = outcome.options.iter().map(|o| o.recipe_key.as_str()).collect();
        // Cake is locked; bread has the lightest burden; feast earns bread XP too
        assert_eq!(keys.len(), 3);
        assert!(!keys.contains(&"recipe_cake"));
        assert_eq!(keys[0], "recipe_feast");
        assert!(outcome.missing_equipment.is_none());
    }

    #[test]
    fn test_crafts_cover_missing_xp() {
        let data = data();
        let config = PlannerConfig::default();
        let profile = sample_profile();
        let ctx = PlanningContext::new(&data, &profile, &config);
        let state = SimState::from_profile(&profile, &data.xp_tables, 1);
        let ranker = OptionRanker::new(&ctx, &state);

        for option in ranker.best_options("skill_cooking", 3, 3, GapPolicy::Enforce).options {
            // 400 XP missing at level 3
            assert!(option.total_xp + 1e-6 >= 400.0, "{} short", option.recipe_key);
            let unit = option.total_xp / option.crafts as f64;
            assert!((option.crafts - 1) as f64 * unit < 400.0);
            assert_eq!(option.craft_plan.last().map(|c| c.recipe_key.as_str()), Some(option.recipe_key.as_str()));
        }
    }

    #[test]
    fn test_disabled_material_rejected() {
        let mut prefs = MaterialPreferences::new();
        prefs.set_enabled("item_flour", false);
        let data = data().with_materials(prefs);
        let config = PlannerConfig::default();
        let profile = sample_profile();
        let ctx = PlanningContext::new(&data, &profile, &config);
        let state = SimState::from_profile(&profile, &data.xp_tables, 1);
        let ranker = OptionRanker::new(&ctx, &state);

        let outcome = ranker.best_options("skill_cooking", 3, 3, GapPolicy::Enforce);
        let keys: Vec<_> = outcome.options.iter().map(|o| o.recipe_key.as_str()).collect();
        assert_eq!(keys, vec!["recipe_stew"]);
    }

    #[test]
    fn test_relics_avoided_on_request() {
        let mut items = ItemCatalog::new();
        items.insert(
            "item_truffle",
            ItemMeta {
                relic: true,
                ..Default::default()
            },
        );
        let data = data().with_items(items);
        let config = PlannerConfig::default();
        let mut profile = sample_profile();
        profile.avoid_relics = true;
        let ctx = PlanningContext::new(&data, &profile, &config);
        let state = SimState::from_profile(&profile, &data.xp_tables, 1);
        let ranker = OptionRanker::new(&ctx, &state);

        let outcome = ranker.best_options("skill_cooking", 3, 3, GapPolicy::Enforce);
        assert!(outcome.options.iter().all(|o| o.recipe_key != "recipe_feast"));
        assert_eq!(outcome.options.len(), 2);
    }

    #[test]
    fn test_top_k_limits_options() {
        let data = data();
        let config = PlannerConfig::default();
        let profile = sample_profile();
        let ctx = PlanningContext::new(&data, &profile, &config);
        let state = SimState::from_profile(&profile, &data.xp_tables, 1);
        let ranker = OptionRanker::new(&ctx, &state);
        assert_eq!(ranker.best_options("skill_cooking", 3, 1, GapPolicy::Enforce).options.len(), 1);
        assert!(ranker.best_options("skill_unknown", 3, 3, GapPolicy::Enforce).options.is_empty());
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let data = data();
        let config = PlannerConfig::default();
        let profile = sample_profile();
        let ctx = PlanningContext::new(&data, &profile, &config);
        let state = SimState::from_profile(&profile, &data.xp_tables, 1);
        let ranker = OptionRanker::new(&ctx, &state);
        let first = ranker.best_options("skill_cooking", 3, 3, GapPolicy::Enforce).options;
        let second = ranker.best_options("skill_cooking", 3, 3, GapPolicy::Enforce).options;
        assert_eq!(first, second);
    }
}
