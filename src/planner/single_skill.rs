//! Single-skill greedy planner
//!
//! A simpler planner for one skill in isolation: no expansion, no feeder
//! skills. Each step picks the recipe with the best expected XP per weighted
//! material cost and crafts it until the next level is reached. Stations are
//! assumed buildable on demand.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::config::PlannerConfig;
use crate::core::error::{PlannerError, Result};
use crate::core::types::{EquipmentKey, ItemKey, Level, SkillKey};
use crate::data::game_data::{parse_by_extension, GameData};
use crate::data::profile::Profile;
use crate::data::recipe::Recipe;
use crate::planner::xp_model::XpModel;

/// Per-item material weights; absent items weigh 1.0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialWeights {
    weights: BTreeMap<ItemKey, f64>,
}

impl MaterialWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load weights from a `.json` or `.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let weights: Self = parse_by_extension(path, &content)?;
        if let Some((item, w)) = weights.weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(PlannerError::InvalidData(format!(
                "material weight for {} must be a non-negative number, got {}",
                item, w
            )));
        }
        Ok(weights)
    }

    pub fn set(&mut self, item: impl Into<ItemKey>, weight: f64) {
        self.weights.insert(item.into(), weight);
    }

    pub fn weight(&self, item: &str) -> f64 {
        self.weights.get(item).copied().unwrap_or(1.0)
    }

    /// Weighted input cost of one craft; a zero total counts as 1.0
    pub fn craft_cost(&self, recipe: &Recipe) -> f64 {
        let total: f64 = recipe
            .inputs
            .iter()
            .map(|(item, qty)| *qty as f64 * self.weight(item))
            .sum();
        if total > 0.0 {
            total
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepAction {
    Craft,
    BuildEquipment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleSkillStep {
    pub action: StepAction,
    /// Recipe key, or equipment key for a build step
    pub key: String,
    pub count: u64,
    pub from_level: Level,
    pub to_level: Level,
    pub xp_gain: f64,
    pub cost: f64,
    pub note: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleSkillTotals {
    pub xp: f64,
    pub cost: f64,
    pub crafts: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleSkillPlan {
    pub skill: SkillKey,
    pub steps: Vec<SingleSkillStep>,
    pub totals: SingleSkillTotals,
}

/// Plan `skill` from its profile level to its target
///
/// Fails with `UnknownSkill` when the profile has no entry for the skill,
/// `MissingXpTable` when the data has no usable table, and
/// `NoFeasibleRecipe` when no XP-granting recipe is usable and no station
/// can be built.
pub fn plan_single_skill(
    data: &GameData,
    profile: &Profile,
    skill: &str,
    weights: &MaterialWeights,
    config: &PlannerConfig,
) -> Result<SingleSkillPlan> {
    let progress = profile
        .skills
        .get(skill)
        .ok_or_else(|| PlannerError::UnknownSkill(skill.to_string()))?;
    if data.xp_tables.table(skill).map_or(true, |t| t.is_empty()) {
        return Err(PlannerError::MissingXpTable(skill.to_string()));
    }

    let model = XpModel::new(profile.premium_account, config);
    let mut owned: BTreeSet<EquipmentKey> = profile
        .equipment
        .iter()
        .filter(|(_, e)| e.owned)
        .map(|(k, _)| k.clone())
        .collect();
    let mut level = progress.current_level;
    let mut xp_into = progress.current_xp;
    let target = progress.target_level;

    let mut steps = Vec::new();
    let mut totals = SingleSkillTotals::default();

    while level < target {
        let feasible: Vec<&Recipe> = data
            .recipes
            .for_skill(skill)
            .filter(|r| !r.dev_only && r.grants_xp && r.is_unlocked_at(level))
            .filter(|r| r.equipment.as_ref().map_or(true, |e| owned.contains(e)))
            .filter(|r| r.inputs.iter().all(|(item, _)| data.materials.is_enabled(item)))
            .collect();

        if feasible.is_empty() {
            let station = data
                .recipes
                .for_skill(skill)
                .filter(|r| !r.dev_only && r.is_unlocked_at(level))
                .filter_map(|r| r.equipment.as_ref())
                .filter(|e| !owned.contains(*e))
                .min()
                .cloned();
            match station {
                Some(station) => {
                    tracing::debug!(skill, equipment = station.as_str(), "build equipment");
                    steps.push(SingleSkillStep {
                        action: StepAction::BuildEquipment,
                        key: station.clone(),
                        count: 1,
                        from_level: level,
                        to_level: level,
                        xp_gain: 0.0,
                        cost: 0.0,
                        note: "Build to unlock better recipes".into(),
                    });
                    owned.insert(station);
                    continue;
                }
                None => return Err(PlannerError::NoFeasibleRecipe {
                    skill: skill.to_string(),
                    level,
                }),
            }
        }

        let mut best: Option<(&Recipe, f64, f64)> = None;
        let mut best_ratio = f64::NEG_INFINITY;
        for recipe in feasible {
            let xp = model.expected_xp(recipe, level);
            if xp <= 0.0 {
                continue;
            }
            let cost = weights.craft_cost(recipe);
            let ratio = xp / cost;
            if ratio > best_ratio {
                best_ratio = ratio;
                best = Some((recipe, xp, cost));
            }
        }
        let (recipe, xp_per, cost_per) = best.ok_or_else(|| PlannerError::NoFeasibleRecipe {
            skill: skill.to_string(),
            level,
        })?;

        let need = data.xp_tables.xp_required(skill, level).saturating_sub(xp_into) as f64;
        let crafts = ((need / xp_per).ceil() as u64).max(1);
        let xp_gain = crafts as f64 * xp_per;
        let cost = crafts as f64 * cost_per;

        let from = level;
        let mut gained = xp_gain;
        while gained > 0.0 && level < target {
            let need = data.xp_tables.xp_required(skill, level).saturating_sub(xp_into) as f64;
            if gained >= need {
                gained -= need;
                level += 1;
                xp_into = 0;
            } else {
                xp_into += gained as u64;
                gained = 0.0;
            }
        }

        steps.push(SingleSkillStep {
            action: StepAction::Craft,
            key: recipe.key.clone(),
            count: crafts,
            from_level: from,
            to_level: level,
            xp_gain,
            cost,
            note: format!(
                "{} | success ~{:.2}, xp/craft ~{:.1}, cost/craft ~{:.1}",
                recipe.name,
                model.success_chance(recipe, from),
                xp_per,
                cost_per
            ),
        });
        totals.xp += xp_gain;
        totals.cost += cost;
        totals.crafts += crafts;
    }

    tracing::info!(skill, steps = steps.len(), crafts = totals.crafts, "single-skill plan ready");
    Ok(SingleSkillPlan {
        skill: skill.to_string(),
        steps,
        totals,
    })
}
