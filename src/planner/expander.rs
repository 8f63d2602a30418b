//! Recursive recipe expansion
//!
//! Expands "craft recipe R n times" into the base materials to gather, the
//! intermediate crafts to perform (dependencies first) and an indented
//! human-readable trace. Expansion is evaluated against the simulation state
//! of the moment: producer choice depends on owned equipment and on the
//! current level of the producer's skill.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::core::types::{EquipmentKey, ItemKey, Level};
use crate::data::recipe::Recipe;
use crate::planner::context::PlanningContext;
use crate::planner::plan::{CraftSummary, PrereqGap};
use crate::planner::state::SimState;
use crate::planner::xp_model::XpModel;

/// Producer selected for an intermediate item
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Producer<'a> {
    /// Equipment owned and unlocked at the producer skill's current level
    Ready(&'a Recipe),
    /// No producer is usable right now; the easiest one is used anyway
    Fallback {
        recipe: &'a Recipe,
        /// Set when the fallback's own equipment is not owned
        missing_equipment: Option<&'a str>,
    },
}

impl<'a> Producer<'a> {
    pub fn recipe(&self) -> &'a Recipe {
        match self {
            Producer::Ready(recipe) => recipe,
            Producer::Fallback { recipe, .. } => recipe,
        }
    }

    pub fn missing_equipment(&self) -> Option<&'a str> {
        match self {
            Producer::Ready(_) => None,
            Producer::Fallback {
                missing_equipment, ..
            } => *missing_equipment,
        }
    }
}

/// One craft performed during an expansion
#[derive(Debug, Clone, PartialEq)]
pub struct CraftAction<'a> {
    pub recipe: &'a Recipe,
    pub count: u64,
}

/// Result of expanding a recipe
#[derive(Debug, Clone, Default)]
pub struct Expansion<'a> {
    /// Base materials to gather, sorted by key
    pub materials: Vec<(ItemKey, u64)>,
    /// Indented trace, header first and the final craft last
    pub trace: Vec<String>,
    /// Crafts in dependency order, the expanded recipe last
    pub crafts: Vec<CraftAction<'a>>,
    /// First unowned equipment a chosen producer needed
    pub missing_equipment: Option<EquipmentKey>,
    /// Items cut off by the cycle guard or the depth ceiling
    pub cycles: Vec<ItemKey>,
}

impl<'a> Expansion<'a> {
    /// Expected XP credited to `skill` at `level` by every craft of that skill
    pub fn xp_for_skill(&self, skill: &str, level: Level, model: &XpModel) -> f64 {
        self.crafts
            .iter()
            .filter(|c| c.recipe.skill == skill && c.recipe.grants_xp)
            .map(|c| c.count as f64 * model.expected_xp(c.recipe, level))
            .sum()
    }

    /// Self-describing summaries of every craft
    pub fn craft_summaries(&self, skill: &str, level: Level, model: &XpModel) -> Vec<CraftSummary> {
        self.crafts
            .iter()
            .map(|c| {
                let expected_xp = if c.recipe.skill == skill {
                    c.count as f64 * model.expected_xp(c.recipe, level)
                } else {
                    0.0
                };
                CraftSummary {
                    recipe_key: c.recipe.key.clone(),
                    recipe_name: c.recipe.name.clone(),
                    skill: c.recipe.skill.clone(),
                    crafts: c.count,
                    outputs: c
                        .recipe
                        .outputs
                        .iter()
                        .map(|(item, qty)| (item.clone(), *qty as u64 * c.count))
                        .collect(),
                    expected_xp,
                }
            })
            .collect()
    }
}

/// Per-call accumulator; nothing survives between two expansions
struct ExpandRun<'a> {
    totals: BTreeMap<ItemKey, u64>,
    trace: Vec<String>,
    crafts: Vec<CraftAction<'a>>,
    stock: AHashMap<ItemKey, u64>,
    trail: Vec<ItemKey>,
    missing_equipment: Option<EquipmentKey>,
    cycles: Vec<ItemKey>,
}

impl<'a> ExpandRun<'a> {
    fn new() -> Self {
        Self {
            totals: BTreeMap::new(),
            trace: Vec::new(),
            crafts: Vec::new(),
            stock: AHashMap::new(),
            trail: Vec::new(),
            missing_equipment: None,
            cycles: Vec::new(),
        }
    }

    fn gather(&mut self, item: &str, qty: u64) {
        *self.totals.entry(item.to_string()).or_insert(0) += qty;
    }

    fn line(&mut self, depth: usize, text: String) {
        self.trace.push(format!("{}- {}", "  ".repeat(depth), text));
    }
}

pub struct Expander<'s, 'a> {
    ctx: &'s PlanningContext<'a>,
    state: &'s SimState,
}

impl<'s, 'a> Expander<'s, 'a> {
    pub fn new(ctx: &'s PlanningContext<'a>, state: &'s SimState) -> Self {
        Self { ctx, state }
    }

    /// Pick the producer of `item`: the easiest candidate whose equipment is
    /// owned and which is unlocked at its skill's level, else the easiest
    /// candidate overall. `None` when nothing produces the item.
    pub fn choose_producer(&self, item: &str) -> Option<Producer<'a>> {
        let mut fallback: Option<&'a Recipe> = None;
        for recipe in self.ctx.graph.producers(item) {
            fallback.get_or_insert(recipe);
            if !self.state.can_use(recipe.equipment.as_deref()) {
                continue;
            }
            if recipe.is_unlocked_at(self.state.level(&recipe.skill)) {
                return Some(Producer::Ready(recipe));
            }
        }
        fallback.map(|recipe| Producer::Fallback {
            recipe,
            missing_equipment: recipe
                .equipment
                .as_deref()
                .filter(|e| !self.state.owns(e)),
        })
    }

    /// Expand `crafts` crafts of `recipe`, crediting crafts of `target_skill`
    /// as own crafts in the trace
    pub fn expand(&self, recipe: &'a Recipe, crafts: u64, target_skill: &str) -> Expansion<'a> {
        let mut run = ExpandRun::new();
        run.trace.push(format!("{} x{} (final)", recipe.name, crafts));

        for (item, qty) in &recipe.inputs {
            self.resolve(&mut run, item, *qty as u64 * crafts, 1, target_skill);
        }

        run.crafts.push(CraftAction {
            recipe,
            count: crafts,
        });
        run.line(0, format!("Craft {} x{} (final)", recipe.name, crafts));

        Expansion {
            materials: run.totals.into_iter().collect(),
            trace: run.trace,
            crafts: run.crafts,
            missing_equipment: run.missing_equipment,
            cycles: run.cycles,
        }
    }

    fn resolve(&self, run: &mut ExpandRun<'a>, item: &str, qty: u64, depth: usize, target_skill: &str) {
        if qty == 0 {
            return;
        }
        let label = self.ctx.data.item_label(item);

        if depth > self.ctx.config.max_expansion_depth || run.trail.iter().any(|t| t == item) {
            tracing::debug!(item, depth, "expansion cut off; treating item as gathered");
            run.gather(item, qty);
            run.cycles.push(item.to_string());
            run.line(depth, format!("{} x{} (cycle)", label, qty));
            return;
        }

        if self.ctx.is_base_material(item) {
            run.gather(item, qty);
            run.line(depth, format!("Gather {} x{}", label, qty));
            return;
        }

        let mut remaining = qty;
        if self.ctx.config.reuse_surplus {
            if let Some(stock) = run.stock.get_mut(item) {
                let taken = (*stock).min(remaining);
                *stock -= taken;
                remaining -= taken;
                if taken > 0 {
                    run.line(depth, format!("Use surplus {} x{}", label, taken));
                }
            }
        }
        if remaining == 0 {
            return;
        }

        let producer = match self.choose_producer(item) {
            Some(p) => p,
            None => {
                run.gather(item, remaining);
                run.line(depth, format!("Gather {} x{}", label, remaining));
                return;
            }
        };
        if let Some(equipment) = producer.missing_equipment() {
            run.missing_equipment
                .get_or_insert_with(|| equipment.to_string());
        }

        let recipe = producer.recipe();
        let per_craft = recipe
            .output_quantity(item)
            .or_else(|| recipe.outputs.first().map(|(_, q)| *q))
            .unwrap_or(1)
            .max(1) as u64;
        let crafts = (remaining + per_craft - 1) / per_craft;
        let surplus = crafts * per_craft - remaining;
        if self.ctx.config.reuse_surplus && surplus > 0 {
            *run.stock.entry(item.to_string()).or_insert(0) += surplus;
        }

        run.trail.push(item.to_string());
        for (sub, sub_qty) in &recipe.inputs {
            self.resolve(run, sub, *sub_qty as u64 * crafts, depth + 1, target_skill);
        }
        run.trail.pop();

        run.crafts.push(CraftAction {
            recipe,
            count: crafts,
        });
        let action = if recipe.skill == target_skill {
            "Craft".to_string()
        } else {
            format!("External craft ({})", self.ctx.data.skill_label(&recipe.skill))
        };
        let requires = producer
            .missing_equipment()
            .map(|e| format!(" (requires {})", self.ctx.data.equipment_label(e)))
            .unwrap_or_default();
        run.line(
            depth,
            format!(
                "{} {} x{} -> {} x{}{}",
                action, recipe.name, crafts, label, remaining, requires
            ),
        );
    }

    /// Feeder skills under-leveled for an intermediate of `recipe`
    ///
    /// Walks the ingredient tree through same-skill intermediates; a producer
    /// of another skill is a gap when its skill's level is below the
    /// producer's mastery level. Gaps are deduplicated by (skill, item).
    pub fn dependency_gaps(&self, recipe: &'a Recipe, target_skill: &str) -> Vec<PrereqGap> {
        let mut gaps = Vec::new();
        let mut trail: Vec<&str> = Vec::new();
        for (item, _) in &recipe.inputs {
            self.walk_gaps(item, target_skill, 1, &mut trail, &mut gaps);
        }
        gaps
    }

    fn walk_gaps<'t>(
        &self,
        item: &'t str,
        target_skill: &str,
        depth: usize,
        trail: &mut Vec<&'t str>,
        gaps: &mut Vec<PrereqGap>,
    ) where
        'a: 't,
    {
        if depth > self.ctx.config.max_expansion_depth
            || trail.contains(&item)
            || self.ctx.is_base_material(item)
        {
            return;
        }
        let Some(producer) = self.choose_producer(item) else {
            return;
        };
        let recipe = producer.recipe();

        if recipe.skill != target_skill {
            let required = recipe.mastery_level();
            let current = self.state.level(&recipe.skill);
            let known = gaps
                .iter()
                .any(|g| g.skill == recipe.skill && g.item == item);
            if required > current && !known {
                gaps.push(PrereqGap {
                    skill: recipe.skill.clone(),
                    required_level: required,
                    item: item.to_string(),
                    deficit: required - current,
                });
            }
            return;
        }

        trail.push(item);
        for (sub, _) in &recipe.inputs {
            self.walk_gaps(sub, target_skill, depth + 1, trail, gaps);
        }
        trail.pop();
    }
}
