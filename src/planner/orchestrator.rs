//! Multi-skill plan orchestration
//!
//! Round-robins over the target skills, largest deficit first. Each turn the
//! skill either advances with its best option, or a prerequisite step is
//! planned for it (a feeder level or an equipment unlock). A turn that
//! changes nothing counts towards stagnation; once every target skill has
//! stagnated in a row the run stops with a "stalled" note.
//!
//! Termination: every progressing turn raises a level or grants equipment.
//! Levels are bounded by the targets and equipment by the data, so only
//! finitely many progressing turns exist, and non-progressing runs are cut by
//! the stagnation counter. `max_steps` bounds the output regardless.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::PlannerConfig;
use crate::core::types::{Level, SkillKey};
use crate::data::game_data::GameData;
use crate::data::profile::Profile;
use crate::planner::context::PlanningContext;
use crate::planner::plan::{PlanStep, PlanStepOption};
use crate::planner::prereq::{PrerequisiteResolver, Resolution};
use crate::planner::progress::{ProgressSink, ProgressTracker};
use crate::planner::ranker::{GapPolicy, OptionRanker, RankOutcome};
use crate::planner::state::SimState;

const STALL_NOTE: &str = "Planner stalled; remaining skills may require manual intervention.";

/// Where a skill stands in the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillPhase {
    Advancing,
    Unblocking,
    Blocked,
    Complete,
}

/// How a planning run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanOutcome {
    /// Every target level was reached
    Complete,
    /// No skill could make progress; the last step carries the stall note
    Stalled { skill: SkillKey, level: Level },
    /// The step ceiling was hit with targets still open
    StepLimitReached { levels_remaining: u32 },
}

/// Ordered plan steps and how the run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub outcome: PlanOutcome,
}

impl Plan {
    pub fn is_complete(&self) -> bool {
        self.outcome == PlanOutcome::Complete
    }
}

/// Drives one planning run over a profile
pub struct Planner<'a> {
    ctx: PlanningContext<'a>,
    state: SimState,
    progress: ProgressTracker<'a>,
}

impl<'a> Planner<'a> {
    pub fn new(data: &'a GameData, profile: &Profile, config: &'a PlannerConfig) -> Self {
        let state = SimState::from_profile(profile, &data.xp_tables, config.default_skill_level);
        let progress = ProgressTracker::new(
            state.remaining_levels(),
            Duration::from_millis(config.progress_min_interval_ms),
        );
        Self {
            ctx: PlanningContext::new(data, profile, config),
            state,
            progress,
        }
    }

    /// Attach a progress receiver (closure or bounded queue)
    pub fn with_progress(mut self, sink: impl ProgressSink + 'a) -> Self {
        self.progress.set_sink(Box::new(sink));
        self
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Ranked options for `skill` at `level` against the current state
    pub fn best_options(&self, skill: &str, level: Level, top_k: usize) -> RankOutcome {
        OptionRanker::new(&self.ctx, &self.state).best_options(skill, level, top_k, GapPolicy::Enforce)
    }

    /// Run the simulation to completion, stall or the step ceiling
    pub fn plan(&mut self) -> Plan {
        let config = self.ctx.config;
        let mut steps: Vec<PlanStep> = Vec::new();
        let mut queue = self.state.seed_queue();
        let skills = self.state.target_count();
        let mut stagnation = 0usize;
        let mut last_block: Option<String> = None;

        tracing::info!(
            skills,
            levels = self.state.remaining_levels(),
            "planning started"
        );
        self.progress.emit(true);

        let outcome = loop {
            if self.state.targets_complete() {
                break PlanOutcome::Complete;
            }
            if steps.len() >= config.max_steps {
                let levels_remaining = self.state.remaining_levels();
                tracing::warn!(
                    max_steps = config.max_steps,
                    levels_remaining,
                    "step ceiling reached before all targets were met"
                );
                break PlanOutcome::StepLimitReached { levels_remaining };
            }
            let Some(skill) = queue.pop_front() else {
                break PlanOutcome::Complete;
            };
            if !self.state.needs_levels(&skill) {
                tracing::debug!(skill = skill.as_str(), phase = ?SkillPhase::Complete, "target reached");
                continue;
            }

            let level = self.state.level(&skill);
            if self.take_turn(&skill, level, &mut steps, &mut last_block) {
                stagnation = 0;
            } else {
                stagnation += 1;
            }

            if stagnation >= skills {
                let level = self.state.level(&skill);
                let note = match &last_block {
                    Some(reason) => format!("{} Last blocker: {}", STALL_NOTE, reason),
                    None => STALL_NOTE.to_string(),
                };
                tracing::warn!(skill = skill.as_str(), level, phase = ?SkillPhase::Blocked, "{}", note);
                steps.push(PlanStep::note_only(skill.clone(), level, note));
                break PlanOutcome::Stalled { skill, level };
            }
            queue.push_back(skill);
        };

        self.progress.emit(true);
        tracing::info!(steps = steps.len(), outcome = ?outcome, "planning finished");
        Plan { steps, outcome }
    }

    /// One turn for `skill`; returns whether the state changed
    fn take_turn(
        &mut self,
        skill: &str,
        level: Level,
        steps: &mut Vec<PlanStep>,
        last_block: &mut Option<String>,
    ) -> bool {
        let mut ranked = self.best_options(skill, level, self.ctx.config.top_k);

        if let Some(best) = ranked.options.first() {
            if best.prereq_gaps.is_empty() {
                self.advance(skill, level, ranked.options, steps);
                return true;
            }

            let resolution = PrerequisiteResolver::new(&self.ctx, &self.state).resolve_gap(best, skill);
            if let Some(resolution) = resolution {
                return self.apply(resolution, steps);
            }

            // Feeder cannot advance; fall back to an option without gaps
            if let Some(idx) = ranked.options.iter().position(|o| o.prereq_gaps.is_empty()) {
                let chosen = ranked.options.remove(idx);
                ranked.options.insert(0, chosen);
                self.advance(skill, level, ranked.options, steps);
                return true;
            }
            *last_block = Some(format!(
                "{} at level {} needs feeder skills that cannot advance",
                self.ctx.data.skill_label(skill),
                level
            ));
            return false;
        }

        let (resolution, unowned) = {
            let resolver = PrerequisiteResolver::new(&self.ctx, &self.state);
            let unowned = resolver.unowned_equipment(skill, level);
            let resolution = resolver
                .resolve_missing(skill, level, ranked.missing_equipment.as_deref())
                .or_else(|| {
                    unowned
                        .iter()
                        .find_map(|e| resolver.unlock_equipment(e, &mut BTreeSet::new()))
                });
            (resolution, unowned)
        };
        match resolution {
            Some(resolution) => self.apply(resolution, steps),
            None => {
                let reason = match ranked.missing_equipment.as_ref().or(unowned.first()) {
                    Some(equipment) => format!(
                        "{} at level {} needs {} which cannot be unlocked",
                        self.ctx.data.skill_label(skill),
                        level,
                        self.ctx.data.equipment_label(equipment)
                    ),
                    None => format!(
                        "no feasible recipe for {} at level {}",
                        self.ctx.data.skill_label(skill),
                        level
                    ),
                };
                tracing::debug!(skill, level, phase = ?SkillPhase::Blocked, "{}", reason);
                *last_block = Some(reason);
                false
            }
        }
    }

    /// Advance `skill` with the first option towards its target
    fn advance(&mut self, skill: &str, level: Level, options: Vec<PlanStepOption>, steps: &mut Vec<PlanStep>) {
        let Some(best) = options.first() else {
            return;
        };
        let target = self.state.target(skill).unwrap_or(level + 1);
        let to = self
            .state
            .apply_xp(skill, best.total_xp, target, self.ctx.xp_tables());
        self.progress.record(level, to, target);
        tracing::debug!(
            skill,
            from = level,
            to,
            recipe = best.recipe_key.as_str(),
            phase = ?SkillPhase::Advancing,
            "advanced"
        );
        steps.push(PlanStep {
            skill: skill.to_string(),
            from_level: level,
            to_level: to,
            options,
            note: None,
        });
    }

    /// Apply a prerequisite step; returns whether the state changed
    fn apply(&mut self, resolution: Resolution, steps: &mut Vec<PlanStep>) -> bool {
        match resolution {
            Resolution::Advance(mut step) => {
                let from = self.state.level(&step.skill);
                let gained = step.options.first().map_or(0.0, |o| o.total_xp);
                let to = self
                    .state
                    .apply_xp(&step.skill, gained, from + 1, self.ctx.xp_tables());
                if let Some(target) = self.state.target(&step.skill) {
                    self.progress.record(from, to, target);
                }
                tracing::debug!(
                    skill = step.skill.as_str(),
                    from,
                    to,
                    phase = ?SkillPhase::Unblocking,
                    "prerequisite level"
                );
                step.from_level = from;
                step.to_level = to;
                steps.push(step);
                true
            }
            Resolution::Unlock { step, equipment } => {
                let granted = self.state.grant(&equipment);
                tracing::debug!(
                    equipment = equipment.as_str(),
                    granted,
                    phase = ?SkillPhase::Unblocking,
                    "equipment unlocked"
                );
                steps.push(step);
                granted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::data::profile::SkillProgress;
    use crate::planner::progress::Progress;
    use crate::data::recipe::Recipe;
    use crate::data::xp_table::XpTable;

    fn recipe(key: &str, skill: &str, unlock: Level, difficulty: Level, input: &str, output: &str) -> Recipe {
        Recipe {
            key: key.into(),
            name: key.into(),
            skill: skill.into(),
            unlock_level: unlock,
            difficulty,
            xp_multiplier: 1.0,
            inputs: vec![(input.to_string(), 1)],
            outputs: vec![(output.to_string(), 1)],
            equipment: None,
            dev_only: false,
            grants_xp: true,
        }
    }

    fn single_skill_data() -> GameData {
        let mut skills = BTreeMap::new();
        skills.insert("skill_weaving".to_string(), XpTable::new(vec![300; 20]));
        GameData::from_recipes(
            vec![
                recipe("recipe_mat", "skill_weaving", 1, 4, "item_reed", "item_mat"),
                recipe("recipe_basket", "skill_weaving", 3, 7, "item_reed", "item_basket"),
            ],
            skills,
        )
    }

    fn weaving_profile(from: Level, to: Level) -> Profile {
        let mut profile = Profile::default();
        profile
            .skills
            .insert("skill_weaving".into(), SkillProgress::new(from, 0, to));
        profile
    }

    #[test]
    fn test_reaches_target_with_monotonic_steps() {
        let data = single_skill_data();
        let config = PlannerConfig::default();
        let profile = weaving_profile(1, 6);
        let plan = Planner::new(&data, &profile, &config).plan();

        assert!(plan.is_complete());
        let mut level = 1;
        for step in &plan.steps {
            assert_eq!(step.from_level, level);
            assert!(step.to_level > step.from_level);
            assert!(!step.options.is_empty());
            level = step.to_level;
        }
        assert_eq!(level, 6);
    }

    #[test]
    fn test_already_at_target_is_empty() {
        let data = single_skill_data();
        let config = PlannerConfig::default();
        let plan = Planner::new(&data, &weaving_profile(6, 6), &config).plan();
        assert!(plan.steps.is_empty());
        assert!(plan.is_complete());
    }

    #[test]
    fn test_unknown_skill_stalls() {
        let data = single_skill_data();
        let config = PlannerConfig::default();
        let mut profile = weaving_profile(6, 6);
        profile
            .skills
            .insert("skill_alchemy".into(), SkillProgress::new(1, 0, 3));
        let plan = Planner::new(&data, &profile, &config).plan();

        assert_eq!(
            plan.outcome,
            PlanOutcome::Stalled {
                skill: "skill_alchemy".into(),
                level: 1
            }
        );
        let last = plan.steps.last().unwrap();
        assert!(last.options.is_empty());
        assert!(last.note.as_deref().unwrap().starts_with(STALL_NOTE));
    }

    #[test]
    fn test_step_ceiling_respected() {
        let data = single_skill_data();
        let mut config = PlannerConfig::default();
        config.max_steps = 2;
        let plan = Planner::new(&data, &weaving_profile(1, 15), &config).plan();
        assert_eq!(plan.steps.len(), 2);
        assert!(matches!(plan.outcome, PlanOutcome::StepLimitReached { .. }));
    }

    #[test]
    fn test_progress_reaches_one() {
        let data = single_skill_data();
        let mut config = PlannerConfig::default();
        config.progress_min_interval_ms = 0;
        let profile = weaving_profile(1, 4);
        let mut seen: Vec<Progress> = Vec::new();
        {
            let mut planner = Planner::new(&data, &profile, &config).with_progress(|p: Progress| seen.push(p));
            planner.plan();
        }
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0].levels_done <= w[1].levels_done));
        assert_eq!(seen.last().map(|p| p.fraction), Some(1.0));
    }
}
