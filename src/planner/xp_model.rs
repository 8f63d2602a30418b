//! XP and outcome model
//!
//! Pure functions converting (level, difficulty, unlock level, multiplier)
//! into a success probability and expected XP. Every function is
//! deterministic: the orchestrator re-evaluates them at every simulated level
//! and relies on identical inputs producing bit-identical outputs.

use std::collections::BTreeMap;

use crate::core::config::PlannerConfig;
use crate::core::types::{Level, SkillKey};
use crate::data::recipe::Recipe;

/// Floor of the success probability while under-leveled
pub const MIN_SUCCESS_CHANCE: f64 = 0.04;

/// Slope of the logistic success curve
pub const LOGISTIC_SLOPE: f64 = 0.606;

/// The curve is centered this many levels below difficulty
pub const LOGISTIC_OFFSET: f64 = 5.26;

/// Relative spread of a success roll around its average (±8%)
pub const SUCCESS_SPREAD: f64 = 0.08;

/// Failure XP is clamped into this range before the multiplier
pub const FAILURE_XP_MIN: f64 = 20.0;
pub const FAILURE_XP_MAX: f64 = 50.0;

/// Difficulty band selecting the XP constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyBand {
    /// difficulty <= 24
    Low,
    /// difficulty <= 40
    Mid,
    /// difficulty > 40
    High,
}

impl DifficultyBand {
    pub fn from_difficulty(difficulty: Level) -> Self {
        if difficulty <= 24 {
            DifficultyBand::Low
        } else if difficulty <= 40 {
            DifficultyBand::Mid
        } else {
            DifficultyBand::High
        }
    }

    fn constants(self) -> BandConstants {
        match self {
            DifficultyBand::Low => BandConstants {
                base: 112.0,
                per_level_gap: 12.0,
                trivial_offset: 15.0,
                trivial_slope: 3.0,
                failure_base: 35.0,
            },
            DifficultyBand::Mid => BandConstants {
                base: 110.0,
                per_level_gap: 12.0,
                trivial_offset: 15.0,
                trivial_slope: 3.0,
                failure_base: 38.0,
            },
            DifficultyBand::High => BandConstants {
                base: 108.0,
                per_level_gap: 12.0,
                trivial_offset: 15.0,
                trivial_slope: 3.0,
                failure_base: 40.0,
            },
        }
    }
}

struct BandConstants {
    base: f64,
    per_level_gap: f64,
    trivial_offset: f64,
    trivial_slope: f64,
    failure_base: f64,
}

/// Probability that one attempt succeeds
///
/// Returns 1.0 once `level >= difficulty` (the craft is trivial), otherwise a
/// logistic curve clamped into `[MIN_SUCCESS_CHANCE, 1.0]`.
pub fn success_chance(level: Level, difficulty: Level) -> f64 {
    if level >= difficulty {
        return 1.0;
    }
    let center = difficulty as f64 - LOGISTIC_OFFSET;
    let z = LOGISTIC_SLOPE * (level as f64 - center);
    let p = 1.0 / (1.0 + (-z).exp());
    p.clamp(MIN_SUCCESS_CHANCE, 1.0)
}

/// Average XP of a successful attempt
pub fn success_xp(level: Level, difficulty: Level, xp_multiplier: f64) -> f64 {
    let c = DifficultyBand::from_difficulty(difficulty).constants();
    if level < difficulty {
        let gap = (difficulty - level) as f64;
        (c.base + c.per_level_gap * gap) * xp_multiplier
    } else {
        let start = difficulty as f64 + c.trivial_offset;
        let over = (level - difficulty) as f64;
        (start - c.trivial_slope * over).max(0.0)
    }
}

/// Average XP of a failed attempt; `None` once the craft can no longer fail
pub fn failure_xp(level: Level, difficulty: Level, unlock: Level, xp_multiplier: f64) -> Option<f64> {
    if level >= difficulty {
        return None;
    }
    let c = DifficultyBand::from_difficulty(difficulty).constants();
    let base = c.failure_base + level.saturating_sub(unlock) as f64;
    Some(base.clamp(FAILURE_XP_MIN, FAILURE_XP_MAX) * xp_multiplier)
}

/// Probability-weighted XP of one attempt
pub fn expected_xp(level: Level, difficulty: Level, unlock: Level, xp_multiplier: f64) -> f64 {
    let success = success_xp(level, difficulty, xp_multiplier);
    match failure_xp(level, difficulty, unlock, xp_multiplier) {
        None => success,
        Some(failure) => {
            let p = success_chance(level, difficulty);
            p * success + (1.0 - p) * failure
        }
    }
}

/// XP model bound to one planning run
///
/// Applies the premium multiplier and per-skill scaling once, on top of the
/// pure functions, so boosted and unboosted figures differ by exactly the
/// multiplier.
#[derive(Debug, Clone)]
pub struct XpModel {
    boost: f64,
    skill_scale: BTreeMap<SkillKey, f64>,
}

impl Default for XpModel {
    fn default() -> Self {
        Self {
            boost: 1.0,
            skill_scale: BTreeMap::new(),
        }
    }
}

impl XpModel {
    pub fn new(premium_account: bool, config: &PlannerConfig) -> Self {
        Self {
            boost: if premium_account {
                config.premium_multiplier
            } else {
                1.0
            },
            skill_scale: config.skill_xp_scale.clone(),
        }
    }

    /// Per-skill scale first, premium boost last as its own multiplication
    fn scaled(&self, skill: &str, xp: f64) -> f64 {
        let scale = self.skill_scale.get(skill).copied().unwrap_or(1.0);
        (xp * scale) * self.boost
    }

    pub fn success_chance(&self, recipe: &Recipe, level: Level) -> f64 {
        success_chance(level, recipe.difficulty)
    }

    pub fn success_xp(&self, recipe: &Recipe, level: Level) -> f64 {
        self.scaled(&recipe.skill, success_xp(level, recipe.difficulty, recipe.xp_multiplier))
    }

    pub fn failure_xp(&self, recipe: &Recipe, level: Level) -> Option<f64> {
        failure_xp(level, recipe.difficulty, recipe.unlock_level, recipe.xp_multiplier)
            .map(|xp| self.scaled(&recipe.skill, xp))
    }

    /// Expected XP of one attempt; zero for recipes that grant no XP
    pub fn expected_xp(&self, recipe: &Recipe, level: Level) -> f64 {
        if !recipe.grants_xp {
            return 0.0;
        }
        self.scaled(
            &recipe.skill,
            expected_xp(level, recipe.difficulty, recipe.unlock_level, recipe.xp_multiplier),
        )
    }

    /// (min, average, max) XP of a successful attempt
    pub fn success_xp_range(&self, recipe: &Recipe, level: Level) -> (f64, f64, f64) {
        let avg = self.success_xp(recipe, level);
        (avg * (1.0 - SUCCESS_SPREAD), avg, avg * (1.0 + SUCCESS_SPREAD))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(difficulty: Level, unlock: Level) -> Recipe {
        Recipe {
            key: "recipe_test".into(),
            name: "Test".into(),
            skill: "skill_test".into(),
            unlock_level: unlock,
            difficulty,
            xp_multiplier: 1.0,
            inputs: vec![],
            outputs: vec![],
            equipment: None,
            dev_only: false,
            grants_xp: true,
        }
    }

    #[test]
    fn test_success_chance_trivial() {
        assert_eq!(success_chance(10, 10), 1.0);
        assert_eq!(success_chance(30, 10), 1.0);
    }

    #[test]
    fn test_success_chance_floor() {
        assert!((success_chance(0, 60) - MIN_SUCCESS_CHANCE).abs() < 1e-12);
    }

    #[test]
    fn test_success_chance_center() {
        // At the curve center the logistic is exactly one half
        let p = success_chance(5, 10);
        let expected = 1.0 / (1.0 + (-(0.606 * (5.0 - 4.74_f64))).exp());
        assert!((p - expected).abs() < 1e-12);
        assert!(p > 0.5 && p < 0.6);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(DifficultyBand::from_difficulty(24), DifficultyBand::Low);
        assert_eq!(DifficultyBand::from_difficulty(25), DifficultyBand::Mid);
        assert_eq!(DifficultyBand::from_difficulty(40), DifficultyBand::Mid);
        assert_eq!(DifficultyBand::from_difficulty(41), DifficultyBand::High);
    }

    #[test]
    fn test_success_xp_under_leveled() {
        // Low band: (112 + 12 * 5) * 1.0
        assert!((success_xp(5, 10, 1.0) - 172.0).abs() < 1e-12);
        // Mid band with multiplier: (110 + 12 * 2) * 2.0
        assert!((success_xp(28, 30, 2.0) - 268.0).abs() < 1e-12);
    }

    #[test]
    fn test_success_xp_decays_when_over_leveled() {
        // (10 + 15) - 3 * 4 = 13
        assert!((success_xp(14, 10, 1.0) - 13.0).abs() < 1e-12);
        assert_eq!(success_xp(40, 10, 1.0), 0.0);
    }

    #[test]
    fn test_failure_xp_clamped() {
        assert!(failure_xp(10, 10, 0, 1.0).is_none());
        // 35 + (5 - 0) = 40
        assert!((failure_xp(5, 10, 0, 1.0).unwrap() - 40.0).abs() < 1e-12);
        // 35 + 30 clamps to 50
        assert!((failure_xp(30, 50, 0, 1.0).unwrap() - 50.0).abs() < 1e-12);
        assert!((failure_xp(5, 10, 0, 0.5).unwrap() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_expected_xp_blends() {
        let p = success_chance(5, 10);
        let expected = p * 172.0 + (1.0 - p) * 40.0;
        assert!((expected_xp(5, 10, 0, 1.0) - expected).abs() < 1e-9);
        assert_eq!(expected_xp(12, 10, 0, 1.0), success_xp(12, 10, 1.0));
    }

    #[test]
    fn test_premium_scales_exactly() {
        let plain = PlannerConfig::default();
        let mut scaled = PlannerConfig::default();
        scaled.skill_xp_scale.insert("skill_test".into(), 0.88);

        for config in [&plain, &scaled] {
            let standard = XpModel::new(false, config);
            let premium = XpModel::new(true, config);
            for difficulty in 1..70 {
                let mut r = recipe(difficulty, difficulty / 3);
                r.xp_multiplier = 1.3;
                for level in 0..difficulty + 10 {
                    assert_eq!(premium.expected_xp(&r, level), standard.expected_xp(&r, level) * 1.5);
                    assert_eq!(premium.success_xp(&r, level), standard.success_xp(&r, level) * 1.5);
                    assert_eq!(
                        premium.failure_xp(&r, level),
                        standard.failure_xp(&r, level).map(|x| x * 1.5)
                    );
                }
            }
        }
    }

    #[test]
    fn test_skill_scale_applied() {
        let mut config = PlannerConfig::default();
        config.skill_xp_scale.insert("skill_test".into(), 0.5);
        let model = XpModel::new(false, &config);
        let r = recipe(10, 0);
        assert!((model.success_xp(&r, 5) - 86.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_xp_recipe_yields_zero() {
        let mut r = recipe(10, 0);
        r.grants_xp = false;
        assert_eq!(XpModel::default().expected_xp(&r, 5), 0.0);
    }

    #[test]
    fn test_success_range_spread() {
        let (lo, avg, hi) = XpModel::default().success_xp_range(&recipe(10, 0), 5);
        assert!((lo - avg * 0.92).abs() < 1e-9);
        assert!((hi - avg * 1.08).abs() < 1e-9);
    }
}
