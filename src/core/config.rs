//! Planner configuration with documented constants
//!
//! All tunables of the resolver are collected here with explanations of their
//! purpose and how they interact with each other.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{PlannerError, Result};
use crate::core::types::{Level, SkillKey};

/// Configuration for a planning run
///
/// Loaded once per run and read-only afterwards. Every field has a default, so
/// a TOML file only needs to list what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    // === RANKING ===
    /// Number of ranked options attached to each plan step
    pub top_k: usize,

    // === ORCHESTRATION ===
    /// Hard ceiling on emitted plan steps
    ///
    /// Reaching it is not an error: the partial plan is returned together with
    /// a warning so a caller can still render what was planned.
    pub max_steps: usize,

    /// Level assumed for a skill the profile does not mention
    ///
    /// Feeder skills outside the profile start here when they are first
    /// advanced by a prerequisite step.
    pub default_skill_level: Level,

    // === EXPANSION ===
    /// Depth ceiling for recursive recipe expansion
    ///
    /// Anything deeper is logged as gathered with a cycle marker.
    pub max_expansion_depth: usize,

    /// Bank the excess of a producer's output and reuse it for later sibling
    /// requirements of the same item
    ///
    /// Disabling this yields the plain unrolling of the ingredient tree.
    pub reuse_surplus: bool,

    /// Key prefix marking a recipe whose purpose is to unlock a crafting station
    pub unlock_recipe_prefix: String,

    // === XP ===
    /// XP-to-next-level used when a skill table is missing, empty or exhausted
    ///
    /// This keeps planning alive but always indicates an upstream data problem.
    pub fallback_xp_per_level: u64,

    /// Multiplier applied to every XP figure for premium accounts
    pub premium_multiplier: f64,

    /// Per-skill XP scaling overrides (1.0 when absent)
    pub skill_xp_scale: BTreeMap<SkillKey, f64>,

    // === PROGRESS ===
    /// Minimum interval between two non-forced progress emissions
    pub progress_min_interval_ms: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_steps: 500,
            default_skill_level: 1,
            max_expansion_depth: 12,
            reuse_surplus: true,
            unlock_recipe_prefix: "recipe_item_unlock_crafter_".into(),
            fallback_xp_per_level: 1000,
            premium_multiplier: 1.5,
            skill_xp_scale: BTreeMap::new(),
            progress_min_interval_ms: 1000,
        }
    }
}

impl PlannerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(PlannerError::InvalidConfig("top_k must be at least 1".into()));
        }
        if self.max_steps == 0 {
            return Err(PlannerError::InvalidConfig("max_steps must be at least 1".into()));
        }
        if self.max_expansion_depth == 0 {
            return Err(PlannerError::InvalidConfig(
                "max_expansion_depth must be at least 1".into(),
            ));
        }
        if self.fallback_xp_per_level == 0 {
            return Err(PlannerError::InvalidConfig(
                "fallback_xp_per_level must be positive".into(),
            ));
        }
        if !self.premium_multiplier.is_finite() || self.premium_multiplier <= 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "premium_multiplier ({}) must be a positive number",
                self.premium_multiplier
            )));
        }
        for (skill, scale) in &self.skill_xp_scale {
            if !scale.is_finite() || *scale <= 0.0 {
                return Err(PlannerError::InvalidConfig(format!(
                    "skill_xp_scale for {} ({}) must be a positive number",
                    skill, scale
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k, 3);
        assert_eq!(config.max_expansion_depth, 12);
        assert!((config.premium_multiplier - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PlannerConfig::from_toml_str(
            r#"
top_k = 5
reuse_surplus = false

[skill_xp_scale]
skill_brewing = 0.88
"#,
        )
        .expect("Should parse");

        assert_eq!(config.top_k, 5);
        assert!(!config.reuse_surplus);
        assert_eq!(config.max_steps, 500);
        assert_eq!(config.skill_xp_scale.get("skill_brewing"), Some(&0.88));
        assert!(config.skill_xp_scale.get("skill_other").is_none());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let result = PlannerConfig::from_toml_str("top_k = 0");
        match result {
            Err(PlannerError::InvalidConfig(msg)) => assert!(msg.contains("top_k")),
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_scale_rejected() {
        let mut config = PlannerConfig::default();
        config.skill_xp_scale.insert("skill_x".into(), -1.0);
        assert!(config.validate().is_err());
    }
}
