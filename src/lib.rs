//! Craft Leveler - Dependency-Aware Crafting Skill Planner

pub mod core;
pub mod data;
pub mod planner;
pub mod report;
