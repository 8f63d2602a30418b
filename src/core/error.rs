use thiserror::Error;

use crate::core::types::Level;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No profile entry for skill: {0}")]
    UnknownSkill(String),

    #[error("No XP table found for skill: {0}")]
    MissingXpTable(String),

    #[error("No feasible recipes for {skill} at level {level}; consider building a station or revising targets")]
    NoFeasibleRecipe { skill: String, level: Level },
}

pub type Result<T> = std::result::Result<T, PlannerError>;
