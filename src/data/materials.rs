//! Material preferences - which materials the player is willing to use

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::ItemKey;
use crate::data::game_data::parse_by_extension;

/// One material preference entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialPreference {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Material preference configuration; absent items are enabled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialPreferences {
    entries: BTreeMap<ItemKey, MaterialPreference>,
}

impl MaterialPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load preferences from a `.json` or `.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        parse_by_extension(path, &content)
    }

    pub fn set_enabled(&mut self, item: impl Into<ItemKey>, enabled: bool) {
        self.entries
            .entry(item.into())
            .and_modify(|e| e.enabled = enabled)
            .or_insert(MaterialPreference { name: None, enabled });
    }

    pub fn is_enabled(&self, item: &str) -> bool {
        self.entries.get(item).map_or(true, |e| e.enabled)
    }

    /// First disabled item among `materials`, if any
    pub fn first_disabled<'a, I>(&self, materials: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        materials.into_iter().find(|item| !self.is_enabled(item))
    }
}
