//! Read-only context shared by every component of one planning run

use crate::core::config::PlannerConfig;
use crate::data::game_data::GameData;
use crate::data::profile::Profile;
use crate::data::xp_table::XpTables;
use crate::planner::graph::CraftingGraph;
use crate::planner::rarity::RarityScorer;
use crate::planner::xp_model::XpModel;

/// Game data, indices and run settings
///
/// Built once per run from the loaded data, the profile and the config.
/// Nothing in here changes while planning; the mutable half of a run lives in
/// [`crate::planner::state::SimState`].
pub struct PlanningContext<'a> {
    pub data: &'a GameData,
    pub config: &'a PlannerConfig,
    pub graph: CraftingGraph<'a>,
    pub xp: XpModel,
    pub avoid_relics: bool,
    /// Largest tolerated feeder deficit; `None` means unlimited
    pub max_cross_skill_gap: Option<u32>,
}

impl<'a> PlanningContext<'a> {
    pub fn new(data: &'a GameData, profile: &Profile, config: &'a PlannerConfig) -> Self {
        Self {
            data,
            config,
            graph: CraftingGraph::build(&data.recipes),
            xp: XpModel::new(profile.premium_account, config),
            avoid_relics: profile.avoid_relics,
            max_cross_skill_gap: u32::try_from(profile.max_cross_skill_gap).ok(),
        }
    }

    pub fn scorer(&self) -> RarityScorer<'_, 'a> {
        RarityScorer::new(&self.graph, &self.data.items)
    }

    pub fn xp_tables(&self) -> &'a XpTables {
        &self.data.xp_tables
    }

    /// Gatherable item: raw, relic, or produced by no recipe
    pub fn is_base_material(&self, item: &str) -> bool {
        self.data.items.is_raw(item)
            || self.data.items.is_relic(item)
            || !self.graph.has_producer(item)
    }
}
