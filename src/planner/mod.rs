//! Leveling planner: XP model, crafting graph, expansion, ranking,
//! prerequisite resolution and the plan orchestrator

pub mod context;
pub mod expander;
pub mod graph;
pub mod orchestrator;
pub mod plan;
pub mod prereq;
pub mod progress;
pub mod ranker;
pub mod rarity;
pub mod single_skill;
pub mod state;
pub mod xp_model;

pub use context::PlanningContext;
pub use expander::{CraftAction, Expander, Expansion, Producer};
pub use graph::CraftingGraph;
pub use orchestrator::{Plan, PlanOutcome, Planner, SkillPhase};
pub use plan::{CraftSummary, PlanStep, PlanStepOption, PrereqGap};
pub use prereq::{PrerequisiteResolver, Resolution};
pub use progress::{Progress, ProgressQueue, ProgressReceiver, ProgressSink, ProgressTracker};
pub use ranker::{GapPolicy, OptionRanker, RankOutcome};
pub use rarity::RarityScorer;
pub use single_skill::{plan_single_skill, MaterialWeights, SingleSkillPlan, SingleSkillStep, SingleSkillTotals, StepAction};
pub use state::SimState;
pub use xp_model::XpModel;
