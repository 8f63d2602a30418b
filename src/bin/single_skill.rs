//! Single-skill greedy planner
//!
//! Plans each requested skill in isolation and prints the steps and totals.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use craft_leveler::core::error::Result;
use craft_leveler::core::PlannerConfig;
use craft_leveler::data::{GameData, MaterialPreferences, Profile};
use craft_leveler::planner::{plan_single_skill, MaterialWeights, StepAction};

/// Greedy planner for one skill at a time
#[derive(Parser, Debug)]
#[command(name = "single_skill")]
#[command(about = "Plan single skills greedily by expected XP per material cost")]
struct Args {
    /// Game data file (.json or .toml)
    #[arg(long)]
    data: PathBuf,

    /// Player profile file (.json or .toml)
    #[arg(long)]
    profile: PathBuf,

    /// Skill to plan; repeat for several (default: every skill below target)
    #[arg(long)]
    skill: Vec<String>,

    /// Material weights (item -> weight)
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Material preferences file
    #[arg(long)]
    materials: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("craft_leveler=info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = PlannerConfig::default();
    let mut data = GameData::load(&args.data)?;
    if let Some(path) = &args.materials {
        data.materials = MaterialPreferences::load(path)?;
    }
    let profile = Profile::load(&args.profile)?;
    let weights = match &args.weights {
        Some(path) => MaterialWeights::load(path)?,
        None => MaterialWeights::new(),
    };

    let skills: Vec<String> = if args.skill.is_empty() {
        profile
            .skills
            .iter()
            .filter(|(_, s)| s.current_level < s.target_level)
            .map(|(k, _)| k.clone())
            .collect()
    } else {
        args.skill.clone()
    };

    for skill in &skills {
        let plan = plan_single_skill(&data, &profile, skill, &weights, &config)?;
        println!("== {} ==", data.skill_label(skill));
        for (idx, step) in plan.steps.iter().enumerate() {
            match step.action {
                StepAction::Craft => println!(
                    "{:>3}. craft {} x{} ({} -> {}) xp {:.0} cost {:.1} | {}",
                    idx + 1,
                    step.key,
                    step.count,
                    step.from_level,
                    step.to_level,
                    step.xp_gain,
                    step.cost,
                    step.note
                ),
                StepAction::BuildEquipment => println!(
                    "{:>3}. build {} | {}",
                    idx + 1,
                    data.equipment_label(&step.key),
                    step.note
                ),
            }
        }
        println!(
            "Totals: xp {:.0}, cost {:.1}, crafts {}",
            plan.totals.xp, plan.totals.cost, plan.totals.crafts
        );
    }
    Ok(())
}
