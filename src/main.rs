//! Craft Leveler - Entry Point
//!
//! Loads game data, a player profile and optional material preferences, runs
//! the multi-skill planner and writes the plan table, the shopping list and
//! the step-by-step guide into the output directory.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use craft_leveler::core::error::Result;
use craft_leveler::core::PlannerConfig;
use craft_leveler::data::{GameData, MaterialPreferences, Profile};
use craft_leveler::planner::{PlanOutcome, Planner, Progress};
use craft_leveler::report::{render_guide, shopping_list, write_plan_csv, write_shopping_csv};

/// Multi-skill crafting level planner
#[derive(Parser, Debug)]
#[command(name = "craft-leveler")]
#[command(about = "Plan crafting skill levels from a profile to its targets")]
struct Args {
    /// Game data file (.json or .toml)
    #[arg(long)]
    data: PathBuf,

    /// Player profile file (.json or .toml)
    #[arg(long)]
    profile: PathBuf,

    /// Material preferences file; absent items stay enabled
    #[arg(long)]
    materials: Option<PathBuf>,

    /// Planner configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Options per step (overrides the config)
    #[arg(long)]
    top_k: Option<usize>,

    /// Step ceiling (overrides the config)
    #[arg(long)]
    max_steps: Option<usize>,

    /// Directory receiving level_plan.csv, level_plan_materials.csv and level_plan_steps.txt
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
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
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    config.validate()?;

    let mut data = GameData::load(&args.data)?;
    data.xp_tables.set_fallback(config.fallback_xp_per_level);
    if let Some(path) = &args.materials {
        data.materials = MaterialPreferences::load(path)?;
    }
    let profile = Profile::load(&args.profile)?;

    let plan = Planner::new(&data, &profile, &config)
        .with_progress(|p: Progress| {
            tracing::info!(
                "progress {:.0}% ({}/{} levels)",
                p.fraction * 100.0,
                p.levels_done,
                p.levels_total
            )
        })
        .plan();

    match &plan.outcome {
        PlanOutcome::Complete => tracing::info!(steps = plan.steps.len(), "plan complete"),
        PlanOutcome::Stalled { skill, level } => {
            tracing::warn!(skill = skill.as_str(), level, "plan stalled")
        }
        PlanOutcome::StepLimitReached { levels_remaining } => {
            tracing::warn!(levels_remaining, "plan cut at the step ceiling")
        }
    }

    fs::create_dir_all(&args.out_dir)?;

    let table_path = args.out_dir.join("level_plan.csv");
    write_plan_csv(BufWriter::new(File::create(&table_path)?), &plan.steps, &data)?;

    let shopping_path = args.out_dir.join("level_plan_materials.csv");
    let items = shopping_list(&plan.steps, &data);
    write_shopping_csv(BufWriter::new(File::create(&shopping_path)?), &items)?;

    let guide_path = args.out_dir.join("level_plan_steps.txt");
    fs::write(&guide_path, render_guide(&plan.steps, &data))?;

    println!("Wrote {}", table_path.display());
    println!("Wrote {}", shopping_path.display());
    println!("Wrote {}", guide_path.display());
    Ok(())
}
