//! Integration tests for plan rendering and the demo data bundle

mod common;

use std::fs::File;
use std::path::PathBuf;

use common::{profile, workshop};
use craft_leveler::core::PlannerConfig;
use craft_leveler::data::{GameData, MaterialPreferences, Profile};
use craft_leveler::planner::{PlanStep, Planner};
use craft_leveler::report::{
    render_guide, render_plan_csv, shopping_list, write_shopping_csv, PLAN_HEADER,
};

fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn csv_rows(text: &str) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(text.as_bytes())
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

// ============================================================================
// Plan table
// ============================================================================

#[test]
fn test_plan_table_rows_per_option() {
    let data = workshop();
    let config = PlannerConfig::default();
    let plan = Planner::new(&data, &profile(&[("skill_smithing", 1, 3)]), &config).plan();

    let text = render_plan_csv(&plan.steps, &data).unwrap();
    let rows = csv_rows(&text);
    assert_eq!(rows[0], PLAN_HEADER.to_vec());

    let option_rows: usize = plan.steps.iter().map(|s| s.options.len().max(1)).sum();
    assert_eq!(rows.len(), option_rows + 1);

    let first = &rows[1];
    assert_eq!(first[0], "Carpentry");
    assert_eq!(first[4], "1");
    assert_eq!(first[5], "recipe_plank");
    // Two decimals for XP, three for burden
    assert_eq!(first[9].split('.').nth(1).map(str::len), Some(2));
    assert_eq!(first[11].split('.').nth(1).map(str::len), Some(3));
    assert!(first[12].starts_with("Log-"));
    assert!(first[13].contains("(final)"));
}

#[test]
fn test_step_without_options_keeps_one_row() {
    let data = workshop();
    let steps = vec![PlanStep::note_only("skill_smithing", 4, "stuck here")];
    let rows = csv_rows(&render_plan_csv(&steps, &data).unwrap());
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][..4], &["Smithing", "4", "4", "stuck here"]);
    assert!(rows[1][4..].iter().all(String::is_empty));
}

// ============================================================================
// Shopping list
// ============================================================================

#[test]
fn test_shopping_list_sums_recommended_options() {
    let data = workshop();
    let config = PlannerConfig::default();
    let plan = Planner::new(&data, &profile(&[("skill_smithing", 1, 3)]), &config).plan();

    let items = shopping_list(&plan.steps, &data);
    let expected_logs: u64 = plan
        .steps
        .iter()
        .filter_map(|s| s.options.first())
        .flat_map(|o| o.materials.iter())
        .filter(|(item, _)| item == "item_log")
        .map(|(_, qty)| qty)
        .sum();
    let logs = items.iter().find(|i| i.item_key == "item_log").unwrap();
    assert_eq!(logs.qty, expected_logs);
    assert!(items.windows(2).all(|w| w[0].item_key < w[1].item_key));

    let mut buf = Vec::new();
    write_shopping_csv(&mut buf, &items).unwrap();
    let rows = csv_rows(std::str::from_utf8(&buf).unwrap());
    assert_eq!(rows[0], vec!["item_key", "item_name", "qty"]);
    assert_eq!(rows.len(), items.len() + 1);
}

#[test]
fn test_empty_shopping_list_has_header() {
    let mut buf = Vec::new();
    write_shopping_csv(&mut buf, &[]).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap().trim(), "item_key,item_name,qty");
}

// ============================================================================
// Guide
// ============================================================================

#[test]
fn test_guide_lists_every_step() {
    let data = workshop();
    let config = PlannerConfig::default();
    let plan = Planner::new(&data, &profile(&[("skill_smithing", 1, 3)]), &config).plan();

    let guide = render_guide(&plan.steps, &data);
    for n in 1..=plan.steps.len() {
        assert!(guide.contains(&format!("Step {}:", n)));
    }
    assert!(guide.contains("Note: Unlock required equipment"));
    assert!(guide.contains("Recommended: plank"));
    assert!(guide.contains("Expansion:"));
}

#[test]
fn test_guide_marks_blocked_step() {
    let data = workshop();
    let steps = vec![PlanStep::note_only("skill_smithing", 2, "blocked")];
    let guide = render_guide(&steps, &data);
    assert!(guide.starts_with("Step 1: Smithing 2 -> 2"));
    assert!(guide.contains("No feasible options"));
}

// ============================================================================
// Demo bundle
// ============================================================================

#[test]
fn test_demo_bundle_plans_and_renders() {
    let config = PlannerConfig::load(&demo_path("planner.toml")).unwrap();
    let mut data = GameData::load(&demo_path("demo_game.toml")).unwrap();
    data.materials = MaterialPreferences::load(&demo_path("demo_materials.json")).unwrap();
    let profile = Profile::load(&demo_path("demo_profile.json")).unwrap();
    assert!(profile.avoid_relics);

    let plan = Planner::new(&data, &profile, &config).plan();
    assert!(plan.is_complete(), "outcome: {:?}", plan.outcome);
    assert!(plan
        .steps
        .iter()
        .flat_map(|s| s.options.iter())
        .all(|o| o.recipe_key != "recipe_amber_brooch" && o.recipe_key != "recipe_debug_bolt"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("level_plan_materials.csv");
    write_shopping_csv(File::create(&path).unwrap(), &shopping_list(&plan.steps, &data)).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("item_key,item_name,qty"));
    assert!(!written.contains("item_relic_amber"));
}
