//! Narrative step-by-step text guide

use std::fmt::Write;

use crate::data::game_data::GameData;
use crate::planner::plan::{CraftSummary, PlanStep, PlanStepOption};
use crate::report::table::materials_text;

/// Render every step as a readable block
pub fn render_guide(steps: &[PlanStep], data: &GameData) -> String {
    let mut out = String::new();
    for (idx, step) in steps.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        write_step(&mut out, idx + 1, step, data);
    }
    out
}

fn write_step(out: &mut String, number: usize, step: &PlanStep, data: &GameData) {
    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "Step {}: {} {} -> {}",
        number,
        data.skill_label(&step.skill),
        step.from_level,
        step.to_level
    );
    if let Some(note) = &step.note {
        let _ = writeln!(out, "  Note: {}", note);
    }
    let Some(option) = step.recommended() else {
        let _ = writeln!(out, "  No feasible options");
        return;
    };
    write_option(out, option, data);
    if step.options.len() > 1 {
        let alternatives: Vec<&str> = step.options[1..]
            .iter()
            .map(|o| o.recipe_name.as_str())
            .collect();
        let _ = writeln!(out, "  Alternatives: {}", alternatives.join(", "));
    }
}

fn write_option(out: &mut String, option: &PlanStepOption, data: &GameData) {
    let station = option
        .equipment
        .as_deref()
        .map(|e| format!(" at {}", data.equipment_label(e)))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "  Recommended: {} x{}{} (success {:.0}%)",
        option.recipe_name,
        option.crafts,
        station,
        option.success_chance * 100.0
    );
    let _ = writeln!(
        out,
        "  Estimated XP: {:.0} ({:.1} per craft)",
        option.total_xp, option.xp_per_craft
    );

    let totals = craft_totals(&option.craft_plan);
    let earning: Vec<_> = totals.iter().filter(|c| c.expected_xp > 0.0).collect();
    if !earning.is_empty() {
        let _ = writeln!(out, "  XP breakdown:");
        for craft in earning {
            let _ = writeln!(out, "    {} x{}: {:.0}", craft.recipe_name, craft.crafts, craft.expected_xp);
        }
    }

    if !option.materials.is_empty() {
        let _ = writeln!(out, "  Gather: {}", materials_text(&option.materials, data));
    }

    let _ = writeln!(out, "  Crafts:");
    for craft in &totals {
        let outputs = materials_text(&craft.outputs, data);
        let _ = writeln!(
            out,
            "    {} x{} [{}]{}",
            craft.recipe_name,
            craft.crafts,
            data.skill_label(&craft.skill),
            if outputs.is_empty() {
                String::new()
            } else {
                format!(" -> {}", outputs)
            }
        );
    }

    if !option.prereq_gaps.is_empty() {
        for gap in &option.prereq_gaps {
            let _ = writeln!(
                out,
                "  Needs {} level {} for {}",
                data.skill_label(&gap.skill),
                gap.required_level,
                data.item_label(&gap.item)
            );
        }
    }

    let _ = writeln!(out, "  Expansion:");
    for line in &option.trace {
        let _ = writeln!(out, "    {}", line);
    }
}

/// Per-recipe totals keyed by (recipe, skill), in first-seen order
fn craft_totals(crafts: &[CraftSummary]) -> Vec<CraftSummary> {
    let mut totals: Vec<CraftSummary> = Vec::new();
    for craft in crafts {
        let existing = totals
            .iter_mut()
            .find(|t| t.recipe_key == craft.recipe_key && t.skill == craft.skill);
        let Some(total) = existing else {
            totals.push(craft.clone());
            continue;
        };
        total.crafts += craft.crafts;
        total.expected_xp += craft.expected_xp;
        for (item, qty) in &craft.outputs {
            match total.outputs.iter_mut().find(|(k, _)| k == item) {
                Some((_, sum)) => *sum += qty,
                None => total.outputs.push((item.clone(), *qty)),
            }
        }
    }
    totals
}
