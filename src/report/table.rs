//! CSV plan table: one row per option per step

use std::io;

use crate::core::error::Result;
use crate::core::types::ItemKey;
use crate::data::game_data::GameData;
use crate::planner::plan::PlanStep;

pub const PLAN_HEADER: [&str; 14] = [
    "skill",
    "from_level",
    "to_level",
    "note",
    "option_rank",
    "recipe_key",
    "recipe_name",
    "equipment",
    "crafts",
    "xp_per_craft",
    "total_xp",
    "material_burden",
    "materials",
    "materials_tree",
];

/// Materials as `Name-qty` joined by `; `
pub fn materials_text(materials: &[(ItemKey, u64)], data: &GameData) -> String {
    materials
        .iter()
        .map(|(item, qty)| format!("{}-{}", data.item_label(item), qty))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Write the plan table; steps without options get one row with empty
/// option columns
pub fn write_plan_csv<W: io::Write>(writer: W, steps: &[PlanStep], data: &GameData) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(PLAN_HEADER)?;

    for step in steps {
        let skill = data.skill_label(&step.skill);
        let from = step.from_level.to_string();
        let to = step.to_level.to_string();
        let note = step.note.clone().unwrap_or_default();

        if step.options.is_empty() {
            csv.write_record([
                skill.as_str(),
                from.as_str(),
                to.as_str(),
                note.as_str(),
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
            ])?;
            continue;
        }

        for (rank, option) in step.options.iter().enumerate() {
            let equipment = option
                .equipment
                .as_deref()
                .map(|e| data.equipment_label(e))
                .unwrap_or_default();
            csv.write_record([
                skill.clone(),
                from.clone(),
                to.clone(),
                note.clone(),
                (rank + 1).to_string(),
                option.recipe_key.clone(),
                option.recipe_name.clone(),
                equipment,
                option.crafts.to_string(),
                format!("{:.2}", option.xp_per_craft),
                format!("{:.2}", option.total_xp),
                format!("{:.3}", option.material_burden),
                materials_text(&option.materials, data),
                option.materials_tree(),
            ])?;
        }
    }

    csv.flush()?;
    Ok(())
}

/// Render the plan table into a string
pub fn render_plan_csv(steps: &[PlanStep], data: &GameData) -> Result<String> {
    let mut buf = Vec::new();
    write_plan_csv(&mut buf, steps, data)?;
    String::from_utf8(buf).map_err(|e| crate::core::error::PlannerError::InvalidData(e.to_string()))
}
