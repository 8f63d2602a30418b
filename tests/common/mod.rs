//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;

use craft_leveler::core::types::Level;
use craft_leveler::data::{EquipmentOwnership, GameData, Profile, Recipe, SkillProgress, XpTable};

pub fn recipe(key: &str, skill: &str, unlock: Level, difficulty: Level) -> Recipe {
    Recipe {
        key: key.into(),
        name: key.trim_start_matches("recipe_").replace('_', " "),
        skill: skill.into(),
        unlock_level: unlock,
        difficulty,
        xp_multiplier: 1.0,
        inputs: vec![],
        outputs: vec![],
        equipment: None,
        dev_only: false,
        grants_xp: true,
    }
}

pub fn io(items: &[(&str, u32)]) -> Vec<(String, u32)> {
    items.iter().map(|(k, q)| (k.to_string(), *q)).collect()
}

pub fn tables(skills: &[(&str, u64)]) -> BTreeMap<String, XpTable> {
    skills
        .iter()
        .map(|(skill, xp)| (skill.to_string(), XpTable::new(vec![*xp; 40])))
        .collect()
}

/// Profile with `(skill, current, target)` entries
pub fn profile(skills: &[(&str, Level, Level)]) -> Profile {
    let mut profile = Profile::default();
    for (skill, current, target) in skills {
        profile
            .skills
            .insert(skill.to_string(), SkillProgress::new(*current, 0, *target));
    }
    profile
}

pub fn own(profile: &mut Profile, equipment: &str, owned: bool) {
    profile.equipment.insert(
        equipment.to_string(),
        EquipmentOwnership { name: None, owned },
    );
}

/// Smithing needs an anvil; carpentry builds it from level 3
pub fn workshop() -> GameData {
    let mut plank = recipe("recipe_plank", "skill_carpentry", 1, 2);
    plank.inputs = io(&[("item_log", 1)]);
    plank.outputs = io(&[("item_plank", 1)]);

    let mut anvil = recipe("recipe_build_anvil", "skill_carpentry", 3, 3);
    anvil.inputs = io(&[("item_plank", 2)]);
    anvil.outputs = io(&[("crafter_anvil", 1)]);
    anvil.grants_xp = false;

    let mut nail = recipe("recipe_nail", "skill_smithing", 1, 3);
    nail.inputs = io(&[("item_raw_iron", 1)]);
    nail.outputs = io(&[("item_nail", 1)]);
    nail.equipment = Some("crafter_anvil".into());

    GameData::from_recipes(
        vec![plank, anvil, nail],
        tables(&[("skill_carpentry", 200), ("skill_smithing", 200)]),
    )
}

/// Tailoring needs ingots smelted at difficulty 4
pub fn needlework() -> GameData {
    let mut ingot = recipe("recipe_ingot", "skill_smelting", 1, 4);
    ingot.inputs = io(&[("item_raw_ore", 2)]);
    ingot.outputs = io(&[("item_ingot", 1)]);

    let mut needle = recipe("recipe_needle", "skill_tailoring", 1, 5);
    needle.inputs = io(&[("item_ingot", 1)]);
    needle.outputs = io(&[("item_needle", 1)]);

    GameData::from_recipes(
        vec![ingot, needle],
        tables(&[("skill_smelting", 150), ("skill_tailoring", 300)]),
    )
}
