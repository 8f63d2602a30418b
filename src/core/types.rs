//! Core type definitions used throughout the codebase

/// Key of an item (material, intermediate, or equipment)
pub type ItemKey = String;

/// Key of a recipe
pub type RecipeKey = String;

/// Key of a skill (progression track)
pub type SkillKey = String;

/// Key of a piece of equipment / crafting station
pub type EquipmentKey = String;

/// Discrete skill level
pub type Level = u32;

/// Tolerance used when comparing accumulated floating-point XP
pub const XP_EPSILON: f64 = 1e-6;

/// Format a skill/item key as a readable fallback label.
///
/// `skill_leather_working` -> `Leather Working`
pub fn humanize_key(key: &str) -> String {
    let trimmed = key
        .strip_prefix("skill_")
        .or_else(|| key.strip_prefix("item_"))
        .unwrap_or(key);
    trimmed
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_strips_prefix() {
        assert_eq!(humanize_key("skill_leather_working"), "Leather Working");
        assert_eq!(humanize_key("item_iron_ingot"), "Iron Ingot");
    }

    #[test]
    fn test_humanize_plain_key() {
        assert_eq!(humanize_key("crafter_forge"), "Crafter Forge");
        assert_eq!(humanize_key(""), "");
    }
}
