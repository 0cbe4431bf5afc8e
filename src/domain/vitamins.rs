//! Static vitamin/nutrient reference data behind the vitamins,
//! vitamin-info and vitamin-side-effects routes.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitaminInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub food_sources: &'static [&'static str],
    pub deficiency_signs: &'static [&'static str],
    pub side_effects: &'static [&'static str],
}

pub const VITAMINS: &[VitaminInfo] = &[
    VitaminInfo {
        name: "Vitamin A",
        description: "Supports vision, growth and immune function.",
        food_sources: &["carrots", "sweet potato", "spinach", "liver", "eggs"],
        deficiency_signs: &["slow growth", "night blindness", "sensitivity to light"],
        side_effects: &["nausea", "headache", "liver damage at very high doses"],
    },
    VitaminInfo {
        name: "Vitamin B12",
        description: "Needed for red blood cell formation and nerve function.",
        food_sources: &["eggs", "dairy", "fish", "lean meat", "fortified cereals"],
        deficiency_signs: &["mood changes", "poor appetite", "frequent colds"],
        side_effects: &["generally well tolerated; rare acne-like rash"],
    },
    VitaminInfo {
        name: "Vitamin C",
        description: "Antioxidant that aids iron absorption and tissue repair.",
        food_sources: &["citrus fruit", "bell peppers", "strawberries", "broccoli"],
        deficiency_signs: &["swollen gums", "frequent bruising", "slow wound healing"],
        side_effects: &["diarrhea and stomach cramps above 2g per day"],
    },
    VitaminInfo {
        name: "Vitamin D",
        description: "Regulates calcium and supports bone and immune health.",
        food_sources: &["fatty fish", "fortified milk", "egg yolks", "mushrooms"],
        deficiency_signs: &["dry skin", "hair loss", "brittle nails", "joint pain"],
        side_effects: &["hypercalcemia with prolonged high-dose supplements"],
    },
    VitaminInfo {
        name: "Iron",
        description: "Carries oxygen in the blood; deficiency causes anemia.",
        food_sources: &["red meat", "lentils", "chickpeas", "fortified cereals"],
        deficiency_signs: &["fatigue", "pale skin", "restless legs"],
        side_effects: &["constipation", "nausea", "dark stools"],
    },
    VitaminInfo {
        name: "Magnesium",
        description: "Involved in muscle, nerve and sleep regulation.",
        food_sources: &["almonds", "cashews", "pumpkin seeds", "leafy greens"],
        deficiency_signs: &["muscle cramps", "insomnia"],
        side_effects: &["loose stools from oxide-form supplements"],
    },
    VitaminInfo {
        name: "Omega-3 Fatty Acids",
        description: "Essential fats supporting brain, eye and joint health.",
        food_sources: &["oily fish", "walnuts", "flaxseed", "chia seeds"],
        deficiency_signs: &["low attention span", "joint pain", "dry eyes"],
        side_effects: &["fishy aftertaste", "mild blood thinning at high doses"],
    },
    VitaminInfo {
        name: "Fiber",
        description: "Indigestible plant matter that keeps digestion regular.",
        food_sources: &["whole grains", "legumes", "fruit", "vegetables"],
        deficiency_signs: &["constipation", "diarrhea", "skin rashes"],
        side_effects: &["bloating when intake rises faster than fluid intake"],
    },
];

/// Case- and punctuation-insensitive lookup, so `vitamin-a`, `VitaminA`
/// and `Vitamin A` all resolve to the same record.
pub fn find(name: &str) -> Option<&'static VitaminInfo> {
    let wanted = normalize(name);
    VITAMINS.iter().find(|v| normalize(v.name) == wanted)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_separators() {
        assert!(find("vitamin-a").is_some());
        assert!(find("VitaminA").is_some());
        assert!(find("Omega 3 Fatty Acids").is_some());
        assert!(find("vitamin z").is_none());
    }

    #[test]
    fn every_entry_has_sources_and_side_effects() {
        for vitamin in VITAMINS {
            assert!(!vitamin.food_sources.is_empty(), "{}", vitamin.name);
            assert!(!vitamin.side_effects.is_empty(), "{}", vitamin.name);
        }
    }
}
