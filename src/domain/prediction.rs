//! Symptom-based deficiency prediction and diet-plan generation.
//!
//! Both are static rule tables evaluated against the submitted form; no
//! scoring or model behind them.

use serde::{Deserialize, Serialize};

/// Boolean symptom flags submitted under `signsSymptoms`. Unknown keys
/// are ignored, missing keys default to `false`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SymptomFlags {
    pub fatigue: bool,
    pub pale_skin: bool,
    pub pale_conjunctiva: bool,
    pub frequent_bruising: bool,
    pub restless_legs_syndrome: bool,
    pub dry_skin: bool,
    pub hair_loss: bool,
    pub brittle_nails: bool,
    pub frequent_headaches: bool,
    pub joint_pain: bool,
    pub mood_changes: bool,
    pub poor_appetite: bool,
    pub frequent_colds: bool,
    pub swollen_gums: bool,
    pub slow_growth: bool,
    pub no_weight_gain: bool,
    pub delayed_walking: bool,
    pub sensitivity_to_light: bool,
    pub diarrhea: bool,
    pub constipation: bool,
    pub skin_rashes: bool,
    pub low_attention_span: bool,
    pub squinting: bool,
    pub muscle_cramps: bool,
    pub insomnia: bool,
}

pub const NO_DEFICIENCY: &str = "No specific deficiency detected";

/// Maps symptom flags to the list of likely deficiencies. A symptom can
/// contribute to more than one branch (joint pain counts for both
/// vitamin D and omega-3).
pub fn predict_deficiency(s: &SymptomFlags) -> Vec<String> {
    let mut deficiencies = Vec::new();

    if s.fatigue
        || s.pale_skin
        || s.pale_conjunctiva
        || s.frequent_bruising
        || s.restless_legs_syndrome
    {
        deficiencies.push("Iron Deficiency".to_string());
    }

    if s.dry_skin || s.hair_loss || s.brittle_nails || s.frequent_headaches || s.joint_pain {
        deficiencies.push("Vitamin D Deficiency".to_string());
    }

    if s.mood_changes || s.poor_appetite || s.frequent_colds || s.swollen_gums {
        deficiencies.push("Vitamin B12 Deficiency".to_string());
    }

    if s.slow_growth || s.no_weight_gain || s.delayed_walking || s.sensitivity_to_light {
        deficiencies.push("Vitamin A Deficiency".to_string());
    }

    if s.diarrhea || s.constipation || s.skin_rashes {
        deficiencies.push("Fiber Deficiency".to_string());
    }

    if s.low_attention_span || s.squinting || s.joint_pain {
        deficiencies.push("Omega-3 Fatty Acids Deficiency".to_string());
    }

    if s.muscle_cramps || s.insomnia {
        deficiencies.push("Magnesium Deficiency".to_string());
    }

    if deficiencies.is_empty() {
        deficiencies.push(NO_DEFICIENCY.to_string());
    }
    deficiencies
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlanSuggestion {
    pub plan_details: String,
    pub recommendations: Vec<String>,
}

/// Per-deficiency diet recommendations. Unrecognised deficiencies get a
/// generic plan so the endpoint never 404s on free-text input.
pub fn generate_diet_plan(vitamin_deficiency: &str) -> DietPlanSuggestion {
    let recommendations: Vec<&str> = match vitamin_deficiency.trim() {
        "Iron Deficiency" => vec![
            "Include lean red meat, poultry and fish in main meals",
            "Add lentils, chickpeas and fortified cereals",
            "Pair iron-rich foods with vitamin C sources (citrus, bell peppers) to aid absorption",
            "Avoid tea or coffee with iron-rich meals",
        ],
        "Vitamin D Deficiency" => vec![
            "Eat fatty fish (salmon, mackerel, sardines) twice a week",
            "Choose vitamin D fortified milk or plant drinks",
            "Include egg yolks and mushrooms",
            "Get 15-20 minutes of midday sunlight where possible",
        ],
        "Vitamin B12 Deficiency" => vec![
            "Include eggs, dairy, fish and lean meat regularly",
            "Use fortified nutritional yeast or cereals for vegetarian diets",
            "Consider supplements if needed after consulting a clinician",
        ],
        "Vitamin A Deficiency" => vec![
            "Add carrots, sweet potato and pumpkin to daily meals",
            "Include dark leafy greens such as spinach",
            "Serve with a little fat (oil, ghee) to help absorption",
        ],
        "Fiber Deficiency" => vec![
            "Switch to whole grains (oats, brown rice, whole wheat)",
            "Add a serving of fruit or vegetables to every meal",
            "Include legumes several times a week",
            "Increase water intake alongside fiber",
        ],
        "Omega-3 Fatty Acids Deficiency" => vec![
            "Eat oily fish twice a week",
            "Add walnuts, flaxseed and chia seeds",
            "Use rapeseed or soybean oil for cooking",
        ],
        "Magnesium Deficiency" => vec![
            "Snack on almonds, cashews and pumpkin seeds",
            "Include whole grains and dark leafy greens",
            "Add bananas and dark chocolate in moderation",
        ],
        _ => vec![
            "Eat more foods rich in the missing nutrient",
            "Consider supplements if needed after consulting a clinician",
        ],
    };

    DietPlanSuggestion {
        plan_details: format!("Diet plan for {vitamin_deficiency}"),
        recommendations: recommendations.into_iter().map(String::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_yields_fallback() {
        let result = predict_deficiency(&SymptomFlags::default());
        assert_eq!(result, vec![NO_DEFICIENCY.to_string()]);
    }

    #[test]
    fn single_flag_maps_to_one_deficiency() {
        let flags = SymptomFlags {
            fatigue: true,
            ..Default::default()
        };
        assert_eq!(predict_deficiency(&flags), vec!["Iron Deficiency"]);
    }

    #[test]
    fn joint_pain_counts_for_two_branches() {
        let flags = SymptomFlags {
            joint_pain: true,
            ..Default::default()
        };
        let result = predict_deficiency(&flags);
        assert!(result.contains(&"Vitamin D Deficiency".to_string()));
        assert!(result.contains(&"Omega-3 Fatty Acids Deficiency".to_string()));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn flags_deserialize_from_camel_case() {
        let flags: SymptomFlags =
            serde_json::from_str(r#"{"paleSkin": true, "muscleCramps": true, "unknown": 1}"#)
                .unwrap();
        assert!(flags.pale_skin);
        assert!(flags.muscle_cramps);
        let result = predict_deficiency(&flags);
        assert_eq!(result, vec!["Iron Deficiency", "Magnesium Deficiency"]);
    }

    #[test]
    fn diet_plan_known_and_unknown_deficiency() {
        let iron = generate_diet_plan("Iron Deficiency");
        assert!(iron.plan_details.contains("Iron Deficiency"));
        assert!(iron.recommendations.len() >= 3);

        let other = generate_diet_plan("Something Else");
        assert_eq!(other.recommendations.len(), 2);
    }
}
