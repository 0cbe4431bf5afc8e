//! Calorie-tracker domain: meal types, the eat-food warning checks and
//! history gap filling. Pure functions so the SQL layer stays thin.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Minimum minutes between two logged foods before the "too quick"
/// warning fires.
pub const MIN_TIME_BETWEEN_MEALS_MIN: i64 = 15;
/// Daily calorie budget for the over-limit warning.
pub const DAILY_CALORIE_LIMIT: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];
}

impl TryFrom<&str> for MealType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EatWarnings {
    pub consecutive_day_warning: bool,
    pub too_quick_warning: bool,
    pub calorie_limit_warning: bool,
}

/// Evaluates the three insert-time warnings:
/// the same food yesterday, a previous entry within the minimum gap,
/// and the new entry pushing today's total over the daily limit.
pub fn evaluate_warnings(
    eaten_yesterday: bool,
    total_calories_today: f64,
    last_eaten_at: Option<DateTime<Utc>>,
    new_calories: f64,
    now: DateTime<Utc>,
) -> EatWarnings {
    let too_quick_warning = last_eaten_at
        .map(|last| now.signed_duration_since(last).num_minutes() < MIN_TIME_BETWEEN_MEALS_MIN)
        .unwrap_or(false);

    EatWarnings {
        consecutive_day_warning: eaten_yesterday,
        too_quick_warning,
        calorie_limit_warning: total_calories_today + new_calories > DAILY_CALORIE_LIMIT,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MealBreakdown {
    pub breakfast: u32,
    pub lunch: u32,
    pub dinner: u32,
    pub snack: u32,
}

impl MealBreakdown {
    /// Counts entries from the `GROUP_CONCAT(meal_type)` column; unknown
    /// values count as snacks.
    pub fn from_concat(meal_types: Option<&str>) -> Self {
        let mut breakdown = MealBreakdown::default();
        let Some(raw) = meal_types else {
            return breakdown;
        };
        for entry in raw.split(',').filter(|s| !s.is_empty()) {
            match MealType::try_from(entry).unwrap_or(MealType::Snack) {
                MealType::Breakfast => breakdown.breakfast += 1,
                MealType::Lunch => breakdown.lunch += 1,
                MealType::Dinner => breakdown.dinner += 1,
                MealType::Snack => breakdown.snack += 1,
            }
        }
        breakdown
    }
}

/// One aggregated day as it comes back from the history query.
#[derive(Debug, Clone)]
pub struct DayRow {
    pub eaten_date: String,
    pub count: i64,
    pub total_calories: f64,
    pub total_fat: f64,
    pub total_carbs: f64,
    pub total_protein: f64,
    pub meal_types: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHistory {
    pub date: String,
    pub count: i64,
    pub total_calories: f64,
    pub total_fat: f64,
    pub total_carbs: f64,
    pub total_protein: f64,
    pub meal_breakdown: MealBreakdown,
}

/// Expands aggregated rows into one entry per calendar day over
/// `[start, end]`, zero-filling days without any logged food.
pub fn fill_history(start: NaiveDate, end: NaiveDate, rows: Vec<DayRow>) -> Vec<DayHistory> {
    let mut history = Vec::new();
    let mut day = start;
    while day <= end {
        let date = day.format("%Y-%m-%d").to_string();
        let entry = match rows.iter().find(|row| row.eaten_date == date) {
            Some(row) => DayHistory {
                date,
                count: row.count,
                total_calories: row.total_calories,
                total_fat: row.total_fat,
                total_carbs: row.total_carbs,
                total_protein: row.total_protein,
                meal_breakdown: MealBreakdown::from_concat(row.meal_types.as_deref()),
            },
            None => DayHistory {
                date,
                count: 0,
                total_calories: 0.0,
                total_fat: 0.0,
                total_carbs: 0.0,
                total_protein: 0.0,
                meal_breakdown: MealBreakdown::default(),
            },
        };
        history.push(entry);
        day += Duration::days(1);
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn warnings_all_clear_on_first_entry() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let warnings = evaluate_warnings(false, 0.0, None, 500.0, now);
        assert!(!warnings.consecutive_day_warning);
        assert!(!warnings.too_quick_warning);
        assert!(!warnings.calorie_limit_warning);
    }

    #[test]
    fn too_quick_within_fifteen_minutes() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let ten_min_ago = now - Duration::minutes(10);
        let warnings = evaluate_warnings(false, 300.0, Some(ten_min_ago), 200.0, now);
        assert!(warnings.too_quick_warning);

        let twenty_min_ago = now - Duration::minutes(20);
        let warnings = evaluate_warnings(false, 300.0, Some(twenty_min_ago), 200.0, now);
        assert!(!warnings.too_quick_warning);
    }

    #[test]
    fn limit_warning_counts_new_entry() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let warnings = evaluate_warnings(false, 1900.0, None, 150.0, now);
        assert!(warnings.calorie_limit_warning);
        // Exactly at the limit is still fine.
        let warnings = evaluate_warnings(false, 1900.0, None, 100.0, now);
        assert!(!warnings.calorie_limit_warning);
    }

    #[test]
    fn meal_breakdown_defaults_unknown_to_snack() {
        let breakdown = MealBreakdown::from_concat(Some("breakfast,lunch,brunch,snack"));
        assert_eq!(breakdown.breakfast, 1);
        assert_eq!(breakdown.lunch, 1);
        assert_eq!(breakdown.snack, 2);
        assert_eq!(breakdown.dinner, 0);
    }

    #[test]
    fn history_fills_missing_days() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let rows = vec![DayRow {
            eaten_date: "2024-03-02".to_string(),
            count: 2,
            total_calories: 800.0,
            total_fat: 30.0,
            total_carbs: 90.0,
            total_protein: 40.0,
            meal_types: Some("breakfast,dinner".to_string()),
        }];

        let history = fill_history(start, end, rows);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].count, 0);
        assert_eq!(history[1].total_calories, 800.0);
        assert_eq!(history[1].meal_breakdown.dinner, 1);
        assert_eq!(history[2].date, "2024-03-03");
    }
}
