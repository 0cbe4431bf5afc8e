//! Calorie-tracker store: the append-only `eaten_foods` log plus the
//! aggregate queries behind the dashboard. Nutrition facts live in a
//! JSON text column and are read back with `json_extract`.

use crate::domain::meals::DayRow;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

/// Creates the table on startup; the nutrition store is not migrated,
/// it only ever has this one table.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS eaten_foods (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            food_name      TEXT NOT NULL,
            nutrition_data TEXT NOT NULL,
            eaten_date     TEXT NOT NULL,         -- YYYY-MM-DD
            eaten_at       TEXT NOT NULL,         -- full ISO timestamp
            meal_type      TEXT DEFAULT 'snack'
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_eaten(
    pool: &SqlitePool,
    food_name: &str,
    nutrition_data: &str,
    eaten_date: &str,
    eaten_at: DateTime<Utc>,
    meal_type: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO eaten_foods (food_name, nutrition_data, eaten_date, eaten_at, meal_type)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(food_name)
    .bind(nutrition_data)
    .bind(eaten_date)
    .bind(eaten_at)
    .bind(meal_type)
    .execute(pool)
    .await?;
    Ok(())
}

/// Whether the same food was already logged on the given date; drives
/// the consecutive-day warning.
pub async fn food_eaten_on(pool: &SqlitePool, food_name: &str, date: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM eaten_foods WHERE food_name = ?1 AND eaten_date = ?2",
    )
    .bind(food_name)
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

#[derive(Debug, FromRow)]
pub struct TodayEntry {
    pub calories: Option<f64>,
    pub eaten_at: DateTime<Utc>,
}

/// Calories and timestamps for one day, for the too-quick and
/// over-limit checks.
pub async fn entries_for_date(pool: &SqlitePool, date: &str) -> Result<Vec<TodayEntry>> {
    let rows = sqlx::query_as::<_, TodayEntry>(
        r#"
        SELECT CAST(json_extract(nutrition_data, '$.nf_calories') AS REAL) AS calories, eaten_at
        FROM eaten_foods
        WHERE eaten_date = ?1
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[derive(Debug, FromRow)]
pub struct FoodRow {
    pub nutrition_data: String,
    pub meal_type: String,
}

pub async fn foods_for_date(pool: &SqlitePool, date: &str) -> Result<Vec<FoodRow>> {
    let rows = sqlx::query_as::<_, FoodRow>(
        "SELECT nutrition_data, meal_type FROM eaten_foods WHERE eaten_date = ?1",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    eaten_date: String,
    count: i64,
    total_calories: Option<f64>,
    total_fat: Option<f64>,
    total_carbs: Option<f64>,
    total_protein: Option<f64>,
    meal_types: Option<String>,
}

pub async fn history_rows(pool: &SqlitePool, start: &str, end: &str) -> Result<Vec<DayRow>> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT eaten_date,
               COUNT(*) AS count,
               CAST(SUM(json_extract(nutrition_data, '$.nf_calories')) AS REAL) AS total_calories,
               CAST(SUM(json_extract(nutrition_data, '$.nf_total_fat')) AS REAL) AS total_fat,
               CAST(SUM(json_extract(nutrition_data, '$.nf_total_carbohydrate')) AS REAL) AS total_carbs,
               CAST(SUM(json_extract(nutrition_data, '$.nf_protein')) AS REAL) AS total_protein,
               GROUP_CONCAT(meal_type) AS meal_types
        FROM eaten_foods
        WHERE eaten_date BETWEEN ?1 AND ?2
        GROUP BY eaten_date
        ORDER BY eaten_date
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| DayRow {
            eaten_date: row.eaten_date,
            count: row.count,
            total_calories: row.total_calories.unwrap_or(0.0),
            total_fat: row.total_fat.unwrap_or(0.0),
            total_carbs: row.total_carbs.unwrap_or(0.0),
            total_protein: row.total_protein.unwrap_or(0.0),
            meal_types: row.meal_types,
        })
        .collect())
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealTimingRow {
    pub hour: i64,
    pub meal_type: String,
    pub avg_calories: f64,
    pub count: i64,
}

#[derive(Debug, FromRow)]
struct MealTimingRaw {
    hour: Option<String>,
    avg_calories: Option<f64>,
    meal_type: String,
    count: i64,
}

pub async fn meal_timing(pool: &SqlitePool) -> Result<Vec<MealTimingRow>> {
    let rows = sqlx::query_as::<_, MealTimingRaw>(
        r#"
        SELECT strftime('%H', eaten_at) AS hour,
               AVG(json_extract(nutrition_data, '$.nf_calories')) AS avg_calories,
               meal_type,
               COUNT(*) AS count
        FROM eaten_foods
        GROUP BY hour, meal_type
        ORDER BY hour
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| MealTimingRow {
            hour: row
                .hour
                .and_then(|h| h.parse::<i64>().ok())
                .unwrap_or_default(),
            meal_type: row.meal_type,
            avg_calories: row.avg_calories.unwrap_or(0.0),
            count: row.count,
        })
        .collect())
}

#[derive(Debug, FromRow)]
pub struct DistributionRow {
    pub meal_type: String,
    pub calories: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
}

pub async fn nutrient_distribution(pool: &SqlitePool, date: &str) -> Result<Vec<DistributionRow>> {
    let rows = sqlx::query_as::<_, DistributionRow>(
        r#"
        SELECT meal_type,
               CAST(SUM(json_extract(nutrition_data, '$.nf_calories')) AS REAL) AS calories,
               CAST(SUM(json_extract(nutrition_data, '$.nf_total_fat')) AS REAL) AS fat,
               CAST(SUM(json_extract(nutrition_data, '$.nf_total_carbohydrate')) AS REAL) AS carbs,
               CAST(SUM(json_extract(nutrition_data, '$.nf_protein')) AS REAL) AS protein
        FROM eaten_foods
        WHERE eaten_date = ?1
        GROUP BY meal_type
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
