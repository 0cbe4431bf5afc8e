//! Calorie tracker routes: the Nutritionix proxy, the eat-food log and
//! the dashboard aggregates. All of these run against the separate
//! nutrition store.

use crate::db::calories as store;
use crate::domain::meals::{self, MealType};
use crate::services::nutrition::NutritionError;
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/nutrition", post(nutrition_search))
        .route("/eat-food", post(eat_food))
        .route("/eaten-foods", get(eaten_today))
        .route("/eaten-foods-by-date/:date", get(eaten_by_date))
        .route("/history", get(history))
        .route("/meal-timing", get(meal_timing))
        .route("/nutrient-distribution", get(nutrient_distribution))
        .with_state(state)
}

#[derive(Deserialize)]
struct NutritionQuery {
    query: Option<String>,
}

async fn nutrition_search(
    State(state): State<SharedState>,
    Json(payload): Json<NutritionQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let query = payload.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let body = state
        .nutrition
        .natural_nutrients(&query)
        .await
        .map_err(|e| match e {
            NutritionError::MissingCredentials => {
                tracing::error!("nutrition credentials missing");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            NutritionError::Upstream(status) => {
                tracing::warn!("nutrition API returned {}", status);
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            NutritionError::Request(err) => {
                tracing::error!("nutrition request failed: {}", err);
                StatusCode::BAD_GATEWAY
            }
        })?;

    Ok(Json(body))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EatFoodRequest {
    food: Value,
    demo_date: Option<String>,
    meal_type: Option<String>,
}

async fn eat_food(
    State(state): State<SharedState>,
    Json(payload): Json<EatFoodRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(food_name) = payload.food.get("food_name").and_then(Value::as_str) else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let Some(calories) = payload.food.get("nf_calories").and_then(Value::as_f64) else {
        return Err(StatusCode::BAD_REQUEST);
    };

    // A demo date shifts the whole clock, not just the date column, so
    // the timing checks and the hourly aggregates both see the demo
    // timeline.
    let now = match payload.demo_date.as_deref() {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| StatusCode::BAD_REQUEST)?;
            Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        }
        None => Utc::now(),
    };
    let date = now.date_naive();
    let date_str = date.format("%Y-%m-%d").to_string();
    let yesterday = (date - Duration::days(1)).format("%Y-%m-%d").to_string();

    let meal_type = payload
        .meal_type
        .as_deref()
        .and_then(|raw| MealType::try_from(raw).ok())
        .unwrap_or(MealType::Snack);

    let eaten_yesterday = store::food_eaten_on(&state.nutrition_pool, food_name, &yesterday)
        .await
        .map_err(|e| {
            tracing::error!("consecutive-day check failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let entries = store::entries_for_date(&state.nutrition_pool, &date_str)
        .await
        .map_err(|e| {
            tracing::error!("failed to load today's entries: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    let total_today: f64 = entries.iter().filter_map(|e| e.calories).sum();
    let last_eaten_at = entries.iter().map(|e| e.eaten_at).max();

    let warnings = meals::evaluate_warnings(eaten_yesterday, total_today, last_eaten_at, calories, now);

    let nutrition_data =
        serde_json::to_string(&payload.food).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    store::insert_eaten(
        &state.nutrition_pool,
        food_name,
        &nutrition_data,
        &date_str,
        now,
        meal_type.as_str(),
    )
    .await
    .map_err(|e| {
        tracing::error!("failed to store eaten food: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Food logged successfully",
            "warnings": warnings,
        })),
    ))
}

async fn eaten_today(State(state): State<SharedState>) -> Result<impl IntoResponse, StatusCode> {
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    foods_response(&state, &today).await
}

async fn eaten_by_date(
    State(state): State<SharedState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| StatusCode::BAD_REQUEST)?;
    foods_response(&state, &date).await
}

/// Flattens the stored nutrition JSON and attaches `meal_type`,
/// matching what the tracker UI consumed.
async fn foods_response(
    state: &SharedState,
    date: &str,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let rows = store::foods_for_date(&state.nutrition_pool, date)
        .await
        .map_err(|e| {
            tracing::error!("failed to list eaten foods: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let foods = rows
        .into_iter()
        .map(|row| {
            let mut food: Value =
                serde_json::from_str(&row.nutrition_data).unwrap_or_else(|_| json!({}));
            if let Some(object) = food.as_object_mut() {
                object.insert("meal_type".to_string(), json!(row.meal_type));
            }
            food
        })
        .collect();

    Ok(Json(foods))
}

#[derive(Deserialize)]
struct HistoryQuery {
    days: Option<i64>,
}

async fn history(
    State(state): State<SharedState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let days = query.days.unwrap_or(30).clamp(1, 365);
    let end = Utc::now().date_naive();
    let start = end - Duration::days(days - 1);

    let rows = store::history_rows(
        &state.nutrition_pool,
        &start.format("%Y-%m-%d").to_string(),
        &end.format("%Y-%m-%d").to_string(),
    )
    .await
    .map_err(|e| {
        tracing::error!("history query failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(meals::fill_history(start, end, rows)))
}

async fn meal_timing(State(state): State<SharedState>) -> Result<impl IntoResponse, StatusCode> {
    let rows = store::meal_timing(&state.nutrition_pool).await.map_err(|e| {
        tracing::error!("meal timing query failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
struct DistributionQuery {
    date: Option<String>,
}

async fn nutrient_distribution(
    State(state): State<SharedState>,
    Query(query): Query<DistributionQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let date = match query.date {
        Some(raw) => {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| StatusCode::BAD_REQUEST)?;
            raw
        }
        None => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
    };

    let rows = store::nutrient_distribution(&state.nutrition_pool, &date)
        .await
        .map_err(|e| {
            tracing::error!("nutrient distribution query failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    // Every known meal type is present even when nothing was logged for
    // it; rows with an unrecognised meal_type are dropped.
    let mut distribution = Map::new();
    for meal in MealType::ALL {
        distribution.insert(
            meal.as_str().to_string(),
            json!({ "calories": 0.0, "fat": 0.0, "carbs": 0.0, "protein": 0.0 }),
        );
    }
    for row in rows {
        let Ok(meal) = MealType::try_from(row.meal_type.as_str()) else {
            continue;
        };
        distribution.insert(
            meal.as_str().to_string(),
            json!({
                "calories": row.calories.unwrap_or(0.0),
                "fat": row.fat.unwrap_or(0.0),
                "carbs": row.carbs.unwrap_or(0.0),
                "protein": row.protein.unwrap_or(0.0),
            }),
        );
    }

    Ok(Json(Value::Object(distribution)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::calories::{entries_for_date, insert_eaten};
    use crate::state::test_state;
    use axum::body::to_bytes;
    use axum::response::{IntoResponse, Response};

    fn eat_request(food_name: &str, calories: f64, demo_date: Option<&str>) -> EatFoodRequest {
        EatFoodRequest {
            food: json!({ "food_name": food_name, "nf_calories": calories }),
            demo_date: demo_date.map(String::from),
            meal_type: None,
        }
    }

    async fn response_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn demo_date_drives_the_stored_timestamp() {
        let state = test_state().await;

        let response = eat_food(
            State(state.clone()),
            Json(eat_request("oatmeal", 300.0, Some("2020-01-01"))),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        // eaten_at follows the demo day, not the wall clock, so the
        // hourly aggregates see the demo timeline.
        let entries = entries_for_date(&state.nutrition_pool, "2020-01-01")
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].eaten_at.date_naive().to_string(), "2020-01-01");
    }

    #[tokio::test]
    async fn demo_entries_share_the_demo_clock() {
        let state = test_state().await;

        eat_food(
            State(state.clone()),
            Json(eat_request("toast", 200.0, Some("2020-01-01"))),
        )
        .await
        .unwrap();

        // Second entry on the same demo day lands zero minutes after the
        // first on the demo clock.
        let response = eat_food(
            State(state.clone()),
            Json(eat_request("eggs", 150.0, Some("2020-01-01"))),
        )
        .await
        .unwrap()
        .into_response();
        let body = response_json(response).await;
        assert_eq!(body["warnings"]["tooQuickWarning"], json!(true));
        assert_eq!(body["warnings"]["consecutiveDayWarning"], json!(false));
    }

    #[tokio::test]
    async fn distribution_is_a_flat_map_of_known_meal_types() {
        let state = test_state().await;
        let at = Utc.with_ymd_and_hms(2021, 5, 1, 8, 0, 0).unwrap();
        let eggs = r#"{"food_name":"eggs","nf_calories":150.0,"nf_total_fat":10.0,"nf_total_carbohydrate":1.0,"nf_protein":12.0}"#;
        let cake = r#"{"food_name":"cake","nf_calories":400.0,"nf_total_fat":18.0,"nf_total_carbohydrate":55.0,"nf_protein":5.0}"#;
        insert_eaten(&state.nutrition_pool, "eggs", eggs, "2021-05-01", at, "breakfast")
            .await
            .unwrap();
        insert_eaten(&state.nutrition_pool, "cake", cake, "2021-05-01", at, "brunch")
            .await
            .unwrap();

        let response = nutrient_distribution(
            State(state),
            Query(DistributionQuery {
                date: Some("2021-05-01".to_string()),
            }),
        )
        .await
        .unwrap()
        .into_response();
        let body = response_json(response).await;

        let map = body.as_object().expect("flat object");
        assert_eq!(map.len(), 4);
        assert!(map.contains_key("breakfast"));
        assert!(!map.contains_key("brunch"));
        assert!(!map.contains_key("date"));
        assert_eq!(body["breakfast"]["calories"], json!(150.0));
        assert_eq!(body["lunch"]["calories"], json!(0.0));
    }
}
