//! Diet-plan generation from a predicted deficiency.

use crate::db;
use crate::domain::prediction::generate_diet_plan;
use crate::state::SharedState;
use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use serde_json::{json, Value};

pub fn router(state: SharedState) -> Router {
    Router::new().route("/", post(submit)).with_state(state)
}

async fn submit(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, StatusCode> {
    let deficiency = payload
        .get("vitaminDeficiency")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let plan = generate_diet_plan(&deficiency);

    db::insert_diet_plan(&state.pool, &payload)
        .await
        .map_err(|e| {
            tracing::error!("failed to store diet plan request: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Diet plan generated successfully",
            "dietPlan": plan,
        })),
    ))
}
