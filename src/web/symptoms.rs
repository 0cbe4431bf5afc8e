//! Symptom submissions and deficiency prediction.

use crate::db;
use crate::domain::prediction::{predict_deficiency, SymptomFlags};
use crate::state::SharedState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(submit).get(list))
        .with_state(state)
}

async fn submit(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, StatusCode> {
    // Flags may arrive nested under signsSymptoms or at the top level.
    let flags_value = payload.get("signsSymptoms").unwrap_or(&payload);
    let flags: SymptomFlags =
        serde_json::from_value(flags_value.clone()).unwrap_or_default();
    let deficiencies = predict_deficiency(&flags);

    db::insert_symptom(&state.pool, &payload)
        .await
        .map_err(|e| {
            tracing::error!("failed to store symptoms: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Symptoms submitted successfully",
            "deficiencies": deficiencies,
        })),
    ))
}

async fn list(State(state): State<SharedState>) -> Result<impl IntoResponse, StatusCode> {
    let submissions = db::list_symptoms(&state.pool).await.map_err(|e| {
        tracing::error!("failed to list symptoms: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(submissions))
}
