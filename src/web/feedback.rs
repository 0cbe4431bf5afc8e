//! User feedback intake and listing.

use crate::db::{self, FeedbackRecord};
use crate::state::SharedState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(submit).get(list))
        .with_state(state)
}

async fn submit(
    State(state): State<SharedState>,
    Json(record): Json<FeedbackRecord>,
) -> Result<impl IntoResponse, StatusCode> {
    db::insert_feedback(&state.pool, &record).await.map_err(|e| {
        tracing::error!("failed to store feedback: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Feedback submitted successfully" })),
    ))
}

async fn list(State(state): State<SharedState>) -> Result<impl IntoResponse, StatusCode> {
    let feedback = db::list_feedback(&state.pool).await.map_err(|e| {
        tracing::error!("failed to list feedback: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(feedback))
}
