//! Patient intake form: static question set, submissions and the
//! vaccination-record upload.

use crate::db;
use crate::state::SharedState;
use crate::web::personal_details::UPLOAD_DIR;
use crate::web::session::UserSession;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// The intake questionnaire is fixed; the client renders whatever this
/// returns.
static QUESTIONS: Lazy<Value> = Lazy::new(|| {
    json!([
        { "id": "childName", "question": "Child's full name", "type": "text" },
        { "id": "childAge", "question": "Child's age (years)", "type": "number" },
        { "id": "weight", "question": "Current weight (kg)", "type": "number" },
        { "id": "height", "question": "Current height (cm)", "type": "number" },
        {
            "id": "diet",
            "question": "What best describes the child's diet?",
            "type": "radio",
            "options": ["Vegetarian", "Non-vegetarian", "Vegan", "Mixed"]
        },
        {
            "id": "allergies",
            "question": "Known food allergies",
            "type": "checkbox",
            "options": ["Milk", "Eggs", "Nuts", "Gluten", "None"]
        },
        {
            "id": "mealsPerDay",
            "question": "How many meals does the child eat per day?",
            "type": "number"
        },
        {
            "id": "supplements",
            "question": "Is the child currently taking any supplements?",
            "type": "radio",
            "options": ["Yes", "No"]
        },
        { "id": "concerns", "question": "Any specific concerns?", "type": "text" }
    ])
});

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/questions", get(questions))
        .route("/submit", post(submit))
        .route("/submitVaccinationFile", post(submit_vaccination_file))
        .route("/responses", get(responses))
        .with_state(state)
}

async fn questions() -> impl IntoResponse {
    Json(QUESTIONS.clone())
}

async fn submit(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, StatusCode> {
    let submission = payload.get("submitData").cloned().unwrap_or(payload);

    db::insert_patient_form(&state.pool, &submission)
        .await
        .map_err(|e| {
            tracing::error!("failed to store patient form: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Form submitted successfully" })),
    ))
}

async fn submit_vaccination_file(
    mut multipart: Multipart,
) -> Result<impl IntoResponse, StatusCode> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("bad multipart payload: {}", e);
        StatusCode::BAD_REQUEST
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(super::personal_details::sanitize_filename)
            .unwrap_or_else(|| "vaccination".to_string());
        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("failed to read vaccination file: {}", e);
            StatusCode::BAD_REQUEST
        })?;
        let path = format!("{UPLOAD_DIR}/{}-{filename}", Utc::now().timestamp_millis());
        tokio::fs::write(&path, &data).await.map_err(|e| {
            tracing::error!("failed to save upload {}: {}", path, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

        return Ok(Json(json!({
            "message": "File uploaded successfully",
            "path": path,
        })));
    }
    Err(StatusCode::BAD_REQUEST)
}

async fn responses(
    UserSession(_user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, StatusCode> {
    let forms = db::list_patient_forms(&state.pool).await.map_err(|e| {
        tracing::error!("failed to list patient forms: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(forms))
}
