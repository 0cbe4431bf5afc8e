//! Questionnaire builder API. Reads are public; mutations require a
//! session token.

use crate::db::questionnaires as store;
use crate::domain::questionnaire::{validate_questions, Question};
use crate::state::SharedState;
use crate::web::session::UserSession;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct QuestionnairePayload {
    #[serde(rename = "questionaireId")]
    pub questionaire_id: Option<i64>,
    #[serde(rename = "questionaireName")]
    pub questionaire_name: String,
    pub questions: Vec<Question>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(detail).put(update).delete(remove))
        .with_state(state)
}

async fn list(State(state): State<SharedState>) -> Result<impl IntoResponse, StatusCode> {
    let questionnaires = store::list(&state.pool).await.map_err(|e| {
        tracing::error!("failed to list questionnaires: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(questionnaires))
}

async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let questionnaire = store::find_by_path_id(&state.pool, &id)
        .await
        .map_err(|e| {
            tracing::error!("questionnaire lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(questionnaire))
}

async fn create(
    UserSession(_user_id): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<QuestionnairePayload>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(questionaire_id) = payload.questionaire_id else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": ["Questionnaire ID is required"] })),
        ));
    };

    let errors = validate_questions(&payload.questionaire_name, &payload.questions);
    if !errors.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))));
    }

    let existing = store::find_by_numeric_id(&state.pool, questionaire_id)
        .await
        .map_err(|e| {
            tracing::error!("duplicate check failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    if existing.is_some() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": ["A questionnaire with this ID already exists"] })),
        ));
    }

    let record = store::insert(
        &state.pool,
        questionaire_id,
        &payload.questionaire_name,
        &payload.questions,
    )
    .await
    .map_err(|e| {
        tracing::error!("failed to create questionnaire: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!("questionnaire {} created", record.questionaire_id);
    Ok((StatusCode::CREATED, Json(json!({ "questionnaire": record }))))
}

async fn update(
    UserSession(_user_id): UserSession,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<QuestionnairePayload>,
) -> Result<impl IntoResponse, StatusCode> {
    let errors = validate_questions(&payload.questionaire_name, &payload.questions);
    if !errors.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))));
    }

    let existing = store::find_by_path_id(&state.pool, &id)
        .await
        .map_err(|e| {
            tracing::error!("questionnaire lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let updated = store::update(
        &state.pool,
        existing.id,
        &payload.questionaire_name,
        &payload.questions,
    )
    .await
    .map_err(|e| {
        tracing::error!("failed to update questionnaire: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok((StatusCode::OK, Json(json!({ "questionnaire": updated }))))
}

async fn remove(
    UserSession(_user_id): UserSession,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let existing = store::find_by_path_id(&state.pool, &id)
        .await
        .map_err(|e| {
            tracing::error!("questionnaire lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let deleted_answers = store::delete_cascade(&state.pool, existing.id)
        .await
        .map_err(|e| {
            tracing::error!("failed to delete questionnaire: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    tracing::info!(
        "questionnaire {} deleted with {} answers",
        existing.questionaire_id,
        deleted_answers
    );
    Ok(Json(json!({
        "message": "Questionnaire deleted successfully",
        "deletedAnswersCount": deleted_answers,
    })))
}
