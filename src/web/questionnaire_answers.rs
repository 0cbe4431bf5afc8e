//! Questionnaire answer submissions and the grouped answer views.

use crate::db::questionnaires as store;
use crate::domain::questionnaire::{group_by_parent, AnswerRecord};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub questionnaire_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub answers: Vec<AnswerRecord>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list).post(submit))
        .route("/:id", get(detail).delete(remove))
        .route("/questionnaire/:id", get(by_questionnaire))
        .with_state(state)
}

async fn list(State(state): State<SharedState>) -> Result<impl IntoResponse, StatusCode> {
    let answers = store::list_answers(&state.pool).await.map_err(|e| {
        tracing::error!("failed to list answers: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let questionnaires = store::list(&state.pool).await.map_err(|e| {
        tracing::error!("failed to list questionnaires: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let by_id: HashMap<Uuid, Value> = questionnaires
        .into_iter()
        .map(|q| (q.id, json!({ "id": q.id, "questionaireId": q.questionaire_id, "name": q.name })))
        .collect();

    let joined: Vec<Value> = answers
        .into_iter()
        .map(|answer| {
            let questionnaire = by_id.get(&answer.questionnaire_id).cloned();
            json!({
                "id": answer.id,
                "questionnaireId": answer.questionnaire_id,
                "userId": answer.user_id,
                "submissionDate": answer.submission_date,
                "answers": answer.answers.0,
                "questionnaire": questionnaire,
            })
        })
        .collect();

    Ok(Json(joined))
}

async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let answer_id = Uuid::parse_str(&id).map_err(|_| StatusCode::NOT_FOUND)?;
    let answer = store::find_answer(&state.pool, answer_id)
        .await
        .map_err(|e| {
            tracing::error!("answer lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let questionnaire = store::find_by_uuid(&state.pool, answer.questionnaire_id)
        .await
        .map_err(|e| {
            tracing::error!("questionnaire lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let grouped = group_by_parent(&answer.answers.0);

    Ok(Json(json!({
        "id": answer.id,
        "questionnaireId": answer.questionnaire_id,
        "userId": answer.user_id,
        "submissionDate": answer.submission_date,
        "answers": answer.answers.0,
        "groupedAnswers": grouped,
        "questionnaire": questionnaire,
    })))
}

async fn by_questionnaire(
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

    let answers = store::list_answers_for(&state.pool, questionnaire.id)
        .await
        .map_err(|e| {
            tracing::error!("failed to list answers: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(json!({
        "questionnaire": questionnaire,
        "answers": answers,
    })))
}

async fn submit(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerSubmission>,
) -> Result<impl IntoResponse, StatusCode> {
    let questionnaire = store::find_by_path_id(&state.pool, &payload.questionnaire_id)
        .await
        .map_err(|e| {
            tracing::error!("questionnaire lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let user_id = payload.user_id.unwrap_or_else(|| "anonymous".to_string());
    let answer = store::insert_answer(&state.pool, questionnaire.id, &user_id, &payload.answers)
        .await
        .map_err(|e| {
            tracing::error!("failed to store answers: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    tracing::info!(
        "answers stored for questionnaire {}",
        questionnaire.questionaire_id
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Answers submitted successfully",
            "id": answer.id,
        })),
    ))
}

async fn remove(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let answer_id = Uuid::parse_str(&id).map_err(|_| StatusCode::NOT_FOUND)?;
    let deleted = store::delete_answer(&state.pool, answer_id)
        .await
        .map_err(|e| {
            tracing::error!("failed to delete answer: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if !deleted {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({ "message": "Answer deleted successfully" })))
}
