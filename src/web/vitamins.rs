//! Vitamin reference routes, all answered from the static table.

use crate::domain::vitamins;
use axum::{
    extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde_json::json;

pub fn router() -> Router {
    Router::new()
        .route("/api/vitamins", get(list))
        .route("/api/vitamins/:name", get(detail))
        .route("/api/vitamin-info/:name", get(info))
        .route("/api/vitamin-side-effects/:name", get(side_effects))
}

async fn list() -> impl IntoResponse {
    Json(vitamins::VITAMINS)
}

async fn detail(Path(name): Path<String>) -> Result<impl IntoResponse, StatusCode> {
    let vitamin = vitamins::find(&name).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(vitamin))
}

async fn info(Path(name): Path<String>) -> Result<impl IntoResponse, StatusCode> {
    let vitamin = vitamins::find(&name).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({
        "name": vitamin.name,
        "description": vitamin.description,
        "foodSources": vitamin.food_sources,
        "deficiencySigns": vitamin.deficiency_signs,
    })))
}

async fn side_effects(Path(name): Path<String>) -> Result<impl IntoResponse, StatusCode> {
    let vitamin = vitamins::find(&name).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({
        "name": vitamin.name,
        "sideEffects": vitamin.side_effects,
    })))
}
