pub mod auth;
pub mod calories;
pub mod diet_plan;
pub mod feedback;
pub mod patient_form;
pub mod personal_details;
pub mod questionnaire_answers;
pub mod questionnaires;
pub mod session;
pub mod symptoms;
pub mod vitamins;

use crate::state::SharedState;
use axum::{routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::router(state.clone()))
        .merge(vitamins::router())
        .nest("/api/symptoms", symptoms::router(state.clone()))
        .nest("/api/diet-plan", diet_plan::router(state.clone()))
        .nest("/api/personal-details", personal_details::router(state.clone()))
        .nest("/api/patient-form", patient_form::router(state.clone()))
        .nest("/api/feedback", feedback::router(state.clone()))
        .nest("/api/questionnaires", questionnaires::router(state.clone()))
        .nest(
            "/api/questionnaire-answers",
            questionnaire_answers::router(state.clone()),
        )
        .nest("/api", calories::router(state))
}
