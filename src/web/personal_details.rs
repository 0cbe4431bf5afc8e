//! Personal-details intake: a multipart form with a profile image, plus
//! the lookup used by the profile page.

use crate::db::{self, PersonalDetailRecord};
use crate::state::SharedState;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use rand_core::OsRng;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

pub const UPLOAD_DIR: &str = "uploads";

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(submit).get(fetch))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchQuery {
    user_id: Option<Uuid>,
}

async fn submit(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, StatusCode> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut image_path: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("bad multipart payload: {}", e);
        StatusCode::BAD_REQUEST
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let filename = field
                .file_name()
                .map(sanitize_filename)
                .unwrap_or_else(|| "image".to_string());
            let data = field.bytes().await.map_err(|e| {
                tracing::warn!("failed to read uploaded image: {}", e);
                StatusCode::BAD_REQUEST
            })?;
            let path = format!("{UPLOAD_DIR}/{}-{filename}", Utc::now().timestamp_millis());
            tokio::fs::write(&path, &data).await.map_err(|e| {
                tracing::error!("failed to save upload {}: {}", path, e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            image_path = Some(path);
        } else {
            let value = field.text().await.map_err(|e| {
                tracing::warn!("bad multipart field {}: {}", name, e);
                StatusCode::BAD_REQUEST
            })?;
            fields.insert(name, value);
        }
    }

    let required = |key: &str| -> Result<String, StatusCode> {
        fields
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .ok_or(StatusCode::BAD_REQUEST)
    };

    let username = required("username")?;
    let email = required("email")?;
    let password = required("password")?;

    if db::personal_detail_username_exists(&state.pool, &username)
        .await
        .map_err(|e| {
            tracing::error!("username check failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
    {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Username already exists" })),
        ));
    }
    if db::personal_detail_email_exists(&state.pool, &email)
        .await
        .map_err(|e| {
            tracing::error!("email check failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
    {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Email already exists" })),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    let record = PersonalDetailRecord {
        id: Uuid::new_v4(),
        first_name: required("firstName")?,
        last_name: required("lastName")?,
        username,
        email,
        hash,
        dob: required("dob")?,
        gender: required("gender")?,
        pin_code: required("pinCode")?,
        city: required("city")?,
        state: required("state")?,
        phone_number: required("phoneNumber")?,
        another_phone: fields.get("anotherPhone").cloned(),
        image: image_path.ok_or(StatusCode::BAD_REQUEST)?,
        created_at: Utc::now(),
    };

    db::insert_personal_detail(&state.pool, &record)
        .await
        .map_err(|e| {
            tracing::error!("failed to store personal details: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    tracing::info!("personal details stored for {}", record.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Personal details saved successfully",
            "id": record.id,
        })),
    ))
}

/// The profile page resolves the logged-in account, so this reads the
/// auth user record rather than the details table.
async fn fetch(
    State(state): State<SharedState>,
    Query(query): Query<FetchQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let user_id = query.user_id.ok_or(StatusCode::BAD_REQUEST)?;

    let user = db::find_user_by_id(&state.pool, user_id)
        .await
        .map_err(|e| {
            tracing::error!("user lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "createdAt": user.created_at,
    })))
}

/// Keeps only the final path component and strips characters that could
/// escape the uploads directory.
pub(crate) fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "image".to_string()
    } else {
        cleaned
    }
}
