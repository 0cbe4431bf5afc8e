//! Signup and login. Registration mails a six-digit code that expires
//! after five minutes; the account is only created once the code is
//! verified.

use crate::db;
use crate::services::mailer;
use crate::state::{PendingOtp, SharedState};
use crate::web::session;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::{Duration, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use uuid::Uuid;

const OTP_TTL_MINUTES: i64 = 5;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub otp: String,
}

#[derive(Serialize)]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/api/verify-otp", post(verify_otp))
        .with_state(state)
}

async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let ip = addr.ip().to_string();
    if !state.login_limiter.check(&ip).await {
        tracing::warn!("login rate limit exceeded for {}", ip);
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    let user = db::find_user_by_email(&state.pool, &payload.email)
        .await
        .map_err(|e| {
            tracing::error!("login lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let parsed_hash = PasswordHash::new(&user.hash).map_err(|_| StatusCode::UNAUTHORIZED)?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let token = session::sign_session(user.id, &user.email, &state.session_key)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    tracing::info!("user {} logged in", user.id);
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: LoginUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}

async fn register(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let ip = addr.ip().to_string();
    if !state.register_limiter.check(&ip).await {
        tracing::warn!("register rate limit exceeded for {}", ip);
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    if payload.email.trim().is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Email is required" })),
        ));
    }

    let existing = db::find_user_by_email(&state.pool, &payload.email)
        .await
        .map_err(|e| {
            tracing::error!("register lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    if existing.is_some() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "User already exists" })),
        ));
    }

    let code = mailer::generate_otp();
    state.pending_otps.write().await.insert(
        payload.email.clone(),
        PendingOtp {
            code: code.clone(),
            expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
        },
    );

    state
        .mailer
        .send(
            &payload.email,
            "Your verification code",
            &format!("Your OTP code is {code}. It expires in {OTP_TTL_MINUTES} minutes."),
        )
        .await
        .map_err(|e| {
            tracing::error!("failed to send OTP email: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    tracing::info!("OTP issued for {}", payload.email);
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "OTP sent to email", "email": payload.email })),
    ))
}

async fn verify_otp(
    State(state): State<SharedState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let pending = state.pending_otps.read().await.get(&payload.email).cloned();
    let Some(pending) = pending else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "OTP expired or not requested" })),
        ));
    };

    if Utc::now() > pending.expires_at {
        state.pending_otps.write().await.remove(&payload.email);
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "OTP expired" })),
        ));
    }

    if pending.code != payload.otp {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid OTP" })),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    let user = db::insert_user(&state.pool, &payload.email, &hash, &payload.name)
        .await
        .map_err(|e| {
            tracing::error!("user insert failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    state.pending_otps.write().await.remove(&payload.email);

    let token = session::sign_session(user.id, &user.email, &state.session_key)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    tracing::info!("user {} registered", user.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "userId": user.id,
            "name": user.name,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::body::to_bytes;
    use axum::response::Response;
    use serde_json::Value;

    fn verify_request(email: &str, otp: &str) -> VerifyOtpRequest {
        VerifyOtpRequest {
            name: "Jane".to_string(),
            email: email.to_string(),
            password: "hunter2!".to_string(),
            otp: otp.to_string(),
        }
    }

    async fn seed_otp(state: &crate::state::SharedState, email: &str, code: &str, ttl_min: i64) {
        state.pending_otps.write().await.insert(
            email.to_string(),
            PendingOtp {
                code: code.to_string(),
                expires_at: Utc::now() + Duration::minutes(ttl_min),
            },
        );
    }

    async fn response_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn verify_without_pending_otp_is_rejected() {
        let state = test_state().await;
        let response = verify_otp(
            State(state.clone()),
            Json(verify_request("jane@example.com", "123456")),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(db::find_user_by_email(&state.pool, "jane@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn expired_otp_is_rejected_and_dropped() {
        let state = test_state().await;
        seed_otp(&state, "jane@example.com", "123456", -1).await;

        let response = verify_otp(
            State(state.clone()),
            Json(verify_request("jane@example.com", "123456")),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // The expired entry is gone and no account was created.
        assert!(!state
            .pending_otps
            .read()
            .await
            .contains_key("jane@example.com"));
        assert!(db::find_user_by_email(&state.pool, "jane@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn wrong_otp_is_unauthorized_and_keeps_the_code() {
        let state = test_state().await;
        seed_otp(&state, "jane@example.com", "654321", 5).await;

        let response = verify_otp(
            State(state.clone()),
            Json(verify_request("jane@example.com", "123456")),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // A wrong guess does not burn the pending code.
        assert!(state
            .pending_otps
            .read()
            .await
            .contains_key("jane@example.com"));
    }

    #[tokio::test]
    async fn matching_otp_creates_the_user() {
        let state = test_state().await;
        seed_otp(&state, "jane@example.com", "123456", 5).await;

        let response = verify_otp(
            State(state.clone()),
            Json(verify_request("jane@example.com", "123456")),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let user = db::find_user_by_email(&state.pool, "jane@example.com")
            .await
            .unwrap()
            .expect("user created");
        assert_eq!(user.name, "Jane");

        // Stored as an argon2 hash that verifies against the password.
        assert_ne!(user.hash, "hunter2!");
        let parsed = PasswordHash::new(&user.hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"hunter2!", &parsed)
            .is_ok());

        // The pending entry is consumed and the returned token is valid.
        assert!(!state
            .pending_otps
            .read()
            .await
            .contains_key("jane@example.com"));
        let body = response_json(response).await;
        let token = body["token"].as_str().expect("token in body");
        let claims = session::verify_session(token, &state.session_key).unwrap();
        assert_eq!(claims.user_id, user.id);
    }
}
