use crate::middleware::RateLimiter;
use crate::services::mailer::Mailer;
use crate::services::nutrition::NutritionClient;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A one-time password waiting for verification, keyed by email in
/// [`AppState::pending_otps`]. Expired entries are rejected on use and
/// swept by the hourly cleanup job.
#[derive(Clone)]
pub struct PendingOtp {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub nutrition_pool: SqlitePool,
    pub mailer: Arc<Mailer>,
    pub nutrition: Arc<NutritionClient>,
    pub session_key: Vec<u8>,
    pub pending_otps: Arc<RwLock<HashMap<String, PendingOtp>>>, // email -> otp
    pub login_limiter: RateLimiter,
    pub register_limiter: RateLimiter,
}

pub type SharedState = Arc<AppState>;

/// Fully wired state over in-memory stores, for handler tests.
#[cfg(test)]
pub async fn test_state() -> SharedState {
    let pool = crate::db::test_pool().await;
    let nutrition_pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    crate::db::calories::ensure_schema(&nutrition_pool)
        .await
        .expect("nutrition schema");

    Arc::new(AppState {
        pool,
        nutrition_pool,
        mailer: Arc::new(Mailer::from_env()),
        nutrition: Arc::new(NutritionClient::from_env()),
        session_key: b"test-session-key-32-bytes-long!!".to_vec(),
        pending_otps: Arc::new(RwLock::new(HashMap::new())),
        login_limiter: RateLimiter::new(100, 60),
        register_limiter: RateLimiter::new(100, 60),
    })
}
