mod db;
mod domain;
mod middleware;
mod services;
mod state;
mod web;

use crate::state::SharedState;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:vitaguide.db?mode=rwc".into());
    tracing::info!("Connecting to application store...");
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to application store: {}", e);
            e
        })?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        e
    })?;

    let nutrition_url = std::env::var("NUTRITION_DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:nutrition.db?mode=rwc".into());
    let nutrition_pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&nutrition_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to nutrition store: {}", e);
            e
        })?;
    db::calories::ensure_schema(&nutrition_pool).await?;

    let session_key = match std::env::var("SESSION_KEY") {
        Ok(b64) => general_purpose::STANDARD
            .decode(b64)
            .map_err(|_| anyhow::anyhow!("SESSION_KEY must be base64"))?,
        Err(_) => {
            tracing::warn!("SESSION_KEY not set; using an ephemeral key, sessions reset on restart");
            let mut key = vec![0u8; 32];
            use rand::RngCore;
            rand::thread_rng().fill_bytes(&mut key);
            key
        }
    };

    tokio::fs::create_dir_all(web::personal_details::UPLOAD_DIR).await?;

    let shared: SharedState = Arc::new(state::AppState {
        pool,
        nutrition_pool,
        mailer: Arc::new(services::mailer::Mailer::from_env()),
        nutrition: Arc::new(services::nutrition::NutritionClient::from_env()),
        session_key,
        pending_otps: Arc::new(tokio::sync::RwLock::new(std::collections::HashMap::new())),
        login_limiter: middleware::RateLimiter::new(5, 60),
        register_limiter: middleware::RateLimiter::new(3, 60),
    });

    let scheduler = JobScheduler::new().await?;

    // Hourly: drop expired OTPs and stale rate-limit windows.
    let shared_for_cleanup = shared.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let state = shared_for_cleanup.clone();
            Box::pin(async move {
                let now = Utc::now();
                let mut otps = state.pending_otps.write().await;
                let before = otps.len();
                otps.retain(|_, pending| pending.expires_at > now);
                let removed = before - otps.len();
                drop(otps);
                if removed > 0 {
                    tracing::info!("Cleaned up {} expired OTPs", removed);
                }
                state.login_limiter.cleanup().await;
                state.register_limiter.cleanup().await;
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!("Scheduler started: OTP/rate-limit cleanup hourly");

    let app = axum::Router::new()
        .merge(web::routes(shared.clone()))
        .nest_service(
            "/uploads",
            ServeDir::new(web::personal_details::UPLOAD_DIR),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .into_make_service_with_connect_info::<std::net::SocketAddr>();

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
        format!("0.0.0.0:{}", port)
    });
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
