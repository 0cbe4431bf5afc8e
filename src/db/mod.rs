//! Application-store queries. Runtime-checked sqlx against SQLite; row
//! structs mirror the migration schema, JSON payload columns keep the
//! submitted document shape.

pub mod calories;
pub mod questionnaires;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, hash, name, created_at
        FROM users
        WHERE email = ?1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, hash, name, created_at
        FROM users
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn insert_user(pool: &SqlitePool, email: &str, hash: &str, name: &str) -> Result<DbUser> {
    let user = DbUser {
        id: Uuid::new_v4(),
        email: email.to_string(),
        hash: hash.to_string(),
        name: name.to_string(),
        created_at: Utc::now(),
    };
    sqlx::query(
        r#"
        INSERT INTO users (id, email, hash, name, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.hash)
    .bind(&user.name)
    .bind(user.created_at)
    .execute(pool)
    .await?;
    Ok(user)
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetailRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hash: String,
    pub dob: String,
    pub gender: String,
    pub pin_code: String,
    pub city: String,
    pub state: String,
    pub phone_number: String,
    pub another_phone: Option<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

pub async fn personal_detail_username_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM personal_details WHERE username = ?1")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn personal_detail_email_exists(pool: &SqlitePool, email: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM personal_details WHERE email = ?1")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn insert_personal_detail(pool: &SqlitePool, record: &PersonalDetailRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO personal_details (
            id, first_name, last_name, username, email, hash, dob, gender,
            pin_code, city, state, phone_number, another_phone, image, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )
    .bind(record.id)
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(&record.username)
    .bind(&record.email)
    .bind(&record.hash)
    .bind(&record.dob)
    .bind(&record.gender)
    .bind(&record.pin_code)
    .bind(&record.city)
    .bind(&record.state)
    .bind(&record.phone_number)
    .bind(&record.another_phone)
    .bind(&record.image)
    .bind(record.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// A stored form submission: symptoms, diet plans and patient forms all
/// persist this way, differing only in table.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub payload: Json<Value>,
    pub created_at: DateTime<Utc>,
}

async fn insert_submission(pool: &SqlitePool, table: &str, payload: &Value) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let sql = format!("INSERT INTO {table} (id, payload, created_at) VALUES (?1, ?2, ?3)");
    sqlx::query(&sql)
        .bind(id)
        .bind(Json(payload))
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(id)
}

async fn list_submissions(pool: &SqlitePool, table: &str) -> Result<Vec<Submission>> {
    let sql = format!("SELECT id, payload, created_at FROM {table} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Submission>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn insert_symptom(pool: &SqlitePool, payload: &Value) -> Result<Uuid> {
    insert_submission(pool, "symptoms", payload).await
}

pub async fn list_symptoms(pool: &SqlitePool) -> Result<Vec<Submission>> {
    list_submissions(pool, "symptoms").await
}

pub async fn insert_diet_plan(pool: &SqlitePool, payload: &Value) -> Result<Uuid> {
    insert_submission(pool, "diet_plans", payload).await
}

pub async fn insert_patient_form(pool: &SqlitePool, payload: &Value) -> Result<Uuid> {
    insert_submission(pool, "patient_forms", payload).await
}

pub async fn list_patient_forms(pool: &SqlitePool) -> Result<Vec<Submission>> {
    list_submissions(pool, "patient_forms").await
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub experience_rating: Option<String>,
    pub satisfaction_rating: Option<String>,
    pub useful_feedback: Option<String>,
    pub improvement_suggestions: Option<String>,
    pub recommendation: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

pub async fn insert_feedback(pool: &SqlitePool, record: &FeedbackRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO feedback (
            id, user_id, username, email, experience_rating, satisfaction_rating,
            useful_feedback, improvement_suggestions, recommendation, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(record.id)
    .bind(&record.user_id)
    .bind(&record.username)
    .bind(&record.email)
    .bind(&record.experience_rating)
    .bind(&record.satisfaction_rating)
    .bind(&record.useful_feedback)
    .bind(&record.improvement_suggestions)
    .bind(&record.recommendation)
    .bind(record.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_feedback(pool: &SqlitePool) -> Result<Vec<FeedbackRecord>> {
    let rows = sqlx::query_as::<_, FeedbackRecord>(
        r#"
        SELECT id, user_id, username, email, experience_rating, satisfaction_rating,
               useful_feedback, improvement_suggestions, recommendation, created_at
        FROM feedback
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn user_round_trip() {
        let pool = test_pool().await;
        let created = insert_user(&pool, "jane@example.com", "argon2-hash", "Jane")
            .await
            .unwrap();

        let by_email = find_user_by_email(&pool, "jane@example.com")
            .await
            .unwrap()
            .expect("user by email");
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.name, "Jane");

        let by_id = find_user_by_id(&pool, created.id).await.unwrap();
        assert!(by_id.is_some());
        assert!(find_user_by_email(&pool, "nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let pool = test_pool().await;
        insert_user(&pool, "dup@example.com", "h", "A").await.unwrap();
        assert!(insert_user(&pool, "dup@example.com", "h", "B").await.is_err());
    }

    #[tokio::test]
    async fn submissions_keep_payload_shape() {
        let pool = test_pool().await;
        let payload = json!({
            "signsSymptoms": {"fatigue": true},
            "childName": "Sam"
        });
        insert_symptom(&pool, &payload).await.unwrap();

        let stored = list_symptoms(&pool).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].payload.0, payload);
    }

    #[tokio::test]
    async fn personal_detail_uniqueness_checks() {
        let pool = test_pool().await;
        let record = PersonalDetailRecord {
            id: Uuid::new_v4(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            username: "janed".into(),
            email: "janed@example.com".into(),
            hash: "h".into(),
            dob: "1990-04-02".into(),
            gender: "female".into(),
            pin_code: "560001".into(),
            city: "Bangalore".into(),
            state: "KA".into(),
            phone_number: "9999999999".into(),
            another_phone: None,
            image: "uploads/1-pic.png".into(),
            created_at: Utc::now(),
        };
        insert_personal_detail(&pool, &record).await.unwrap();

        assert!(personal_detail_username_exists(&pool, "janed").await.unwrap());
        assert!(personal_detail_email_exists(&pool, "janed@example.com")
            .await
            .unwrap());
        assert!(!personal_detail_username_exists(&pool, "other").await.unwrap());
    }
}
