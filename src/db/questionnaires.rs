//! Questionnaire and questionnaire-answer storage.

use crate::domain::questionnaire::{AnswerRecord, Question};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireRecord {
    pub id: Uuid,
    pub questionaire_id: i64,
    pub name: String,
    pub questions: Json<Vec<Question>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRow {
    pub id: Uuid,
    pub questionnaire_id: Uuid,
    pub user_id: String,
    pub submission_date: DateTime<Utc>,
    pub answers: Json<Vec<AnswerRecord>>,
}

const QUESTIONNAIRE_COLUMNS: &str =
    "id, questionaire_id, name, questions, created_at, updated_at";

pub async fn list(pool: &SqlitePool) -> Result<Vec<QuestionnaireRecord>> {
    let sql = format!(
        "SELECT {QUESTIONNAIRE_COLUMNS} FROM questionnaires ORDER BY questionaire_id ASC"
    );
    let rows = sqlx::query_as::<_, QuestionnaireRecord>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_numeric_id(
    pool: &SqlitePool,
    questionaire_id: i64,
) -> Result<Option<QuestionnaireRecord>> {
    let sql = format!(
        "SELECT {QUESTIONNAIRE_COLUMNS} FROM questionnaires WHERE questionaire_id = ?1"
    );
    let row = sqlx::query_as::<_, QuestionnaireRecord>(&sql)
        .bind(questionaire_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_uuid(pool: &SqlitePool, id: Uuid) -> Result<Option<QuestionnaireRecord>> {
    let sql = format!("SELECT {QUESTIONNAIRE_COLUMNS} FROM questionnaires WHERE id = ?1");
    let row = sqlx::query_as::<_, QuestionnaireRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Resolves a path id: numeric ids hit `questionaire_id`, anything
/// else is tried as a record UUID.
pub async fn find_by_path_id(
    pool: &SqlitePool,
    raw: &str,
) -> Result<Option<QuestionnaireRecord>> {
    if let Ok(numeric) = raw.parse::<i64>() {
        return find_by_numeric_id(pool, numeric).await;
    }
    match Uuid::parse_str(raw) {
        Ok(id) => find_by_uuid(pool, id).await,
        Err(_) => Ok(None),
    }
}

pub async fn insert(
    pool: &SqlitePool,
    questionaire_id: i64,
    name: &str,
    questions: &[Question],
) -> Result<QuestionnaireRecord> {
    let now = Utc::now();
    let record = QuestionnaireRecord {
        id: Uuid::new_v4(),
        questionaire_id,
        name: name.to_string(),
        questions: Json(questions.to_vec()),
        created_at: now,
        updated_at: now,
    };
    sqlx::query(
        r#"
        INSERT INTO questionnaires (id, questionaire_id, name, questions, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(record.id)
    .bind(record.questionaire_id)
    .bind(&record.name)
    .bind(&record.questions)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;
    Ok(record)
}

pub async fn update(
    pool: &SqlitePool,
    id: Uuid,
    name: &str,
    questions: &[Question],
) -> Result<Option<QuestionnaireRecord>> {
    let updated = sqlx::query(
        r#"
        UPDATE questionnaires
        SET name = ?2, questions = ?3, updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(Json(questions.to_vec()))
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_uuid(pool, id).await
}

/// Deletes a questionnaire and its answers; returns how many answers
/// went with it.
pub async fn delete_cascade(pool: &SqlitePool, id: Uuid) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let answers = sqlx::query("DELETE FROM questionnaire_answers WHERE questionnaire_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    sqlx::query("DELETE FROM questionnaires WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(answers)
}

const ANSWER_COLUMNS: &str = "id, questionnaire_id, user_id, submission_date, answers";

pub async fn list_answers(pool: &SqlitePool) -> Result<Vec<AnswerRow>> {
    let sql = format!(
        "SELECT {ANSWER_COLUMNS} FROM questionnaire_answers ORDER BY submission_date DESC"
    );
    let rows = sqlx::query_as::<_, AnswerRow>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_answer(pool: &SqlitePool, id: Uuid) -> Result<Option<AnswerRow>> {
    let sql = format!("SELECT {ANSWER_COLUMNS} FROM questionnaire_answers WHERE id = ?1");
    let row = sqlx::query_as::<_, AnswerRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_answers_for(pool: &SqlitePool, questionnaire_id: Uuid) -> Result<Vec<AnswerRow>> {
    let sql = format!(
        "SELECT {ANSWER_COLUMNS} FROM questionnaire_answers
         WHERE questionnaire_id = ?1
         ORDER BY submission_date DESC"
    );
    let rows = sqlx::query_as::<_, AnswerRow>(&sql)
        .bind(questionnaire_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn insert_answer(
    pool: &SqlitePool,
    questionnaire_id: Uuid,
    user_id: &str,
    answers: &[AnswerRecord],
) -> Result<AnswerRow> {
    let row = AnswerRow {
        id: Uuid::new_v4(),
        questionnaire_id,
        user_id: user_id.to_string(),
        submission_date: Utc::now(),
        answers: Json(answers.to_vec()),
    };
    sqlx::query(
        r#"
        INSERT INTO questionnaire_answers (id, questionnaire_id, user_id, submission_date, answers)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(row.id)
    .bind(row.questionnaire_id)
    .bind(&row.user_id)
    .bind(row.submission_date)
    .bind(&row.answers)
    .execute(pool)
    .await?;
    Ok(row)
}

pub async fn delete_answer(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM questionnaire_answers WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::domain::questionnaire::{AnswerOption, QuestionType};
    use serde_json::json;

    fn sample_questions() -> Vec<Question> {
        vec![Question {
            question: "How often do you eat fish?".to_string(),
            kind: QuestionType::Radio,
            options: vec![AnswerOption {
                option: "Weekly".to_string(),
                kind: "radio".to_string(),
            }],
            follow_up_question: None,
            follow_up_questions: vec![],
            questions: vec![],
        }]
    }

    #[tokio::test]
    async fn crud_and_path_lookup() {
        let pool = test_pool().await;
        let created = insert(&pool, 7, "Diet habits", &sample_questions())
            .await
            .unwrap();

        // Numeric and UUID path ids resolve to the same record.
        let by_number = find_by_path_id(&pool, "7").await.unwrap().unwrap();
        assert_eq!(by_number.id, created.id);
        let by_uuid = find_by_path_id(&pool, &created.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_uuid.questionaire_id, 7);
        assert!(find_by_path_id(&pool, "not-an-id").await.unwrap().is_none());

        let updated = update(&pool, created.id, "Diet habits v2", &sample_questions())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Diet habits v2");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn duplicate_numeric_id_is_rejected() {
        let pool = test_pool().await;
        insert(&pool, 1, "One", &sample_questions()).await.unwrap();
        assert!(insert(&pool, 1, "Again", &sample_questions()).await.is_err());
    }

    #[tokio::test]
    async fn delete_cascades_answers() {
        let pool = test_pool().await;
        let questionnaire = insert(&pool, 3, "Sleep", &sample_questions())
            .await
            .unwrap();

        let answers = vec![AnswerRecord {
            question_id: None,
            question_index: json!(0),
            question: "How often do you eat fish?".to_string(),
            question_type: Some("radio".to_string()),
            answer: json!("Weekly"),
            is_follow_up: None,
            parent_question_index: None,
            parent_question_id: None,
        }];
        insert_answer(&pool, questionnaire.id, "user-1", &answers)
            .await
            .unwrap();
        insert_answer(&pool, questionnaire.id, "user-2", &answers)
            .await
            .unwrap();

        assert_eq!(list_answers_for(&pool, questionnaire.id).await.unwrap().len(), 2);

        let removed = delete_cascade(&pool, questionnaire.id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(find_by_uuid(&pool, questionnaire.id).await.unwrap().is_none());
        assert!(list_answers(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn answers_come_back_newest_first() {
        let pool = test_pool().await;
        let questionnaire = insert(&pool, 5, "Energy", &sample_questions())
            .await
            .unwrap();
        let first = insert_answer(&pool, questionnaire.id, "early", &[])
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = insert_answer(&pool, questionnaire.id, "late", &[])
            .await
            .unwrap();

        let all = list_answers(&pool).await.unwrap();
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);

        assert!(delete_answer(&pool, first.id).await.unwrap());
        assert!(!delete_answer(&pool, first.id).await.unwrap());
    }
}
