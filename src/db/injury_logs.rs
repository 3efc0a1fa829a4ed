//! Reads over `injury_logs`. Newest first, ties broken by creation so rehab
//! children come out in descending recency.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::injury_log::{InjuryLog, LogType};

pub async fn list_for_user(db: &PgPool, user_id: i64) -> Result<Vec<InjuryLog>, sqlx::Error> {
    sqlx::query_as::<_, InjuryLog>(
        r#"
        SELECT * FROM injury_logs
        WHERE user_id = $1
        ORDER BY log_date DESC, created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn list_for_user_on(
    db: &PgPool,
    user_id: i64,
    date: NaiveDate,
) -> Result<Vec<InjuryLog>, sqlx::Error> {
    sqlx::query_as::<_, InjuryLog>(
        r#"
        SELECT * FROM injury_logs
        WHERE user_id = $1 AND log_date = $2
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(db)
    .await
}

pub async fn find_owned(
    db: &PgPool,
    id: i64,
    user_id: i64,
    log_type: Option<LogType>,
) -> Result<Option<InjuryLog>, sqlx::Error> {
    sqlx::query_as::<_, InjuryLog>(
        r#"
        SELECT * FROM injury_logs
        WHERE id = $1 AND user_id = $2 AND ($3::injury_log_type IS NULL OR log_type = $3)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(log_type)
    .fetch_optional(db)
    .await
}
