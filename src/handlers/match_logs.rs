use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::insert_returning_id;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::models::analysis::LogAnalysis;
use crate::models::date_query::DateQuery;
use crate::models::match_log::{CreateMatchLogRequest, MatchLog};
use crate::models::pain::PainMap;
use crate::services::coach::{JournalEntry, JournalKind};
use crate::services::emotion::{self, WithEmotion};
use crate::AppState;

const COLUMNS: [&str; 10] = [
    "user_id",
    "match_date",
    "weather",
    "match_rank",
    "personal_record",
    "match_immersion",
    "emotion",
    "match_content",
    "match_feedback",
    "next_match_goal",
];

#[derive(Debug, Deserialize)]
pub struct AnalyzeMatchRequest {
    pub match_log_id: i64,
}

pub async fn create_match_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<CreateMatchLogRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;

    let match_date = body.match_date.unwrap_or_else(|| Utc::now().date_naive());
    let pain = PainMap::from(body.pain);

    let columns: Vec<&str> = COLUMNS.iter().chain(PainMap::COLUMNS.iter()).copied().collect();
    let sql = insert_returning_id("match_logs", &columns);

    let mut query = sqlx::query_scalar::<_, i64>(&sql)
        .bind(auth_user.id)
        .bind(match_date)
        .bind(&body.weather)
        .bind(&body.match_rank)
        .bind(&body.personal_record)
        .bind(body.match_immersion)
        .bind(emotion::encode(body.emotion))
        .bind(&body.match_content)
        .bind(&body.match_feedback)
        .bind(&body.next_match_goal);
    for level in pain.values() {
        query = query.bind(level);
    }

    let log_id = query.fetch_one(&state.db).await?;

    tracing::info!(user_id = auth_user.id, log_id, "Match log created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Match log saved", "log_id": log_id })),
    ))
}

pub async fn list_match_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let logs = sqlx::query_as::<_, MatchLog>(
        r#"
        SELECT * FROM match_logs
        WHERE user_id = $1
        ORDER BY match_date DESC, created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "data": with_emotion(logs) })))
}

pub async fn list_match_logs_by_date(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Value>> {
    let date = query.parse()?;

    let logs = sqlx::query_as::<_, MatchLog>(
        r#"
        SELECT * FROM match_logs
        WHERE user_id = $1 AND match_date = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "data": with_emotion(logs) })))
}

pub async fn delete_match_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(log_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM match_logs WHERE id = $1 AND user_id = $2")
        .bind(log_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Match log not found".into()));
    }

    tracing::info!(user_id = auth_user.id, log_id, "Match log deleted");
    Ok(Json(json!({ "success": true, "message": "Match log deleted" })))
}

pub async fn analyze_match_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<AnalyzeMatchRequest>,
) -> AppResult<Json<Value>> {
    let log = sqlx::query_as::<_, MatchLog>(
        "SELECT * FROM match_logs WHERE id = $1 AND user_id = $2",
    )
    .bind(body.match_log_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Match log not found".into()))?;

    let feedback = state
        .coach
        .feedback(JournalEntry {
            kind: JournalKind::Match,
            content: log.match_content.as_deref(),
            self_feedback: log.match_feedback.as_deref(),
            next_goal: log.next_match_goal.as_deref(),
        })
        .await
        .map_err(AppError::Upstream)?;

    let result = serde_json::to_value(&feedback).map_err(anyhow::Error::from)?;

    sqlx::query(
        r#"
        INSERT INTO match_analysis_results (user_id, match_log_id, analysis_result)
        VALUES ($1, $2, $3)
        ON CONFLICT (match_log_id) DO UPDATE SET
            analysis_result = EXCLUDED.analysis_result,
            updated_at = NOW()
        "#,
    )
    .bind(auth_user.id)
    .bind(log.id)
    .bind(&result)
    .execute(&state.db)
    .await?;

    tracing::info!(user_id = auth_user.id, log_id = log.id, "Match log analyzed");

    Ok(Json(json!({ "message": "Match log analyzed", "data": result })))
}

pub async fn get_match_analysis(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(log_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    let analysis = sqlx::query_as::<_, LogAnalysis>(
        r#"
        SELECT id, user_id, match_log_id AS log_id, analysis_result, created_at, updated_at
        FROM match_analysis_results
        WHERE match_log_id = $1 AND user_id = $2
        "#,
    )
    .bind(log_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("No analysis for this match log".into()))?;

    Ok(Json(json!({ "success": true, "data": analysis })))
}

fn with_emotion(logs: Vec<MatchLog>) -> Vec<WithEmotion<MatchLog>> {
    logs.into_iter().map(emotion::attach).collect()
}
