use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::insert_returning_id;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::models::date_query::DateQuery;
use crate::models::pain::PainMap;
use crate::models::training_log::{CreateTrainingLogRequest, TrainingLog};
use crate::services::emotion::{self, WithEmotion};
use crate::AppState;

const COLUMNS: [&str; 11] = [
    "user_id",
    "training_date",
    "intensity",
    "immersion",
    "achievement",
    "weather",
    "emotion",
    "training_content",
    "feedback",
    "next_goal",
    "weight",
];

pub async fn create_training_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<CreateTrainingLogRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;

    let training_date = body.training_date.unwrap_or_else(|| Utc::now().date_naive());
    let pain = PainMap::from(body.pain);

    let columns: Vec<&str> = COLUMNS.iter().chain(PainMap::COLUMNS.iter()).copied().collect();
    let sql = insert_returning_id("training_logs", &columns);

    let mut query = sqlx::query_scalar::<_, i64>(&sql)
        .bind(auth_user.id)
        .bind(training_date)
        .bind(body.intensity)
        .bind(body.immersion)
        .bind(body.achievement)
        .bind(&body.weather)
        .bind(emotion::encode(body.emotion))
        .bind(&body.training_content)
        .bind(&body.feedback)
        .bind(&body.next_goal)
        .bind(body.weight);
    for level in pain.values() {
        query = query.bind(level);
    }

    let log_id = query.fetch_one(&state.db).await?;

    tracing::info!(user_id = auth_user.id, log_id, "Training log created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Training log saved", "log_id": log_id })),
    ))
}

pub async fn list_training_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let logs = sqlx::query_as::<_, TrainingLog>(
        r#"
        SELECT * FROM training_logs
        WHERE user_id = $1
        ORDER BY training_date DESC, created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "data": with_emotion(logs) })))
}

pub async fn list_training_logs_by_date(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Value>> {
    let date = query.parse()?;

    let logs = sqlx::query_as::<_, TrainingLog>(
        r#"
        SELECT * FROM training_logs
        WHERE user_id = $1 AND training_date = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "data": with_emotion(logs) })))
}

pub async fn delete_training_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(log_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM training_logs WHERE id = $1 AND user_id = $2")
        .bind(log_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Training log not found".into()));
    }

    tracing::info!(user_id = auth_user.id, log_id, "Training log deleted");
    Ok(Json(json!({ "success": true, "message": "Training log deleted" })))
}

fn with_emotion(logs: Vec<TrainingLog>) -> Vec<WithEmotion<TrainingLog>> {
    logs.into_iter().map(emotion::attach).collect()
}
