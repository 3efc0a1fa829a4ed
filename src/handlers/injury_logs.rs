use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::{self, patch::Patch};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::models::analysis::LogAnalysis;
use crate::models::date_query::DateQuery;
use crate::models::injury_log::{
    AnalyzeRehabRequest, CreateInjuryLogRequest, InjuryDetails, InjuryLog, LogType,
    UpdateInjuryLogRequest,
};
use crate::services::coach::{JournalEntry, JournalKind};
use crate::services::emotion::{self, WithEmotion};
use crate::services::injury_tree::{self, InjuryWithRehabs};
use crate::AppState;

pub async fn create_injury_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<CreateInjuryLogRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;
    body.validate_parent().map_err(AppError::Validation)?;
    body.details
        .validate_for(body.log_type)
        .map_err(AppError::Validation)?;

    // The parent must be one of the caller's own injury records.
    if let Some(parent_id) = body.parent_injury_id {
        db::injury_logs::find_owned(&state.db, parent_id, auth_user.id, Some(LogType::Injury))
            .await?
            .ok_or(AppError::NotFound("Parent injury log not found".into()))?;
    }

    let log_date = body.log_date.unwrap_or_else(|| Utc::now().date_naive());
    let d = body.details;

    let log_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO injury_logs (
            user_id, log_type, parent_injury_id, log_date, emotion,
            injury_part, injury_cause, injury_content, pain_level,
            rehab_content, rehab_feedback, next_rehab_goal
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id
        "#,
    )
    .bind(auth_user.id)
    .bind(body.log_type)
    .bind(body.parent_injury_id)
    .bind(log_date)
    .bind(emotion::encode(body.emotion))
    .bind(&d.injury_part)
    .bind(&d.injury_cause)
    .bind(&d.injury_content)
    .bind(d.pain_level)
    .bind(&d.rehab_content)
    .bind(&d.rehab_feedback)
    .bind(&d.next_rehab_goal)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        user_id = auth_user.id,
        log_id,
        log_type = ?body.log_type,
        "Injury log created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Log saved", "log_id": log_id })),
    ))
}

pub async fn list_injury_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let records = db::injury_logs::list_for_user(&state.db, auth_user.id).await?;
    let tree: Vec<InjuryWithRehabs> = injury_tree::assemble(records);

    Ok(Json(json!({ "success": true, "data": tree })))
}

pub async fn list_injury_logs_by_date(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Value>> {
    let date = query.parse()?;

    let logs: Vec<WithEmotion<InjuryLog>> =
        db::injury_logs::list_for_user_on(&state.db, auth_user.id, date)
            .await?
            .into_iter()
            .map(emotion::attach)
            .collect();

    Ok(Json(json!({ "success": true, "data": logs })))
}

pub async fn update_injury_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(log_id): AppPath<i64>,
    AppJson(body): AppJson<UpdateInjuryLogRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;

    let existing = db::injury_logs::find_owned(&state.db, log_id, auth_user.id, None)
        .await?
        .ok_or(AppError::NotFound("Injury log not found".into()))?;
    body.details
        .validate_for(existing.log_type)
        .map_err(AppError::Validation)?;

    let Some(mut query) = injury_patch(body).finish_owned(log_id, auth_user.id) else {
        return Err(AppError::Validation("No fields to update".into()));
    };

    let updated = query
        .build_query_as::<InjuryLog>()
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Injury log not found".into()))?;

    tracing::info!(user_id = auth_user.id, log_id, "Injury log updated");
    Ok(Json(json!({ "success": true, "data": emotion::attach(updated) })))
}

/// Statically declared set of injury-log columns a user may change. Type and
/// parent are fixed at creation.
fn injury_patch(body: UpdateInjuryLogRequest) -> Patch<'static> {
    let InjuryDetails {
        injury_part,
        injury_cause,
        injury_content,
        pain_level,
        rehab_content,
        rehab_feedback,
        next_rehab_goal,
    } = body.details;

    let mut patch = Patch::new("injury_logs");
    patch
        .set("log_date", body.log_date)
        .set("emotion", emotion::encode(body.emotion))
        .set("injury_part", injury_part)
        .set("injury_cause", injury_cause)
        .set("injury_content", injury_content)
        .set("pain_level", pain_level)
        .set("rehab_content", rehab_content)
        .set("rehab_feedback", rehab_feedback)
        .set("next_rehab_goal", next_rehab_goal);
    patch
}

pub async fn delete_injury_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(log_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    // Rehab children go with their injury (ON DELETE CASCADE).
    let result = sqlx::query("DELETE FROM injury_logs WHERE id = $1 AND user_id = $2")
        .bind(log_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Injury log not found".into()));
    }

    tracing::info!(user_id = auth_user.id, log_id, "Injury log deleted");
    Ok(Json(json!({ "success": true, "message": "Log deleted" })))
}

pub async fn analyze_rehab_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<AnalyzeRehabRequest>,
) -> AppResult<Json<Value>> {
    let log = db::injury_logs::find_owned(
        &state.db,
        body.rehab_log_id,
        auth_user.id,
        Some(LogType::Rehab),
    )
    .await?
    .ok_or(AppError::NotFound("Rehab log not found".into()))?;

    let feedback = state
        .coach
        .feedback(JournalEntry {
            kind: JournalKind::Rehab,
            content: log.rehab_content.as_deref(),
            self_feedback: log.rehab_feedback.as_deref(),
            next_goal: log.next_rehab_goal.as_deref(),
        })
        .await
        .map_err(AppError::Upstream)?;

    let result = serde_json::to_value(&feedback).map_err(anyhow::Error::from)?;

    sqlx::query(
        r#"
        INSERT INTO rehab_analysis_results (user_id, rehab_log_id, analysis_result)
        VALUES ($1, $2, $3)
        ON CONFLICT (rehab_log_id) DO UPDATE SET
            analysis_result = EXCLUDED.analysis_result,
            updated_at = NOW()
        "#,
    )
    .bind(auth_user.id)
    .bind(log.id)
    .bind(&result)
    .execute(&state.db)
    .await?;

    tracing::info!(user_id = auth_user.id, log_id = log.id, "Rehab log analyzed");

    Ok(Json(json!({ "message": "Rehab log analyzed", "data": result })))
}

pub async fn get_rehab_analysis(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(log_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    let analysis = sqlx::query_as::<_, LogAnalysis>(
        r#"
        SELECT id, user_id, rehab_log_id AS log_id, analysis_result, created_at, updated_at
        FROM rehab_analysis_results
        WHERE rehab_log_id = $1 AND user_id = $2
        "#,
    )
    .bind(log_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("No analysis for this rehab log".into()))?;

    Ok(Json(json!({ "success": true, "data": analysis })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injury_patch_sql() {
        let body: UpdateInjuryLogRequest = serde_json::from_str(
            r#"{"emotion": ["relieved"], "rehab_feedback": "less swelling", "log_type": "injury"}"#,
        )
        .unwrap();
        let builder = injury_patch(body).finish_owned(5, 2).unwrap();
        assert_eq!(
            builder.sql(),
            "UPDATE injury_logs SET emotion = $1, rehab_feedback = $2, \
             updated_at = NOW() WHERE id = $3 AND user_id = $4 RETURNING *"
        );
    }
}
