use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::analysis::{TrainingAnalysis, TrainingAnalysisRequest};
use crate::AppState;

pub async fn analyze_training(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<TrainingAnalysisRequest>,
) -> AppResult<Json<Value>> {
    if body.is_empty() {
        return Err(AppError::Validation(
            "training_content, feedback or next_goal is required".into(),
        ));
    }

    if let Some(log_id) = body.training_log_id {
        let owned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM training_logs WHERE id = $1 AND user_id = $2)",
        )
        .bind(log_id)
        .bind(auth_user.id)
        .fetch_one(&state.db)
        .await?;

        if !owned {
            return Err(AppError::NotFound("Training log not found".into()));
        }
    }

    let result = state
        .analyzer
        .analyze(&body)
        .await
        .map_err(AppError::Upstream)?;

    let analysis_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO training_analysis_results (user_id, training_log_id, analysis_result)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(auth_user.id)
    .bind(body.training_log_id)
    .bind(&result)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        user_id = auth_user.id,
        analysis_id,
        training_log_id = ?body.training_log_id,
        "Training analysis stored"
    );

    Ok(Json(result))
}

pub async fn list_my_analyses(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let analyses = sqlx::query_as::<_, TrainingAnalysis>(
        r#"
        SELECT id, user_id, training_log_id, analysis_result, created_at
        FROM training_analysis_results
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "data": analyses })))
}
