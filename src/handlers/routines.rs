use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::models::routine::{AddRoutineRequest, Routine, UserRoutine};
use crate::AppState;

pub async fn catalog(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let routines = sqlx::query_as::<_, Routine>(
        "SELECT id, title, subtitle, tag FROM routines ORDER BY id ASC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "data": routines })))
}

pub async fn list_my_routines(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let routines = sqlx::query_as::<_, UserRoutine>(
        r#"
        SELECT r.id, r.title, r.subtitle, r.tag, ur.created_at AS added_at
        FROM user_routines ur
        JOIN routines r ON r.id = ur.routine_id
        WHERE ur.user_id = $1
        ORDER BY ur.created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "data": routines })))
}

pub async fn add_routine(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<AddRoutineRequest>,
) -> AppResult<Json<Value>> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM routines WHERE id = $1)",
    )
    .bind(body.routine_id)
    .fetch_one(&state.db)
    .await?;

    if !exists {
        return Err(AppError::NotFound("Routine not found".into()));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO user_routines (user_id, routine_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, routine_id) DO NOTHING
        "#,
    )
    .bind(auth_user.id)
    .bind(body.routine_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict("Routine is already in your list".into()));
    }

    tracing::info!(user_id = auth_user.id, routine_id = body.routine_id, "Routine added");

    Ok(Json(json!({ "success": true, "message": "Routine added" })))
}

pub async fn remove_routine(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(routine_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM user_routines WHERE user_id = $1 AND routine_id = $2")
        .bind(auth_user.id)
        .bind(routine_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Routine is not in your list".into()));
    }

    tracing::info!(user_id = auth_user.id, routine_id, "Routine removed");
    Ok(Json(json!({ "success": true, "message": "Routine removed" })))
}
