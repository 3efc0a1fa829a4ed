use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::{
    jwt::create_access_token,
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::db::patch::Patch;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::extract::AppJson;
use crate::models::user::{
    LoginRequest, LoginResponse, ProfileFields, SignupRequest, UpdateProfileRequest, User,
    UserProfile,
};
use crate::AppState;

pub async fn signup(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;

    let pwd_hash = hash_password(&body.password)?;
    let p = body.profile;

    let result = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (
            login_id, password_hash, name, nickname, gender, age,
            height_cm, weight_kg, mbti, athlete_type, sport,
            weekly_exercise_count, concern, goal
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING id
        "#,
    )
    .bind(&body.login_id)
    .bind(&pwd_hash)
    .bind(&body.name)
    .bind(&p.nickname)
    .bind(&p.gender)
    .bind(p.age)
    .bind(p.height_cm)
    .bind(p.weight_kg)
    .bind(p.mbti.as_deref().map(str::to_uppercase))
    .bind(&p.athlete_type)
    .bind(&p.sport)
    .bind(p.weekly_exercise_count)
    .bind(&p.concern)
    .bind(&p.goal)
    .fetch_one(&state.db)
    .await;

    let id = match result {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Conflict("login_id is already taken".into()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = id, login_id = %body.login_id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Signup complete" })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE login_id = $1")
        .bind(&body.login_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        tracing::info!(login_id = %body.login_id, "Login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let token = create_access_token(user.id, &user.login_id, &state.config)?;

    Ok(Json(LoginResponse {
        access_token: token.access_token,
        token_type: token.token_type,
        expires_in: token.expires_in,
        user: user.into(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(user.into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    body.validate()?;

    let Some(mut query) = profile_patch(body).finish_for_user(auth_user.id) else {
        return Err(AppError::Validation("No profile fields to update".into()));
    };

    let user = query
        .build_query_as::<User>()
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    tracing::info!(user_id = auth_user.id, login_id = %auth_user.login_id, "Profile updated");
    Ok(Json(user.into()))
}

/// Statically declared set of profile columns a user may change.
fn profile_patch(body: UpdateProfileRequest) -> Patch<'static> {
    let ProfileFields {
        nickname,
        gender,
        age,
        height_cm,
        weight_kg,
        mbti,
        athlete_type,
        sport,
        weekly_exercise_count,
        concern,
        goal,
    } = body.profile;

    let mut patch = Patch::new("users");
    patch
        .set("name", body.name)
        .set("nickname", nickname)
        .set("gender", gender)
        .set("age", age)
        .set("height_cm", height_cm)
        .set("weight_kg", weight_kg)
        .set("mbti", mbti.map(|m| m.to_uppercase()))
        .set("athlete_type", athlete_type)
        .set("sport", sport)
        .set("weekly_exercise_count", weekly_exercise_count)
        .set("concern", concern)
        .set("goal", goal);
    patch
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<UserProfile>>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id ASC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}
