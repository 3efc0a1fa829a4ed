use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub login_id: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub nickname: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub mbti: Option<String>,
    pub athlete_type: Option<String>,
    pub sport: Option<String>,
    pub weekly_exercise_count: Option<i32>,
    pub concern: Option<String>,
    pub goal: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a user may see of any account, including their own.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub login_id: String,
    pub name: String,
    pub nickname: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub mbti: Option<String>,
    pub athlete_type: Option<String>,
    pub sport: Option<String>,
    pub weekly_exercise_count: Option<i32>,
    pub concern: Option<String>,
    pub goal: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            login_id: u.login_id,
            name: u.name,
            nickname: u.nickname,
            gender: u.gender,
            age: u.age,
            height_cm: u.height_cm,
            weight_kg: u.weight_kg,
            mbti: u.mbti,
            athlete_type: u.athlete_type,
            sport: u.sport,
            weekly_exercise_count: u.weekly_exercise_count,
            concern: u.concern,
            goal: u.goal,
            created_at: u.created_at,
        }
    }
}

/// POST /api/users/signup
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 50, message = "must be 3-50 characters"))]
    pub login_id: String,

    #[validate(length(min = 8, max = 128, message = "must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,

    #[serde(flatten)]
    #[validate]
    pub profile: ProfileFields,
}

/// Optional athlete profile fields, shared by signup and profile update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileFields {
    #[validate(length(max = 50))]
    pub nickname: Option<String>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(range(min = 1, max = 120, message = "must be 1-120"))]
    pub age: Option<i32>,
    #[validate(range(min = 50.0, max = 260.0, message = "must be 50-260"))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 20.0, max = 300.0, message = "must be 20-300"))]
    pub weight_kg: Option<f64>,
    #[validate(length(equal = 4, message = "must be a 4-letter type"))]
    pub mbti: Option<String>,
    #[validate(length(max = 50))]
    pub athlete_type: Option<String>,
    #[validate(length(max = 50))]
    pub sport: Option<String>,
    #[validate(range(min = 0, max = 28, message = "must be 0-28"))]
    pub weekly_exercise_count: Option<i32>,
    #[validate(length(max = 2000))]
    pub concern: Option<String>,
    #[validate(length(max = 2000))]
    pub goal: Option<String>,
}

/// POST /api/users/login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

/// PUT /api/users/me: every field optional, only present ones are written.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(flatten)]
    #[validate]
    pub profile: ProfileFields,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserProfile,
}
