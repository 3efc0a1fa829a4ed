use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Routine {
    pub id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub tag: Option<String>,
}

/// A routine in a user's personal list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRoutine {
    pub id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub tag: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AddRoutineRequest {
    pub routine_id: i64,
}
