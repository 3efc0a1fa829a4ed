use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::pain::{PainInput, PainMap};
use crate::services::emotion::{EmotionInput, HasEmotion};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrainingLog {
    pub id: i64,
    pub user_id: i64,
    pub training_date: NaiveDate,
    pub intensity: i32,
    pub immersion: i32,
    pub achievement: i32,
    pub weather: String,
    #[serde(skip_serializing)]
    pub emotion: Option<String>,
    pub training_content: Option<String>,
    pub feedback: Option<String>,
    pub next_goal: Option<String>,
    pub weight: Option<f64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub pain: PainMap,
    pub created_at: DateTime<Utc>,
}

impl HasEmotion for TrainingLog {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn raw_emotion(&self) -> Option<&str> {
        self.emotion.as_deref()
    }
}

/// POST /api/training-logs
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTrainingLogRequest {
    /// Defaults to today (UTC).
    pub training_date: Option<NaiveDate>,

    #[validate(range(min = 1, max = 5, message = "must be 1-5"))]
    pub intensity: i32,
    #[validate(range(min = 1, max = 5, message = "must be 1-5"))]
    pub immersion: i32,
    #[validate(range(min = 1, max = 5, message = "must be 1-5"))]
    pub achievement: i32,

    #[validate(length(min = 1, max = 30, message = "is required"))]
    pub weather: String,

    pub emotion: Option<EmotionInput>,

    #[validate(length(max = 5000))]
    pub training_content: Option<String>,
    #[validate(length(max = 5000))]
    pub feedback: Option<String>,
    #[validate(length(max = 2000))]
    pub next_goal: Option<String>,

    #[validate(range(min = 20.0, max = 300.0, message = "must be 20-300"))]
    pub weight: Option<f64>,

    #[serde(flatten)]
    #[validate]
    pub pain: PainInput,
}
