use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::pain::{PainInput, PainMap};
use crate::services::emotion::{EmotionInput, HasEmotion};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MatchLog {
    pub id: i64,
    pub user_id: i64,
    pub match_date: NaiveDate,
    pub weather: String,
    pub match_rank: Option<String>,
    pub personal_record: Option<String>,
    pub match_immersion: i32,
    #[serde(skip_serializing)]
    pub emotion: Option<String>,
    pub match_content: Option<String>,
    pub match_feedback: Option<String>,
    pub next_match_goal: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub pain: PainMap,
    pub created_at: DateTime<Utc>,
}

impl HasEmotion for MatchLog {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn raw_emotion(&self) -> Option<&str> {
        self.emotion.as_deref()
    }
}

/// POST /api/match-logs
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMatchLogRequest {
    pub match_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 30, message = "is required"))]
    pub weather: String,

    #[validate(range(min = 1, max = 5, message = "must be 1-5"))]
    pub match_immersion: i32,

    #[validate(length(max = 50))]
    pub match_rank: Option<String>,
    #[validate(length(max = 100))]
    pub personal_record: Option<String>,

    pub emotion: Option<EmotionInput>,

    #[validate(length(max = 5000))]
    pub match_content: Option<String>,
    #[validate(length(max = 5000))]
    pub match_feedback: Option<String>,
    #[validate(length(max = 2000))]
    pub next_match_goal: Option<String>,

    #[serde(flatten)]
    #[validate]
    pub pain: PainInput,
}
