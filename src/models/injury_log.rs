use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::services::emotion::{EmotionInput, HasEmotion};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "injury_log_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Injury,
    Rehab,
}

/// One row of `injury_logs`: either an injury or a rehab entry under one.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InjuryLog {
    pub id: i64,
    pub user_id: i64,
    pub log_type: LogType,
    pub parent_injury_id: Option<i64>,
    pub log_date: NaiveDate,
    #[serde(skip_serializing)]
    pub emotion: Option<String>,
    pub injury_part: Option<String>,
    pub injury_cause: Option<String>,
    pub injury_content: Option<String>,
    pub pain_level: Option<i32>,
    pub rehab_content: Option<String>,
    pub rehab_feedback: Option<String>,
    pub next_rehab_goal: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HasEmotion for InjuryLog {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn raw_emotion(&self) -> Option<&str> {
        self.emotion.as_deref()
    }
}

/// POST /api/injury-logs
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInjuryLogRequest {
    pub log_type: LogType,
    pub parent_injury_id: Option<i64>,
    pub log_date: Option<NaiveDate>,
    pub emotion: Option<EmotionInput>,

    #[serde(flatten)]
    #[validate]
    pub details: InjuryDetails,
}

/// The type-specific text fields. Used as-is for updates, where only the
/// fields that are present get written.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct InjuryDetails {
    #[validate(length(max = 50))]
    pub injury_part: Option<String>,
    #[validate(length(max = 2000))]
    pub injury_cause: Option<String>,
    #[validate(length(max = 5000))]
    pub injury_content: Option<String>,
    #[validate(range(min = 0, max = 10, message = "must be 0-10"))]
    pub pain_level: Option<i32>,

    #[validate(length(max = 5000))]
    pub rehab_content: Option<String>,
    #[validate(length(max = 5000))]
    pub rehab_feedback: Option<String>,
    #[validate(length(max = 2000))]
    pub next_rehab_goal: Option<String>,
}

impl InjuryDetails {
    fn has_injury_fields(&self) -> bool {
        self.injury_part.is_some()
            || self.injury_cause.is_some()
            || self.injury_content.is_some()
            || self.pain_level.is_some()
    }

    fn has_rehab_fields(&self) -> bool {
        self.rehab_content.is_some() || self.rehab_feedback.is_some() || self.next_rehab_goal.is_some()
    }

    /// Reject fields that belong to the other log type.
    pub fn validate_for(&self, log_type: LogType) -> Result<(), String> {
        match log_type {
            LogType::Injury if self.has_rehab_fields() => {
                Err("rehab fields cannot be set on an injury log".into())
            }
            LogType::Rehab if self.has_injury_fields() => {
                Err("injury fields cannot be set on a rehab log".into())
            }
            _ => Ok(()),
        }
    }
}

impl CreateInjuryLogRequest {
    /// A rehab entry needs a parent injury, an injury entry must not have one.
    pub fn validate_parent(&self) -> Result<(), String> {
        match (self.log_type, self.parent_injury_id) {
            (LogType::Rehab, None) => Err("parent_injury_id is required for a rehab log".into()),
            (LogType::Injury, Some(_)) => {
                Err("parent_injury_id is only allowed on a rehab log".into())
            }
            _ => Ok(()),
        }
    }
}

/// PUT /api/injury-logs/:id
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInjuryLogRequest {
    pub log_date: Option<NaiveDate>,
    pub emotion: Option<EmotionInput>,

    #[serde(flatten)]
    #[validate]
    pub details: InjuryDetails,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRehabRequest {
    pub rehab_log_id: i64,
}
