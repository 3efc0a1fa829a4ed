use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Structured coach feedback returned by the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachFeedback {
    pub well_done: String,
    pub to_improve: String,
    pub mental_coaching: String,
}

/// Stored feedback for a match or rehab log. `log_id` is `match_log_id` or
/// `rehab_log_id` depending on the table it came from.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LogAnalysis {
    pub id: i64,
    pub user_id: i64,
    pub log_id: i64,
    pub analysis_result: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrainingAnalysis {
    pub id: i64,
    pub user_id: i64,
    pub training_log_id: Option<i64>,
    pub analysis_result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// POST /api/ai/analyze
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingAnalysisRequest {
    #[serde(default, skip_serializing)]
    pub training_log_id: Option<i64>,
    #[serde(default)]
    pub training_content: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub next_goal: Option<String>,
}

impl TrainingAnalysisRequest {
    pub fn is_empty(&self) -> bool {
        [&self.training_content, &self.feedback, &self.next_goal]
            .iter()
            .all(|f| f.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_request_omits_log_id_upstream() {
        let req: TrainingAnalysisRequest = serde_json::from_str(
            r#"{"training_log_id": 5, "training_content": "tempo run", "next_goal": "negative split"}"#,
        )
        .unwrap();
        assert_eq!(req.training_log_id, Some(5));

        let upstream = serde_json::to_value(&req).unwrap();
        assert!(upstream.get("training_log_id").is_none());
        assert_eq!(upstream["training_content"], "tempo run");
        assert!(upstream["feedback"].is_null());
    }

    #[test]
    fn test_blank_request_is_empty() {
        let req: TrainingAnalysisRequest =
            serde_json::from_str(r#"{"training_content": "  ", "feedback": null}"#).unwrap();
        assert!(req.is_empty());
    }
}
