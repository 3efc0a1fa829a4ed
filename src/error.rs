use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication token is missing")]
    MissingToken,

    #[error("Authentication token is invalid")]
    InvalidToken,

    #[error("Invalid login id or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("AI service error: {0}")]
    Upstream(anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_field_errors(&errors, &mut fields);
        fields.sort();
        AppError::Validation(fields.join("; "))
    }
}

/// Flatten nested validation errors into `field: detail` pairs. Nested request
/// structs are `#[serde(flatten)]`ed, so their fields are named without a prefix.
fn collect_field_errors(errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let detail = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(ToString::to_string))
                    .unwrap_or_else(|| "is invalid".into());
                out.push(format!("{field}: {detail}"));
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_field_errors(nested, out);
                }
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingToken | AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::InvalidToken => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "AI service error");
                (
                    StatusCode::BAD_GATEWAY,
                    "AI analysis service is unavailable".into(),
                )
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// True when the error is a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(range(min = 1, max = 5))]
        score: i32,
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::MissingToken, StatusCode::UNAUTHORIZED),
            (AppError::InvalidToken, StatusCode::FORBIDDEN),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                AppError::Upstream(anyhow::anyhow!("boom")),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_validation_errors_are_flattened() {
        let sample = Sample {
            name: "ab".into(),
            score: 9,
        };
        let err: AppError = sample.validate().unwrap_err().into();
        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "name: too short; score: is invalid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nested_validation_errors_name_the_field() {
        use crate::models::injury_log::CreateInjuryLogRequest;
        use crate::models::training_log::CreateTrainingLogRequest;

        let training: CreateTrainingLogRequest = serde_json::from_str(
            r#"{"intensity": 3, "immersion": 3, "achievement": 3, "weather": "sunny", "pain_head": 11}"#,
        )
        .unwrap();
        match AppError::from(training.validate().unwrap_err()) {
            AppError::Validation(msg) => assert_eq!(msg, "pain_head: is invalid"),
            other => panic!("unexpected error: {other:?}"),
        }

        let injury: CreateInjuryLogRequest =
            serde_json::from_str(r#"{"log_type": "injury", "pain_level": 12}"#).unwrap();
        match AppError::from(injury.validate().unwrap_err()) {
            AppError::Validation(msg) => assert_eq!(msg, "pain_level: must be 0-10"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nested_and_top_level_errors_are_merged() {
        use crate::models::training_log::CreateTrainingLogRequest;

        let req: CreateTrainingLogRequest = serde_json::from_str(
            r#"{"intensity": 9, "immersion": 3, "achievement": 3, "weather": "rain", "pain_knee": -1}"#,
        )
        .unwrap();
        match AppError::from(req.validate().unwrap_err()) {
            AppError::Validation(msg) => {
                assert_eq!(msg, "intensity: must be 1-5; pain_knee: is invalid")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
