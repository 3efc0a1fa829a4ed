//! Client for the external training-log analyzer service.

use std::time::Duration;

use anyhow::Context;

use crate::config::Config;
use crate::models::analysis::TrainingAnalysisRequest;

#[derive(Clone)]
pub struct TrainingAnalyzer {
    http: reqwest::Client,
    url: String,
}

impl TrainingAnalyzer {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()
            .context("Failed to build analyzer HTTP client")?;

        Ok(Self {
            http,
            url: config.training_analyzer_url.clone(),
        })
    }

    /// Forward the journal text and hand back the analyzer's JSON untouched.
    pub async fn analyze(
        &self,
        request: &TrainingAnalysisRequest,
    ) -> anyhow::Result<serde_json::Value> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .context("Training analyzer request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Training analyzer error {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Training analyzer returned a non-JSON body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn analyzer_for(server: &MockServer) -> TrainingAnalyzer {
        let mut config = Config::for_tests();
        config.training_analyzer_url = format!("{}/analyze", server.uri());
        TrainingAnalyzer::new(&config).unwrap()
    }

    fn request() -> TrainingAnalysisRequest {
        TrainingAnalysisRequest {
            training_log_id: Some(12),
            training_content: Some("5 x 1km at threshold".into()),
            feedback: Some("Legs felt heavy".into()),
            next_goal: None,
        }
    }

    #[tokio::test]
    async fn test_forwards_fields_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_json(json!({
                "training_content": "5 x 1km at threshold",
                "feedback": "Legs felt heavy",
                "next_goal": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": "Solid threshold work",
                "score": 82
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = analyzer_for(&server).analyze(&request()).await.unwrap();
        assert_eq!(result["score"], 82);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(analyzer_for(&server).analyze(&request()).await.is_err());
    }
}
