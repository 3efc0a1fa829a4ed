//! Coach feedback from an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::analysis::CoachFeedback;

/// Which journal a feedback request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalKind {
    Match,
    Rehab,
}

impl JournalKind {
    fn persona(self) -> &'static str {
        match self {
            JournalKind::Match => {
                "You are a professional sports coach who reviews an athlete's match journal. \
                 Be friendly but professional."
            }
            JournalKind::Rehab => {
                "You are a professional rehabilitation coach who reviews an athlete's rehab journal. \
                 Be warm and encouraging so the athlete keeps up their rehab."
            }
        }
    }

    fn noun(self) -> &'static str {
        match self {
            JournalKind::Match => "match",
            JournalKind::Rehab => "rehab session",
        }
    }
}

/// The three free-text fields every journal carries.
#[derive(Debug, Clone, Copy)]
pub struct JournalEntry<'a> {
    pub kind: JournalKind,
    pub content: Option<&'a str>,
    pub self_feedback: Option<&'a str>,
    pub next_goal: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Built once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct CoachClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    language: String,
}

impl CoachClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()
            .context("Failed to build coach HTTP client")?;

        Ok(Self {
            http,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            language: config.feedback_language.clone(),
        })
    }

    pub async fn feedback(&self, entry: JournalEntry<'_>) -> anyhow::Result<CoachFeedback> {
        let request = ChatRequest {
            model: &self.model,
            messages: self.build_messages(entry),
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Coach API request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Coach API error {}: {}", status, body);
        }

        let completion: ChatResponse = response
            .json()
            .await
            .context("Coach API returned an unexpected body")?;
        parse_feedback(completion)
    }

    fn build_messages(&self, entry: JournalEntry<'_>) -> Vec<ChatMessage> {
        let system = format!(
            "{} Always answer in {} and only with a JSON object.",
            entry.kind.persona(),
            self.language
        );

        let noun = entry.kind.noun();
        let user = format!(
            r#"Review the following {noun} journal and give professional feedback.

[What happened]
{content}

[Self feedback]
{self_feedback}

[Next goal]
{next_goal}

Reply with exactly this JSON schema:
{{
  "well_done": "one sentence on what went well in this {noun}",
  "to_improve": "one sentence on what to improve or watch out for next time",
  "mental_coaching": "one warm sentence of motivation or mental coaching"
}}"#,
            content = or_none(entry.content),
            self_feedback = or_none(entry.self_feedback),
            next_goal = or_none(entry.next_goal),
        );

        vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ]
    }
}

fn or_none(text: Option<&str>) -> &str {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => "(none)",
    }
}

fn parse_feedback(completion: ChatResponse) -> anyhow::Result<CoachFeedback> {
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("Coach API returned no choices")?;

    serde_json::from_str(&content)
        .with_context(|| format!("Coach reply does not match the feedback schema: {content}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CoachClient {
        let mut config = Config::for_tests();
        config.openai_base_url = format!("{}/v1/", server.uri());
        CoachClient::new(&config).unwrap()
    }

    fn entry() -> JournalEntry<'static> {
        JournalEntry {
            kind: JournalKind::Rehab,
            content: Some("Balance board, 3 x 1 min"),
            self_feedback: None,
            next_goal: Some("  "),
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
    }

    #[test]
    fn test_prompt_fills_missing_fields() {
        let config = Config::for_tests();
        let client = CoachClient::new(&config).unwrap();
        let messages = client.build_messages(entry());

        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("rehabilitation coach"));
        assert!(messages[0].content.contains("answer in Korean"));
        assert!(messages[1].content.contains("Balance board, 3 x 1 min"));
        assert_eq!(messages[1].content.matches("(none)").count(), 2);
        assert!(messages[1].content.contains("\"mental_coaching\""));
    }

    #[tokio::test]
    async fn test_feedback_parses_json_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "response_format": { "type": "json_object" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"{"well_done":"Consistent","to_improve":"Add mobility","mental_coaching":"Keep going"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let feedback = client_for(&server).feedback(entry()).await.unwrap();
        assert_eq!(
            feedback,
            CoachFeedback {
                well_done: "Consistent".into(),
                to_improve: "Add mobility".into(),
                mental_coaching: "Keep going".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_feedback_rejects_off_schema_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(r#"{"summary":"nice"}"#)),
            )
            .mount(&server)
            .await;

        assert!(client_for(&server).feedback(entry()).await.is_err());
    }

    #[tokio::test]
    async fn test_feedback_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client_for(&server).feedback(entry()).await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
