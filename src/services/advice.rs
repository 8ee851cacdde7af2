//! Chat-completion advice client.
//!
//! Sends the computed metrics plus the user's question to an OpenAI-compatible
//! chat completions endpoint and returns the model's free-text advice.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::AppError;

const OPENAI_API_URL: &str = "https://api.openai.com";

/// Timeout for each advice request. Completions are slower than the metric
/// lookups, so this is deliberately more generous.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// --- Chat completions wire types ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for the chat completions endpoint.
#[derive(Debug, Clone)]
pub struct AdviceClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl AdviceClient {
    pub fn new(model: &str) -> Self {
        Self::with_base_url(OPENAI_API_URL, model)
    }

    /// Construct against a non-default base URL (used by tests to point at a
    /// mock server).
    pub fn with_base_url(base_url: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Request a short advisory text for the given context.
    ///
    /// Returns `None` when the model answers with an empty choice list or an
    /// empty message, mirroring how callers treat "no advice".
    pub async fn complete(&self, api_key: &str, prompt: &str) -> Result<Option<String>, AppError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("chat completion request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "chat completion endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("chat completion JSON parse error: {}", e)))?;

        Ok(body.choices.into_iter().next().and_then(|c| c.message.content))
    }
}

/// Build the advice prompt embedding the user's question and the computed
/// metrics. Absent metrics are rendered as "null" so the model sees which
/// inputs were unavailable.
pub fn build_prompt(
    question: &str,
    aqi: Option<i64>,
    congestion_percent: Option<f64>,
    overall_health: Option<f64>,
) -> String {
    format!(
        "User asked: \"{}\". \nAQI: {}, Traffic: {}%, Health Score: {}. \nGive a short, safe advice.",
        question,
        fmt_opt_i64(aqi),
        fmt_opt_f64(congestion_percent),
        fmt_opt_f64(overall_health),
    )
}

fn fmt_opt_i64(v: Option<i64>) -> String {
    v.map_or_else(|| "null".to_string(), |n| n.to_string())
}

fn fmt_opt_f64(v: Option<f64>) -> String {
    v.map_or_else(|| "null".to_string(), |n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({ "model": "gpt-4o-mini" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "Stay indoors at rush hour." } }
                ]
            })))
            .mount(&server)
            .await;

        let client = AdviceClient::with_base_url(&server.uri(), "gpt-4o-mini");
        let advice = client.complete("test-key", "Can I cycle today?").await.unwrap();
        assert_eq!(advice.as_deref(), Some("Stay indoors at rush hour."));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let client = AdviceClient::with_base_url(&server.uri(), "gpt-4o-mini");
        let advice = client.complete("test-key", "prompt").await.unwrap();
        assert_eq!(advice, None);
    }

    #[tokio::test]
    async fn test_complete_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = AdviceClient::with_base_url(&server.uri(), "gpt-4o-mini");
        let err = client.complete("bad-key", "prompt").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn test_build_prompt_embeds_metrics() {
        let prompt = build_prompt("Is it safe?", Some(120), Some(35.5), Some(61.2));
        assert!(prompt.contains("User asked: \"Is it safe?\""));
        assert!(prompt.contains("AQI: 120"));
        assert!(prompt.contains("Traffic: 35.5%"));
        assert!(prompt.contains("Health Score: 61.2"));
    }

    #[test]
    fn test_build_prompt_renders_missing_as_null() {
        let prompt = build_prompt("Is it safe?", None, None, None);
        assert!(prompt.contains("AQI: null"));
        assert!(prompt.contains("Traffic: null%"));
        assert!(prompt.contains("Health Score: null"));
    }
}
