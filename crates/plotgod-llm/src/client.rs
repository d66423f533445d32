use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use plotgod_core::errors::LlmError;
use plotgod_core::provider::PrepGenerator;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-5.1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const TEMPERATURE: f64 = 0.8;
const MAX_TOKENS: u32 = 2000;

/// Chat-completions client for an OpenAI-compatible endpoint.
/// One request per generation, no retries; the caller decides how to surface
/// a failure.
pub struct OpenAiClient {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_body<'a>(&'a self, system_prompt: &'a str, user_prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[async_trait]
impl PrepGenerator for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let body = self.build_body(system_prompt, user_prompt);

        let resp = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, body));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::MalformedResponse("completion carried no content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OpenAiClient {
        OpenAiClient::new(
            SecretString::from("test-key"),
            DEFAULT_MODEL,
            DEFAULT_BASE_URL,
        )
    }

    #[test]
    fn client_properties() {
        let client = test_client();
        assert_eq!(client.model(), "gpt-5.1");
        assert_eq!(
            client.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let client = OpenAiClient::new(
            SecretString::from("k"),
            "gpt-5.1",
            "http://localhost:9999/v1/",
        );
        assert_eq!(
            client.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn request_body_shape() {
        let client = test_client();
        let body = client.build_body("system text", "user text");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-5.1");
        assert_eq!(json["temperature"], 0.8);
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "system text");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "user text");
    }

    #[test]
    fn response_parsing() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"prep text"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("prep text")
        );
    }

    #[tokio::test]
    async fn network_failure_is_not_retried() {
        // Nothing listens on this port; the call must fail once, fast.
        let client = OpenAiClient::new(
            SecretString::from("k"),
            "gpt-5.1",
            "http://127.0.0.1:1/v1",
        );
        let result = client.generate("s", "u").await;
        assert!(matches!(result, Err(LlmError::NetworkError(_))));
    }
}
