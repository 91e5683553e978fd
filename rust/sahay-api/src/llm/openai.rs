//! OpenAI-compatible chat completions client.
//!
//! Works against OpenAI or any API exposing the same
//! `/v1/chat/completions` contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{CompletionRequest, LlmClient, LlmError, LlmSettings};

/// OpenAI-compatible API client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    settings: LlmSettings,
    client: Client,
}

impl OpenAiClient {
    /// Create a new client with the per-call timeout from settings.
    pub fn new(settings: LlmSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { settings, client })
    }

    /// Build the API URL.
    fn api_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "messages": req.messages,
            "temperature": req.temperature,
            "max_tokens": req.max_tokens,
        });

        let mut request = self.client.post(self.api_url()).json(&body);

        if let Some(ref api_key) = self.settings.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let completion: ChatCompletion = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Malformed("no choices in completion".to_string()))
    }
}

/// Chat completion response body.
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_handles_trailing_slash() {
        let client = OpenAiClient::new(LlmSettings {
            base_url: "https://api.openai.com/".to_string(),
            ..LlmSettings::default()
        })
        .unwrap();
        assert_eq!(
            client.api_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
