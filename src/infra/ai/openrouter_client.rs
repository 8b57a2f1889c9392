use crate::core::ai::{
    models::{AiConfig, AiMessage, AiProviderResponse},
    AiProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::error::Error;

const CHAT_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

pub struct OpenRouterClient {
    client: Client,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

/// Pulls the answer and any separate reasoning out of a chat completion.
fn parse_completion(response: &Value) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
    let message = &response["choices"][0]["message"];
    let content = message["content"]
        .as_str()
        .ok_or("Failed to parse response content")?
        .to_string();
    let thinking = message["reasoning"]
        .as_str()
        .filter(|r| !r.trim().is_empty())
        .map(str::to_string);

    Ok(AiProviderResponse { content, thinking })
}

#[async_trait]
impl AiProvider for OpenRouterClient {
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
        let payload = json!({
            "model": config.model,
            "messages": messages,
            "temperature": config.temperature,
            "max_tokens": config.max_tokens,
        });

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(format!("OpenRouter API error: {} - {}", status, text).into());
        }

        let response_json: Value = response.json().await?;
        parse_completion(&response_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_with_reasoning() {
        let parsed = parse_completion(&json!({
            "choices": [{"message": {"content": "```json\n{}\n```", "reasoning": "thought"}}]
        }))
        .unwrap();
        assert_eq!(parsed.content, "```json\n{}\n```");
        assert_eq!(parsed.thinking.as_deref(), Some("thought"));
    }

    #[test]
    fn test_parse_completion_without_content_fails() {
        assert!(parse_completion(&json!({"choices": []})).is_err());
    }
}
