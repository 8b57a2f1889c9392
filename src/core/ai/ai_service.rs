use super::models::{AiConfig, AiMessage, AiProviderResponse};
use crate::core::content::ReportError;
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Sends a chat completion request to the AI provider.
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>>;
}

// Lets the composition root pick a provider at runtime.
#[async_trait]
impl AiProvider for Box<dyn AiProvider> {
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
        (**self).chat_complete(messages, config).await
    }
}

/// A provider bound to one model configuration.
pub struct AiService<P: AiProvider> {
    provider: P,
    config: AiConfig,
}

impl<P: AiProvider> AiService<P> {
    pub fn new(provider: P, config: AiConfig) -> Self {
        Self { provider, config }
    }

    #[cfg(test)]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// One system + user exchange; returns the trimmed answer text.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ReportError> {
        let messages = [AiMessage::system(system_prompt), AiMessage::user(user_prompt)];

        let response = self
            .provider
            .chat_complete(&messages, &self.config)
            .await
            .map_err(|e| ReportError::Provider(e.to_string()))?;

        if let Some(thinking) = &response.thinking {
            tracing::debug!(model = %self.config.model, chars = thinking.len(), "Model returned reasoning");
        }

        let answer = response.content.trim().to_string();
        if answer.is_empty() {
            return Err(ReportError::Provider(format!(
                "model '{}' returned an empty answer",
                self.config.model
            )));
        }
        Ok(answer)
    }
}
