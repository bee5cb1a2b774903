//! OpenAI chat completion generator.

use super::TextGenerator;
use crate::config::GenerationSettings;
use crate::error::{GuideError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Generator backed by the OpenAI chat completions API.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiGenerator {
    pub fn new(settings: &GenerationSettings, api_key: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config).with_http_client(http_client);

        Ok(Self {
            client,
            model: settings.openai_model.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> String {
        format!("OpenAI ({})", self.model)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()
            .map_err(|e| GuideError::Generation(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .temperature(self.temperature)
            .build()
            .map_err(|e| GuideError::Generation(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| match e {
            OpenAIError::Reqwest(e) => {
                GuideError::Unavailable(format!("OpenAI request failed: {}", e))
            }
            e => GuideError::Generation(format!("OpenAI request failed: {}", e)),
        })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GuideError::Generation("Empty response from OpenAI".to_string()))?;

        debug!("OpenAI returned {} characters", text.len());
        Ok(text)
    }
}
