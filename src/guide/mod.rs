//! Discussion guide generation.
//!
//! Builds the SOAP prompt from a transcript and sends it to a
//! [`TextGenerator`] (Gemini by default, OpenAI as an alternative).

mod gemini;
mod openai;

pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;

use crate::config::{Credentials, GenerationProvider, GenerationSettings, Prompts};
use crate::error::{GuideError, Result};
use crate::transcript_source::TranscriptRecord;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// The four sections every guide is expected to contain.
pub const SOAP_SECTIONS: [&str; 4] = ["Scripture", "Observation", "Application", "Prayer"];

/// Markdown returned by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideDocument {
    markdown: String,
}

impl GuideDocument {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
        }
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// SOAP sections that do not appear as a heading or bold label.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let labels: Vec<String> = self
            .markdown
            .lines()
            .map(str::trim_start)
            .filter(|l| l.starts_with('#') || l.starts_with("**"))
            .map(|l| l.to_lowercase())
            .collect();

        SOAP_SECTIONS
            .iter()
            .copied()
            .filter(|section| {
                let needle = section.to_lowercase();
                !labels.iter().any(|l| l.contains(&needle))
            })
            .collect()
    }
}

/// Trait for text generation services.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable name, used in logs.
    fn name(&self) -> String;

    /// Generate text for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Create the generator for the configured provider.
pub fn create_generator(
    settings: &GenerationSettings,
    credentials: &Credentials,
) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match credentials.provider {
        GenerationProvider::Gemini => Arc::new(GeminiGenerator::new(settings, &credentials.api_key)?),
        GenerationProvider::OpenAi => Arc::new(OpenAiGenerator::new(settings, &credentials.api_key)?),
    };
    Ok(generator)
}

/// Turns transcripts into discussion guides.
pub struct GuideGenerator {
    generator: Arc<dyn TextGenerator>,
    prompts: Prompts,
    max_attempts: u32,
    retry_delay: Duration,
}

impl GuideGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, prompts: Prompts) -> Self {
        Self {
            generator,
            prompts,
            max_attempts: 1,
            retry_delay: Duration::ZERO,
        }
    }

    /// Retry transient failures up to `max_attempts` in total.
    pub fn with_retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = delay;
        self
    }

    /// Build the prompt for a transcript.
    pub fn build_prompt(&self, transcript: &str, hint: Option<&str>) -> String {
        self.prompts.guide_prompt(transcript, hint)
    }

    /// Generate a guide for one transcript.
    #[instrument(skip(self, record), fields(id = %record.identifier))]
    pub async fn generate(
        &self,
        record: &TranscriptRecord,
        hint: Option<&str>,
    ) -> Result<GuideDocument> {
        let text = record.text();
        if text.trim().is_empty() {
            return Err(GuideError::Generation(
                "transcript is empty, nothing to generate from".to_string(),
            ));
        }

        let prompt = self.build_prompt(&text, hint);
        info!("Generating discussion guide with {}", self.generator.name());

        let mut attempt = 1;
        loop {
            let result = self.generator.generate(&prompt).await.and_then(|markdown| {
                if markdown.trim().is_empty() {
                    Err(GuideError::Generation("empty response from model".to_string()))
                } else {
                    Ok(markdown)
                }
            });

            match result {
                Ok(markdown) => {
                    let guide = GuideDocument::new(markdown.trim());
                    let missing = guide.missing_sections();
                    if !missing.is_empty() {
                        warn!("Generated guide has no heading for: {}", missing.join(", "));
                    }
                    return Ok(guide);
                }
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        "Generation attempt {}/{} failed: {}",
                        attempt, self.max_attempts, e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
