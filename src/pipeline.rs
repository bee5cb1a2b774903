//! Batch pipeline for sermon-guide.
//!
//! Takes each input from resolution through transcript, guide and PDF.
//! Items run one after another and a failure only stops its own item,
//! except for configuration errors which stop the batch.

use crate::cache::GuideCache;
use crate::config::{Credentials, Prompts, Settings};
use crate::error::{GuideError, Result};
use crate::guide::{create_generator, GuideDocument, GuideGenerator, TextGenerator};
use crate::input::resolve;
use crate::render::{DocumentRenderer, PdfConverter, RenderContext, RenderedOutput, WkhtmltopdfConverter};
use crate::transcript_source::{CaptionBackend, TranscriptFetcher, TranscriptRecord, YtDlpBackend};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Processing stage of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    FetchTranscript,
    GenerateGuide,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolve => "resolve",
            Stage::FetchTranscript => "fetch transcript",
            Stage::GenerateGuide => "generate guide",
            Stage::Render => "render",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Resolved,
    TranscriptFetched,
    GuideGenerated,
    Rendered,
    Done,
    Failed(Stage),
}

/// Why an item did not produce a PDF.
#[derive(Debug)]
pub struct ItemFailure {
    pub stage: Stage,
    pub error: GuideError,
}

impl ItemFailure {
    fn at(stage: Stage) -> impl FnOnce(GuideError) -> Self {
        move |error| Self { stage, error }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

/// Result of one batch item.
#[derive(Debug)]
pub struct ItemOutcome {
    pub input: String,
    pub result: std::result::Result<RenderedOutput, ItemFailure>,
}

impl ItemOutcome {
    pub fn state(&self) -> ItemState {
        match &self.result {
            Ok(_) => ItemState::Done,
            Err(failure) => ItemState::Failed(failure.stage),
        }
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started {
        index: usize,
        total: usize,
        input: &'a str,
    },
    Finished(&'a ItemOutcome),
}

/// Outcome of a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
    /// Set when a configuration error stopped the batch early.
    pub aborted: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        !self.aborted && self.failed() == 0
    }

    /// The configuration error that stopped the batch, if any.
    pub fn fatal_error(&self) -> Option<&GuideError> {
        if !self.aborted {
            return None;
        }
        self.outcomes
            .iter()
            .rev()
            .find_map(|o| o.result.as_ref().err())
            .map(|f| &f.error)
    }
}

/// The guide pipeline.
pub struct Pipeline {
    fetcher: TranscriptFetcher,
    generator: GuideGenerator,
    renderer: DocumentRenderer,
    cache: GuideCache,
    hint: Option<String>,
}

impl Pipeline {
    /// Build the production pipeline: yt-dlp captions, the configured AI
    /// provider and wkhtmltopdf at `converter_program`.
    pub fn new(settings: &Settings, credentials: &Credentials, converter_program: PathBuf) -> Result<Self> {
        let backend = Arc::new(YtDlpBackend::new(&settings.youtube)?);
        let text_generator = create_generator(&settings.generation, credentials)?;
        let converter = Arc::new(WkhtmltopdfConverter::new(converter_program, &settings.render));

        info!(
            "Using {} for guides, {} for PDFs",
            text_generator.name(),
            converter.name()
        );
        Self::with_components(settings, backend, text_generator, converter)
    }

    /// Build a pipeline with custom components.
    pub fn with_components(
        settings: &Settings,
        captions: Arc<dyn CaptionBackend>,
        text_generator: Arc<dyn TextGenerator>,
        converter: Arc<dyn PdfConverter>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let generator = GuideGenerator::new(text_generator, prompts).with_retry(
            settings.generation.max_attempts,
            Duration::from_millis(settings.generation.retry_delay_ms),
        );

        Ok(Self {
            fetcher: TranscriptFetcher::new(captions),
            generator,
            renderer: DocumentRenderer::new(settings, converter),
            cache: GuideCache::from_settings(settings),
            hint: None,
        })
    }

    /// Extra guidance appended to every prompt.
    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint.filter(|h| !h.trim().is_empty());
        self
    }

    pub fn with_cache(mut self, cache: GuideCache) -> Self {
        self.cache = cache;
        self
    }

    /// Run a single input through every stage.
    #[instrument(skip(self))]
    pub async fn process_item(&self, input: &str) -> std::result::Result<RenderedOutput, ItemFailure> {
        let resolved = resolve(input).map_err(ItemFailure::at(Stage::Resolve))?;
        transition(input, ItemState::Resolved);

        let record = self
            .fetcher
            .fetch(&resolved)
            .await
            .map_err(ItemFailure::at(Stage::FetchTranscript))?;
        transition(input, ItemState::TranscriptFetched);

        let guide = self
            .guide_for(&record)
            .await
            .map_err(ItemFailure::at(Stage::GenerateGuide))?;
        transition(input, ItemState::GuideGenerated);

        let ctx = RenderContext {
            identifier: record.identifier.clone(),
            title: record.title.clone(),
            date: record.date,
        };
        let html = match self.cache.load_html(&ctx.identifier) {
            Some(html) => {
                info!("Using cached HTML for {}", ctx.identifier);
                html
            }
            None => {
                let html = self.renderer.render_html(&guide, &ctx);
                self.cache.store_html(&ctx.identifier, &html);
                html
            }
        };

        let output = self
            .renderer
            .write_pdf(&html, &ctx)
            .await
            .map_err(ItemFailure::at(Stage::Render))?;
        transition(input, ItemState::Rendered);
        transition(input, ItemState::Done);

        Ok(output)
    }

    async fn guide_for(&self, record: &TranscriptRecord) -> Result<GuideDocument> {
        if let Some(markdown) = self.cache.load_markdown(&record.identifier) {
            info!("Using cached guide for {}", record.identifier);
            return Ok(GuideDocument::new(markdown));
        }

        let guide = self.generator.generate(record, self.hint.as_deref()).await?;
        self.cache.store_markdown(&record.identifier, guide.markdown());
        Ok(guide)
    }

    /// Process every input in order.
    pub async fn run_batch(&self, inputs: &[String]) -> BatchReport {
        self.run_batch_with(inputs, |_| {}).await
    }

    /// Process every input in order, reporting progress to `observer`.
    pub async fn run_batch_with<F>(&self, inputs: &[String], mut observer: F) -> BatchReport
    where
        F: FnMut(BatchEvent<'_>),
    {
        let mut report = BatchReport::default();
        let total = inputs.len();

        for (index, input) in inputs.iter().enumerate() {
            observer(BatchEvent::Started {
                index,
                total,
                input,
            });

            let result = self.process_item(input).await;
            let fatal = match &result {
                Ok(_) => false,
                Err(failure) => {
                    transition(input, ItemState::Failed(failure.stage));
                    error!(
                        input = %input,
                        kind = failure.error.kind(),
                        "{}",
                        failure
                    );
                    failure.error.is_fatal()
                }
            };

            report.outcomes.push(ItemOutcome {
                input: input.clone(),
                result,
            });
            if let Some(outcome) = report.outcomes.last() {
                observer(BatchEvent::Finished(outcome));
            }

            if fatal {
                warn!(
                    "Stopping batch: {} input(s) left unprocessed",
                    total - index - 1
                );
                report.aborted = true;
                break;
            }
        }

        info!(
            "Batch complete: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }
}

fn transition(input: &str, state: ItemState) {
    debug!(input = %input, state = ?state, "item state");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(ok: bool) -> ItemOutcome {
        ItemOutcome {
            input: "x".to_string(),
            result: if ok {
                Ok(RenderedOutput {
                    path: PathBuf::from("x.pdf"),
                    size_bytes: 10,
                })
            } else {
                Err(ItemFailure {
                    stage: Stage::FetchTranscript,
                    error: GuideError::TranscriptUnavailable("gone".into()),
                })
            },
        }
    }

    #[test]
    fn test_report_counts() {
        let report = BatchReport {
            outcomes: vec![outcome(true), outcome(false), outcome(true)],
            aborted: false,
        };
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert!(report.fatal_error().is_none());
    }

    #[test]
    fn test_empty_report_is_success() {
        assert!(BatchReport::default().is_success());
    }

    #[test]
    fn test_outcome_state() {
        assert_eq!(outcome(true).state(), ItemState::Done);
        assert_eq!(
            outcome(false).state(),
            ItemState::Failed(Stage::FetchTranscript)
        );
    }

    #[test]
    fn test_failure_display() {
        let failure = ItemFailure {
            stage: Stage::Render,
            error: GuideError::Render("exit status 1".into()),
        };
        assert_eq!(
            failure.to_string(),
            "render failed: PDF rendering failed: exit status 1"
        );
    }
}
