//! End-to-end batch tests with stubbed captions, AI and converter.

use async_trait::async_trait;
use sermon_guide::cache::GuideCache;
use sermon_guide::config::Settings;
use sermon_guide::error::{GuideError, Result};
use sermon_guide::guide::TextGenerator;
use sermon_guide::pipeline::{BatchEvent, ItemState, Pipeline, Stage};
use sermon_guide::render::{PdfConverter, PDF_MAGIC};
use sermon_guide::transcript_source::{CaptionBackend, VideoMetadata};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const GUIDE: &str = "# No Condemnation\n\n## Scripture\nRomans 8:1-11\n\n## Observation\n1. What does Paul mean by \"no condemnation\"?\n\n## Application\nMemorize Romans 8:1 this week.\n\n## Prayer\n- Thank God for freedom in Christ";

const TRANSCRIPT: &str = "00:00:01.000 --> 00:00:04.000\nPastor\nGood morning, church.\n\n00:00:04.000 --> 00:00:09.000\nPastor\nTurn with me to Romans chapter eight.\n\n\n";

struct StubCaptions;

#[async_trait]
impl CaptionBackend for StubCaptions {
    async fn fetch_captions(&self, video_id: &str) -> Result<Vec<String>> {
        if video_id == "privatevid0" {
            return Err(GuideError::TranscriptUnavailable("video is private".into()));
        }
        Ok(vec![
            "There is therefore now".to_string(),
            "no condemnation".to_string(),
        ])
    }

    async fn fetch_metadata(&self, _video_id: &str) -> Result<VideoMetadata> {
        Err(GuideError::TranscriptUnavailable("metadata lookup failed".into()))
    }
}

#[derive(Default)]
struct StubGenerator {
    prompts: Mutex<Vec<String>>,
    fail_with_config: bool,
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn name(&self) -> String {
        "stub".to_string()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail_with_config {
            return Err(GuideError::Config("API key rejected".into()));
        }
        Ok(GUIDE.to_string())
    }
}

#[derive(Default)]
struct StubConverter {
    calls: AtomicUsize,
    last_html: Mutex<Option<String>>,
}

#[async_trait]
impl PdfConverter for StubConverter {
    fn name(&self) -> String {
        "stub".to_string()
    }

    async fn convert(&self, html: &str, output: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().unwrap() = Some(html.to_string());
        std::fs::write(output, b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n")?;
        Ok(())
    }
}

struct Fixture {
    dir: TempDir,
    settings: Settings,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.output_dir = path_string(&dir.path().join("out"));
        settings.render.assets_dir = path_string(&dir.path().join("assets"));
        settings.cache.dir = path_string(&dir.path().join("cache"));
        settings.generation.max_attempts = 1;
        settings.generation.retry_delay_ms = 0;
        Self { dir, settings }
    }

    fn write(&self, name: &str, content: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path_string(&path)
    }

    fn pipeline(
        &self,
        generator: Arc<StubGenerator>,
        converter: Arc<StubConverter>,
    ) -> Pipeline {
        Pipeline::with_components(&self.settings, Arc::new(StubCaptions), generator, converter)
            .unwrap()
    }

    fn pdfs(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.dir.path().join("out"))
            .map(|entries| entries.flatten().map(|e| e.path()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

#[tokio::test]
async fn test_unreachable_second_input_does_not_stop_batch() {
    let fixture = Fixture::new();
    let local = fixture.write("sermon_12.29.24.txt", TRANSCRIPT);
    let missing = path_string(&fixture.dir.path().join("does-not-exist.txt"));

    let generator = Arc::new(StubGenerator::default());
    let converter = Arc::new(StubConverter::default());
    let pipeline = fixture.pipeline(generator.clone(), converter.clone());

    let inputs = vec![local, missing, "https://youtu.be/dQw4w9WgXcQ".to_string()];
    let report = pipeline.run_batch(&inputs).await;

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.aborted);
    assert_eq!(report.outcomes[1].state(), ItemState::Failed(Stage::Resolve));

    let pdfs = fixture.pdfs();
    assert_eq!(pdfs.len(), 2);
    for pdf in &pdfs {
        let bytes = std::fs::read(pdf).unwrap();
        assert!(!bytes.is_empty());
        assert!(bytes.starts_with(PDF_MAGIC));
    }
    assert_eq!(converter.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_output_names_encode_date_or_identifier() {
    let fixture = Fixture::new();
    let local = fixture.write("sermon_12.29.24.txt", TRANSCRIPT);

    let pipeline = fixture.pipeline(
        Arc::new(StubGenerator::default()),
        Arc::new(StubConverter::default()),
    );

    let dated = pipeline.process_item(&local).await.unwrap();
    assert_eq!(
        file_name(&dated.path),
        "Kings Church - Small Group Discussion Guide - Week of December 29, 2024.pdf"
    );

    // Metadata lookup fails for remote inputs, so there is no date.
    let undated = pipeline.process_item("dQw4w9WgXcQ").await.unwrap();
    let name = file_name(&undated.path);
    assert!(name.starts_with("Kings Church - Small Group Discussion Guide - dQw4w9WgXcQ - "));
    assert!(name.ends_with(".pdf"));
    let stamp = name
        .trim_start_matches("Kings Church - Small Group Discussion Guide - dQw4w9WgXcQ - ")
        .trim_end_matches(".pdf");
    assert_eq!(stamp.len(), "YYYYMMDD-HHMMSS".len());
    assert!(stamp.chars().all(|c| c.is_ascii_digit() || c == '-'));
}

#[tokio::test]
async fn test_prompt_and_html_carry_transcript_and_guide() {
    let fixture = Fixture::new();
    let local = fixture.write("sermon_12.29.24.txt", TRANSCRIPT);

    let generator = Arc::new(StubGenerator::default());
    let converter = Arc::new(StubConverter::default());
    let pipeline = fixture
        .pipeline(generator.clone(), converter.clone())
        .with_hint(Some("Keep questions short".to_string()));

    pipeline.process_item(&local).await.unwrap();

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Good morning, church.\nTurn with me to Romans chapter eight."));
    assert!(!prompts[0].contains("Pastor\n"));
    assert!(prompts[0].contains("Keep questions short"));

    let html = converter.last_html.lock().unwrap().clone().unwrap();
    assert!(html.contains("<title>sermon_12.29.24</title>"));
    assert!(html.contains("December 29, 2024"));
    assert!(html.contains("<h2>Scripture</h2>"));
}

#[tokio::test]
async fn test_malformed_block_fails_only_that_item() {
    let fixture = Fixture::new();
    let broken = fixture.write("broken.txt", "00:00:01.000 --> 00:00:04.000\nPastor\n");
    let good = fixture.write("good.txt", TRANSCRIPT);

    let pipeline = fixture.pipeline(
        Arc::new(StubGenerator::default()),
        Arc::new(StubConverter::default()),
    );
    let report = pipeline.run_batch(&[broken, good]).await;

    assert_eq!(report.succeeded(), 1);
    let failure = report.outcomes[0].result.as_ref().unwrap_err();
    assert_eq!(failure.stage, Stage::FetchTranscript);
    assert!(matches!(
        failure.error,
        GuideError::TranscriptFormat { line: 1, .. }
    ));
}

#[tokio::test]
async fn test_unavailable_captions_fail_fetch_stage() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(
        Arc::new(StubGenerator::default()),
        Arc::new(StubConverter::default()),
    );

    let failure = pipeline.process_item("privatevid0").await.unwrap_err();
    assert_eq!(failure.stage, Stage::FetchTranscript);
    assert!(matches!(failure.error, GuideError::TranscriptUnavailable(_)));
}

#[tokio::test]
async fn test_configuration_error_stops_batch() {
    let fixture = Fixture::new();
    let first = fixture.write("one.txt", TRANSCRIPT);
    let second = fixture.write("two.txt", TRANSCRIPT);

    let generator = Arc::new(StubGenerator {
        fail_with_config: true,
        ..StubGenerator::default()
    });
    let pipeline = fixture.pipeline(generator.clone(), Arc::new(StubConverter::default()));

    let report = pipeline.run_batch(&[first, second]).await;

    assert!(report.aborted);
    assert_eq!(report.outcomes.len(), 1);
    assert!(matches!(report.fatal_error(), Some(GuideError::Config(_))));
    assert_eq!(generator.prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_markdown_cache_skips_generation() {
    let fixture = Fixture::new();
    let local = fixture.write("sermon_01.05.25.txt", TRANSCRIPT);

    let cache_dir = fixture.dir.path().join("cache");
    std::fs::create_dir_all(&cache_dir).unwrap();
    std::fs::write(cache_dir.join("sermon_01.05.25.md"), "## Prayer\n- Cached").unwrap();

    let generator = Arc::new(StubGenerator::default());
    let converter = Arc::new(StubConverter::default());
    let pipeline = fixture
        .pipeline(generator.clone(), converter.clone())
        .with_cache(GuideCache::new(cache_dir.clone(), true, true));

    pipeline.process_item(&local).await.unwrap();

    assert!(generator.prompts.lock().unwrap().is_empty());
    let html = converter.last_html.lock().unwrap().clone().unwrap();
    assert!(html.contains("Cached"));
    assert!(cache_dir.join("sermon_01.05.25.html").exists());
}

#[tokio::test]
async fn test_progress_events() {
    let fixture = Fixture::new();
    let local = fixture.write("sermon.txt", TRANSCRIPT);
    let pipeline = fixture.pipeline(
        Arc::new(StubGenerator::default()),
        Arc::new(StubConverter::default()),
    );

    let mut events = Vec::new();
    pipeline
        .run_batch_with(&[local, "not a thing".to_string()], |event| match event {
            BatchEvent::Started { index, total, .. } => events.push(format!("start {}/{}", index, total)),
            BatchEvent::Finished(outcome) => events.push(format!("done {}", outcome.result.is_ok())),
        })
        .await;

    assert_eq!(
        events,
        vec!["start 0/2", "done true", "start 1/2", "done false"]
    );
}
