//! Transcript sources.
//!
//! YouTube captions are fetched through a [`CaptionBackend`] (yt-dlp by
//! default); local files use the 4-line-block transcript format.

mod captions;
mod local;
mod youtube;

pub use captions::{parse_json3, parse_ttml, CaptionFormat};
pub use local::{date_from_filename, parse_blocks, read_local_transcript};
pub use youtube::YtDlpBackend;

use crate::error::{GuideError, Result};
use crate::input::ResolvedInput;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Remote,
    Local,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Remote => write!(f, "remote"),
            SourceKind::Local => write!(f, "local"),
        }
    }
}

/// A fetched transcript, ready for guide generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Type of source.
    pub kind: SourceKind,
    /// Video ID or file stem.
    pub identifier: String,
    /// Spoken text, in order.
    pub utterances: Vec<String>,
    /// Video title or file stem (if known).
    pub title: Option<String>,
    /// Publish date or date encoded in the file name (if known).
    pub date: Option<NaiveDate>,
}

impl TranscriptRecord {
    /// The whole transcript as a single text blob.
    pub fn text(&self) -> String {
        self.utterances.join("\n")
    }

    /// Total number of characters across all utterances.
    pub fn char_count(&self) -> usize {
        self.utterances.iter().map(|u| u.chars().count()).sum()
    }
}

/// Video metadata from the captions service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub published: Option<NaiveDate>,
}

/// Trait for remote caption providers.
#[async_trait]
pub trait CaptionBackend: Send + Sync {
    /// Fetch caption lines for a video, in playback order.
    async fn fetch_captions(&self, video_id: &str) -> Result<Vec<String>>;

    /// Fetch the video's title and publish date.
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata>;
}

/// Builds [`TranscriptRecord`]s from resolved inputs.
pub struct TranscriptFetcher {
    backend: Arc<dyn CaptionBackend>,
}

impl TranscriptFetcher {
    pub fn new(backend: Arc<dyn CaptionBackend>) -> Self {
        Self { backend }
    }

    /// Fetch the transcript for one input.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn fetch(&self, input: &ResolvedInput) -> Result<TranscriptRecord> {
        match input {
            ResolvedInput::Remote { video_id } => self.fetch_remote(video_id).await,
            ResolvedInput::Local { path } => read_local_transcript(path).await,
        }
    }

    async fn fetch_remote(&self, video_id: &str) -> Result<TranscriptRecord> {
        let utterances = self.backend.fetch_captions(video_id).await?;
        if utterances.is_empty() {
            return Err(GuideError::TranscriptUnavailable(format!(
                "captions for {} contain no text",
                video_id
            )));
        }

        // Missing metadata only degrades output naming.
        let metadata = match self.backend.fetch_metadata(video_id).await {
            Ok(m) => m,
            Err(e) => {
                warn!("Metadata lookup for {} failed, continuing without it: {}", video_id, e);
                VideoMetadata::default()
            }
        };

        let record = TranscriptRecord {
            kind: SourceKind::Remote,
            identifier: video_id.to_string(),
            utterances,
            title: metadata.title,
            date: metadata.published,
        };
        info!(
            "Transcript retrieved for {} ({} characters)",
            video_id,
            record.char_count()
        );
        Ok(record)
    }
}
