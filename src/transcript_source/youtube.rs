//! YouTube captions via yt-dlp.

use super::captions::CaptionFormat;
use super::{CaptionBackend, VideoMetadata};
use crate::config::YoutubeSettings;
use crate::error::{GuideError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// A caption track selected from yt-dlp's info JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CaptionTrack {
    pub url: String,
    pub format: CaptionFormat,
    pub automatic: bool,
}

/// Caption backend that shells out to yt-dlp and downloads the caption file.
pub struct YtDlpBackend {
    program: String,
    language: String,
    timeout: Duration,
    http: reqwest::Client,
    /// Info JSON per video ID, shared by the captions and metadata lookups.
    info_cache: Mutex<HashMap<String, Arc<Value>>>,
}

impl YtDlpBackend {
    pub fn new(settings: &YoutubeSettings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            program: settings.ytdlp_path.clone(),
            language: settings.caption_language.clone(),
            timeout,
            http,
            info_cache: Mutex::new(HashMap::new()),
        })
    }

    /// The video's info JSON, running yt-dlp at most once per video.
    async fn info(&self, video_id: &str) -> Result<Arc<Value>> {
        if let Some(info) = self.cached_info(video_id) {
            debug!("Reusing yt-dlp info for {}", video_id);
            return Ok(info);
        }

        let info = Arc::new(self.dump_info(video_id).await?);
        self.info_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(video_id.to_string(), Arc::clone(&info));
        Ok(info)
    }

    fn cached_info(&self, video_id: &str) -> Option<Arc<Value>> {
        self.info_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(video_id)
            .cloned()
    }

    /// Run yt-dlp and return the video's info JSON.
    async fn dump_info(&self, video_id: &str) -> Result<Value> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let mut cmd = Command::new(&self.program);
        cmd.args([
            "--dump-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            &url,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                return Err(GuideError::TranscriptUnavailable(format!(
                    "yt-dlp timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GuideError::Config(format!(
                    "{} not found. Please install it and ensure it's in your PATH.",
                    self.program
                )));
            }
            Ok(Err(e)) => {
                return Err(GuideError::TranscriptUnavailable(format!(
                    "failed to run yt-dlp: {}",
                    e
                )));
            }
            Ok(Ok(o)) => o,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GuideError::TranscriptUnavailable(format!(
                "video {} not found or unavailable: {}",
                video_id,
                stderr.trim()
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str).map_err(|e| {
            GuideError::TranscriptUnavailable(format!("failed to parse yt-dlp output: {}", e))
        })
    }
}

/// Pick the best caption track for `language`.
///
/// Uploaded subtitles are preferred over automatic captions; within a track
/// list the formats follow [`CaptionFormat::PREFERRED`].
pub(crate) fn select_track(info: &Value, language: &str) -> Option<CaptionTrack> {
    for (field, automatic) in [("subtitles", false), ("automatic_captions", true)] {
        let Some(tracks) = info[field].as_object() else {
            continue;
        };

        let regional = format!("{}-", language);
        let candidates = tracks.get(language).into_iter().chain(
            tracks
                .iter()
                .filter(|(key, _)| key.starts_with(&regional))
                .map(|(_, v)| v),
        );

        for list in candidates {
            let Some(entries) = list.as_array() else {
                continue;
            };
            for format in CaptionFormat::PREFERRED {
                let found = entries.iter().find_map(|entry| {
                    (entry["ext"].as_str() == Some(format.extension()))
                        .then(|| entry["url"].as_str())
                        .flatten()
                });
                if let Some(url) = found {
                    return Some(CaptionTrack {
                        url: url.to_string(),
                        format,
                        automatic,
                    });
                }
            }
        }
    }

    None
}

/// Extract title and upload date from yt-dlp's info JSON.
pub(crate) fn metadata_from_info(info: &Value) -> VideoMetadata {
    let title = info["title"]
        .as_str()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string());

    // yt-dlp returns date as YYYYMMDD
    let published = info["upload_date"]
        .as_str()
        .filter(|d| d.len() == 8)
        .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y%m%d").ok());

    VideoMetadata { title, published }
}

#[async_trait]
impl CaptionBackend for YtDlpBackend {
    #[instrument(skip(self))]
    async fn fetch_captions(&self, video_id: &str) -> Result<Vec<String>> {
        info!("Fetching YouTube captions");
        let info = self.info(video_id).await?;

        let track = select_track(&info, &self.language).ok_or_else(|| {
            GuideError::TranscriptUnavailable(format!(
                "no '{}' captions in a supported format for {}",
                self.language, video_id
            ))
        })?;
        debug!(
            "Using {} captions ({})",
            if track.automatic { "automatic" } else { "uploaded" },
            track.format.extension()
        );

        let response = self.http.get(&track.url).send().await.map_err(|e| {
            GuideError::TranscriptUnavailable(format!("caption download failed: {}", e))
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(GuideError::TranscriptUnavailable(format!(
                "caption download returned HTTP {}",
                status
            )));
        }
        let body = response.text().await.map_err(|e| {
            GuideError::TranscriptUnavailable(format!("caption download failed: {}", e))
        })?;

        track.format.parse(&body)
    }

    #[instrument(skip(self))]
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        let info = self.info(video_id).await?;
        Ok(metadata_from_info(&info))
    }
}
