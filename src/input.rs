//! Input classification.
//!
//! Each command-line argument is either a YouTube video (URL or bare ID) or a
//! path to a local transcript file.

use crate::error::{GuideError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A classified batch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    /// A YouTube video, by its 11-character ID.
    Remote { video_id: String },
    /// A local transcript file.
    Local { path: PathBuf },
}

impl std::fmt::Display for ResolvedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedInput::Remote { video_id } => write!(f, "youtube:{}", video_id),
            ResolvedInput::Local { path } => write!(f, "file:{}", path.display()),
        }
    }
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/watch\?(?:[^\s#]*&)?v=|youtu\.be/|youtube\.com/(?:embed|shorts|live|v)/)([a-zA-Z0-9_-]{11})(?:[?&#/]|$)",
        )
        .expect("video URL regex is valid")
    })
}

fn bare_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("video ID regex is valid"))
}

fn youtube_host_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com|youtu\.be)(?:/|$)")
            .expect("host regex is valid")
    })
}

/// Whether the input looks like a YouTube link or ID, without touching the filesystem.
pub fn looks_remote(input: &str) -> bool {
    let input = input.trim();
    youtube_host_regex().is_match(input) || bare_id_regex().is_match(input)
}

/// Classify a single input.
///
/// URLs win over paths, and an existing path wins over a bare-ID lookalike.
pub fn resolve(input: &str) -> Result<ResolvedInput> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(GuideError::InvalidInputKind("empty input".to_string()));
    }

    if let Some(caps) = url_regex().captures(trimmed) {
        if let Some(id) = caps.get(1) {
            return Ok(ResolvedInput::Remote {
                video_id: id.as_str().to_string(),
            });
        }
    }

    if youtube_host_regex().is_match(trimmed) {
        return Err(GuideError::InvalidInputKind(format!(
            "no video ID found in YouTube URL: {}",
            trimmed
        )));
    }

    let path = Path::new(trimmed);
    if path.is_file() {
        return Ok(ResolvedInput::Local {
            path: path.to_path_buf(),
        });
    }

    if bare_id_regex().is_match(trimmed) {
        return Ok(ResolvedInput::Remote {
            video_id: trimmed.to_string(),
        });
    }

    Err(GuideError::InvalidInputKind(trimmed.to_string()))
}
