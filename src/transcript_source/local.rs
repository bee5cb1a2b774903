//! Local transcript files.
//!
//! The file is a sequence of 4-line blocks:
//!
//! ```text
//! 00:00:01.000 --> 00:00:04.500
//! Pastor
//! Good morning, church.
//!
//! ```
//!
//! Only the third line of each block is kept. A malformed block aborts the
//! whole file with [`GuideError::TranscriptFormat`].

use super::{SourceKind, TranscriptRecord};
use crate::error::{GuideError, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

const BLOCK_LINES: usize = 4;

/// Extract the dialogue line of every block, in order.
pub fn parse_blocks(content: &str) -> Result<Vec<String>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines: Vec<&str> = content.lines().collect();

    // Trailing blank lines are padding, not a block.
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map(|i| i + 1)
        .unwrap_or(0);
    let lines = &lines[..end];

    if lines.is_empty() {
        return Err(GuideError::TranscriptFormat {
            line: 1,
            reason: "file contains no transcript blocks".to_string(),
        });
    }

    let mut texts = Vec::with_capacity(lines.len() / BLOCK_LINES + 1);

    for (index, block) in lines.chunks(BLOCK_LINES).enumerate() {
        let first_line = index * BLOCK_LINES + 1;

        if block.len() < 3 {
            return Err(GuideError::TranscriptFormat {
                line: first_line,
                reason: format!("block has {} line(s), expected 4", block.len()),
            });
        }

        if let Some(pos) = block[..3].iter().position(|l| l.trim().is_empty()) {
            return Err(GuideError::TranscriptFormat {
                line: first_line + pos,
                reason: "unexpected blank line inside block".to_string(),
            });
        }

        if block.len() == BLOCK_LINES && !block[3].trim().is_empty() {
            return Err(GuideError::TranscriptFormat {
                line: first_line + 3,
                reason: "expected blank separator line".to_string(),
            });
        }

        texts.push(block[2].trim().to_string());
    }

    Ok(texts)
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{2})\.(\d{2})\.(\d{2})").expect("date regex is valid"))
}

/// Extract an `MM.DD.YY` date from the file name, if present and valid.
///
/// The whole name is searched: in `Sunday 01.05.25` the `.25` would
/// otherwise be taken for an extension.
pub fn date_from_filename(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let caps = date_regex().captures(name)?;

    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Read and parse a local transcript file.
pub async fn read_local_transcript(path: &Path) -> Result<TranscriptRecord> {
    info!("Reading transcript from local file: {}", path.display());

    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        GuideError::TranscriptUnavailable(format!("cannot read {}: {}", path.display(), e))
    })?;

    let utterances = parse_blocks(&content)?;
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string());

    let record = TranscriptRecord {
        kind: SourceKind::Local,
        identifier: title.clone().unwrap_or_else(|| "transcript".to_string()),
        utterances,
        title,
        date: date_from_filename(path),
    };

    info!("Transcript loaded from file ({} characters)", record.char_count());
    Ok(record)
}
