//! Error types for sermon-guide.

use thiserror::Error;

/// Library-level error type for guide generation.
#[derive(Error, Debug)]
pub enum GuideError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not a YouTube URL/ID or an existing file: {0}")]
    InvalidInputKind(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Transcript format error at line {line}: {reason}")]
    TranscriptFormat { line: usize, reason: String },

    #[error("Guide generation failed: {0}")]
    Generation(String),

    #[error("Generation service unavailable: {0}")]
    Unavailable(String),

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GuideError {
    /// Whether this error should abort the whole run rather than a single batch item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GuideError::Config(_) | GuideError::TomlParse(_))
    }

    /// Whether retrying the same request may succeed: timeouts, quota and server errors.
    pub fn is_transient(&self) -> bool {
        matches!(self, GuideError::Unavailable(_))
    }

    /// Short machine-friendly name of the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GuideError::Config(_) | GuideError::TomlParse(_) => "configuration",
            GuideError::InvalidInputKind(_) => "invalid_input_kind",
            GuideError::TranscriptUnavailable(_) => "transcript_unavailable",
            GuideError::TranscriptFormat { .. } => "transcript_format",
            GuideError::Generation(_) => "generation",
            GuideError::Unavailable(_) => "unavailable",
            GuideError::Render(_) => "render",
            GuideError::Io(_) => "io",
            GuideError::Http(_) => "http",
        }
    }
}

/// Result type alias for guide operations.
pub type Result<T> = std::result::Result<T, GuideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_errors_are_fatal() {
        assert!(GuideError::Config("missing key".into()).is_fatal());
        assert!(!GuideError::Render("exit status 1".into()).is_fatal());
        assert!(!GuideError::InvalidInputKind("nope".into()).is_fatal());
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(GuideError::Unavailable("HTTP 503".into()).is_transient());
        assert!(!GuideError::Generation("prompt blocked".into()).is_transient());
        assert!(!GuideError::Config("API key rejected".into()).is_transient());
    }

    #[test]
    fn test_format_error_display_includes_line() {
        let err = GuideError::TranscriptFormat {
            line: 9,
            reason: "block has 2 lines".into(),
        };
        assert_eq!(
            err.to_string(),
            "Transcript format error at line 9: block has 2 lines"
        );
        assert_eq!(err.kind(), "transcript_format");
    }
}
