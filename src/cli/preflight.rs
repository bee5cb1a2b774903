//! Pre-flight checks before a batch starts.
//!
//! Validates that the API key, the PDF converter and (for YouTube inputs)
//! yt-dlp are available, so configuration problems stop the run before any
//! item is processed.

use crate::config::{Credentials, Settings};
use crate::error::{GuideError, Result};
use crate::input::looks_remote;
use crate::render::locate_converter;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Everything a batch needs that was verified up front.
#[derive(Debug)]
pub struct Ready {
    pub credentials: Credentials,
    pub converter: PathBuf,
}

/// Run pre-flight checks for a batch of inputs.
pub fn check(settings: &Settings, inputs: &[String]) -> Result<Ready> {
    let ready = check_environment(settings)?;
    check_inputs(settings, inputs)?;
    Ok(ready)
}

/// Checks that do not depend on the inputs: the API key and the PDF converter.
pub fn check_environment(settings: &Settings) -> Result<Ready> {
    let credentials = Credentials::from_env(settings.generation.provider)?;
    let converter = locate_converter(&settings.converter_candidate())?;

    Ok(Ready {
        credentials,
        converter,
    })
}

/// Checks the inputs need: yt-dlp when any of them is a YouTube video.
pub fn check_inputs(settings: &Settings, inputs: &[String]) -> Result<()> {
    if needs_captions_tool(inputs) {
        check_tool(&settings.youtube.ytdlp_path)?;
    }
    Ok(())
}

/// Whether any input will be fetched from YouTube.
pub fn needs_captions_tool(inputs: &[String]) -> bool {
    inputs
        .iter()
        .any(|i| looks_remote(i) && !Path::new(i.trim()).is_file())
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(GuideError::Config(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(GuideError::Config(format!(
            "{} not found. Please install it and ensure it's in your PATH.",
            name
        ))),
        Err(e) => Err(GuideError::Config(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_captions_tool() {
        assert!(needs_captions_tool(&["dQw4w9WgXcQ".to_string()]));
        assert!(needs_captions_tool(&[
            "notes.txt".to_string(),
            "https://youtu.be/dQw4w9WgXcQ".to_string(),
        ]));
        assert!(!needs_captions_tool(&["sermon_12.29.24.txt".to_string()]));
        assert!(!needs_captions_tool(&[]));
    }

    #[test]
    fn test_missing_converter_fails_environment_check() {
        let mut settings = Settings::default();
        settings.render.converter_path = Some("/nonexistent/bin/wkhtmltopdf".to_string());

        let err = check_environment(&settings).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_local_inputs_skip_ytdlp_check() {
        let mut settings = Settings::default();
        settings.youtube.ytdlp_path = "definitely-not-a-real-binary-xyz".to_string();

        assert!(check_inputs(&settings, &["sermon_12.29.24.txt".to_string()]).is_ok());
        let err = check_inputs(&settings, &["dQw4w9WgXcQ".to_string()]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_tool_is_config_error() {
        let err = check_tool("definitely-not-a-real-binary-xyz").unwrap_err();
        assert!(err.is_fatal());
    }
}
