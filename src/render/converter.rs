//! HTML to PDF conversion through wkhtmltopdf.

use crate::config::RenderSettings;
use crate::error::{GuideError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Magic bytes every PDF file starts with.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Trait for HTML to PDF converters.
#[async_trait]
pub trait PdfConverter: Send + Sync {
    /// Human-readable name, used in logs.
    fn name(&self) -> String;

    /// Convert a complete HTML document into a PDF written at `output`.
    async fn convert(&self, html: &str, output: &Path) -> Result<()>;
}

/// Check that the file at `path` is a PDF and return its size in bytes.
pub fn verify_pdf(path: &Path) -> Result<u64> {
    let bytes = std::fs::read(path)
        .map_err(|e| GuideError::Render(format!("converter produced no output: {}", e)))?;

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(GuideError::Render(format!(
            "converter output is not a PDF ({} bytes)",
            bytes.len()
        )));
    }
    Ok(bytes.len() as u64)
}

/// Locate a working converter binary.
///
/// Runs `<candidate> --version` once; a missing binary is a configuration
/// error because no item can be rendered without it.
pub fn locate_converter(candidate: &str) -> Result<PathBuf> {
    match std::process::Command::new(candidate).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            debug!("Found converter: {}", version.trim());
            Ok(PathBuf::from(candidate))
        }
        Ok(_) => Err(GuideError::Config(format!(
            "{} is installed but not working correctly",
            candidate
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(GuideError::Config(format!(
            "wkhtmltopdf not found at '{}'. Install it or set WKHTMLTOPDF_PATH.",
            candidate
        ))),
        Err(e) => Err(GuideError::Config(format!("{}: {}", candidate, e))),
    }
}

/// Converter that runs the wkhtmltopdf binary.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfConverter {
    program: PathBuf,
    page_size: String,
    margin: String,
    timeout: Duration,
}

impl WkhtmltopdfConverter {
    pub fn new(program: impl Into<PathBuf>, settings: &RenderSettings) -> Self {
        Self {
            program: program.into(),
            page_size: settings.page_size.clone(),
            margin: settings.margin.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[async_trait]
impl PdfConverter for WkhtmltopdfConverter {
    fn name(&self) -> String {
        format!("wkhtmltopdf ({})", self.program.display())
    }

    #[instrument(skip(self, html))]
    async fn convert(&self, html: &str, output: &Path) -> Result<()> {
        let mut input = tempfile::Builder::new()
            .prefix("sermon-guide-")
            .suffix(".html")
            .tempfile()?;
        input.write_all(html.as_bytes())?;
        input.flush()?;

        let mut cmd = Command::new(&self.program);
        cmd.arg("--quiet")
            .arg("--page-size").arg(&self.page_size)
            .arg("--margin-top").arg(&self.margin)
            .arg("--margin-right").arg(&self.margin)
            .arg("--margin-bottom").arg(&self.margin)
            .arg("--margin-left").arg(&self.margin)
            .arg("--encoding").arg("UTF-8")
            .arg("--enable-local-file-access")
            .arg(input.path())
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result,
            Err(_) => {
                return Err(GuideError::Render(format!(
                    "wkhtmltopdf timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        match result {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(GuideError::Render(format!(
                    "wkhtmltopdf exited with {}: {}",
                    out.status,
                    err.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(GuideError::Render(format!(
                "converter not found: {}",
                self.program.display()
            ))),
            Err(e) => Err(GuideError::Render(format!("wkhtmltopdf error: {}", e))),
        }
    }
}
