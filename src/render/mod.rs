//! Guide rendering: Markdown to styled HTML, HTML to PDF.

mod converter;
mod html;
mod naming;

pub use converter::{locate_converter, verify_pdf, PdfConverter, WkhtmltopdfConverter, PDF_MAGIC};
pub use html::{build_document, escape_html, file_url, format_date, markdown_to_html, AssetRefs};
pub use naming::{output_file_name, sanitize_component};

use crate::config::Settings;
use crate::error::{GuideError, Result};
use crate::guide::GuideDocument;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Per-item data the renderer needs besides the guide itself.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub identifier: String,
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
}

/// A finished PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Renders guides into PDFs in one output directory.
pub struct DocumentRenderer {
    converter: Arc<dyn PdfConverter>,
    org_name: String,
    default_title: String,
    assets: AssetRefs,
    output_dir: PathBuf,
    max_attempts: u32,
}

impl DocumentRenderer {
    /// Build a renderer from settings. Assets are located once here.
    pub fn new(settings: &Settings, converter: Arc<dyn PdfConverter>) -> Self {
        Self {
            converter,
            org_name: settings.general.org_name.clone(),
            default_title: settings.render.default_title.clone(),
            assets: AssetRefs::resolve(&settings.render, &settings.assets_dir()),
            output_dir: settings.output_dir(),
            max_attempts: settings.render.max_attempts.max(1),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build the full HTML page for a guide.
    pub fn render_html(&self, guide: &GuideDocument, ctx: &RenderContext) -> String {
        let body = markdown_to_html(guide.markdown());
        let title = ctx.title.as_deref().unwrap_or(&self.default_title);
        build_document(&body, title, ctx.date, &self.assets)
    }

    /// Convert an HTML page into the item's PDF.
    ///
    /// The converter writes into a temporary file next to the target, which
    /// is only moved into place once it checks out as a PDF.
    #[instrument(skip(self, html, ctx), fields(id = %ctx.identifier))]
    pub async fn write_pdf(&self, html: &str, ctx: &RenderContext) -> Result<RenderedOutput> {
        std::fs::create_dir_all(&self.output_dir)?;

        let file_name = output_file_name(
            &self.org_name,
            ctx.date,
            &ctx.identifier,
            Local::now().naive_local(),
        );
        let target = self.output_dir.join(&file_name);
        debug!("Rendering {} with {}", file_name, self.converter.name());

        let mut attempt = 1;
        loop {
            match self.convert_once(html, &target).await {
                Ok(size_bytes) => {
                    info!("Wrote {} ({} bytes)", target.display(), size_bytes);
                    return Ok(RenderedOutput {
                        path: target,
                        size_bytes,
                    });
                }
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        "Render attempt {}/{} failed: {}",
                        attempt, self.max_attempts, e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn convert_once(&self, html: &str, target: &Path) -> Result<u64> {
        let staging = tempfile::Builder::new()
            .prefix(".sermon-guide-")
            .suffix(".pdf")
            .tempfile_in(&self.output_dir)?
            .into_temp_path();

        self.converter.convert(html, &staging).await?;
        let size = verify_pdf(&staging)?;

        staging
            .persist(target)
            .map_err(|e| GuideError::Render(format!("could not move PDF into place: {}", e.error)))?;
        Ok(size)
    }
}
