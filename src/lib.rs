//! sermon-guide - Small group discussion guides from sermons
//!
//! A CLI tool that turns a sermon (a YouTube video or a local transcript
//! file) into a printable small group discussion guide.
//!
//! # Overview
//!
//! For every input, sermon-guide:
//! - resolves it to a YouTube video ID or a local transcript file
//! - fetches the transcript (YouTube captions via yt-dlp, or 4-line blocks)
//! - asks an AI model (Gemini by default) for a SOAP guide in Markdown
//! - renders the guide to styled HTML and converts it to PDF with wkhtmltopdf
//!
//! # Architecture
//!
//! - `input` - Input classification
//! - `transcript_source` - YouTube captions and local transcript parsing
//! - `guide` - Prompting and text generation
//! - `render` - HTML templating, file naming and PDF conversion
//! - `pipeline` - Per-item state machine and batch driver
//! - `cache` - Development sidecar caches
//! - `config` - Settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use sermon_guide::cli::preflight;
//! use sermon_guide::config::Settings;
//! use sermon_guide::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let inputs = vec!["https://youtu.be/dQw4w9WgXcQ".to_string()];
//!     let ready = preflight::check(&settings, &inputs)?;
//!     let pipeline = Pipeline::new(&settings, &ready.credentials, ready.converter)?;
//!
//!     let report = pipeline.run_batch(&inputs).await;
//!     println!("{} guide(s) written", report.succeeded());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod guide;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod transcript_source;

pub use error::{GuideError, Result};
