//! CLI module for sermon-guide.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::GenerationProvider;
use clap::{Args, Parser, Subcommand};

/// Exit status when at least one item failed.
pub const EXIT_ITEM_FAILED: u8 = 1;
/// Exit status for configuration errors (missing key, converter, bad config).
pub const EXIT_CONFIG: u8 = 2;

/// sermon-guide - Small group discussion guides from sermons
///
/// Turns a YouTube sermon or a local transcript file into a printable
/// SOAP discussion guide (Scripture, Observation, Application, Prayer).
#[derive(Parser, Debug)]
#[command(name = "sermon-guide")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(flatten)]
    pub generate: GenerateArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments for the default guide-generation run.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// YouTube URLs, video IDs or transcript files (prompts when omitted)
    pub inputs: Vec<String>,

    /// Directory for generated PDFs
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// AI provider to use (gemini, openai)
    #[arg(long)]
    pub provider: Option<GenerationProvider>,

    /// Extra guidance for the AI (e.g. "focus on the Prayer section")
    #[arg(long)]
    pub hint: Option<String>,

    /// Reuse and store generated Markdown in the cache directory
    #[arg(long)]
    pub markdown_cache: bool,

    /// Reuse and store rendered HTML in the cache directory
    #[arg(long)]
    pub html_cache: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check tools, API keys and assets
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
