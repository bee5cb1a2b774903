//! Generate command: turn inputs into discussion guide PDFs.

use crate::cli::preflight;
use crate::cli::{GenerateArgs, Output, EXIT_CONFIG, EXIT_ITEM_FAILED};
use crate::config::Settings;
use crate::error::GuideError;
use crate::pipeline::{BatchEvent, BatchReport, Pipeline};
use anyhow::Result;
use console::style;
use indicatif::ProgressBar;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

/// Apply command-line overrides on top of the loaded settings.
pub fn apply_overrides(args: &GenerateArgs, settings: &mut Settings) {
    if let Some(dir) = &args.output_dir {
        settings.general.output_dir = dir.clone();
    }
    if let Some(provider) = args.provider {
        settings.generation.provider = provider;
    }
    if args.markdown_cache {
        settings.cache.enable_markdown_cache = true;
    }
    if args.html_cache {
        settings.cache.enable_html_cache = true;
    }
}

/// Run the generate command.
pub async fn run_generate(args: &GenerateArgs, settings: Settings) -> Result<ExitCode> {
    Ok(ExitCode::from(generate(args, settings).await?))
}

/// Process exit status for a finished batch.
pub fn exit_code(report: &BatchReport) -> u8 {
    if report.aborted {
        EXIT_CONFIG
    } else if report.is_success() {
        0
    } else {
        EXIT_ITEM_FAILED
    }
}

async fn generate(args: &GenerateArgs, mut settings: Settings) -> Result<u8> {
    apply_overrides(args, &mut settings);

    // Key and converter are checked before asking for input.
    let ready = match preflight::check_environment(&settings) {
        Ok(ready) => ready,
        Err(e) => return Ok(preflight_failed(&e)),
    };

    let inputs = if args.inputs.is_empty() {
        match prompt_for_input()? {
            Some(input) => vec![input],
            None => {
                Output::info("No input given, nothing to do.");
                return Ok(0);
            }
        }
    } else {
        args.inputs.clone()
    };

    if let Err(e) = preflight::check_inputs(&settings, &inputs) {
        return Ok(preflight_failed(&e));
    }

    let pipeline = Pipeline::new(&settings, &ready.credentials, ready.converter)?
        .with_hint(args.hint.clone());

    let mut spinner: Option<ProgressBar> = None;
    let report = pipeline
        .run_batch_with(&inputs, |event| match event {
            BatchEvent::Started {
                index,
                total,
                input,
            } => {
                spinner = Some(Output::spinner(&format!(
                    "[{}/{}] {}",
                    index + 1,
                    total,
                    input
                )));
            }
            BatchEvent::Finished(outcome) => {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                match &outcome.result {
                    Ok(output) => Output::guide_written(&output.path, output.size_bytes),
                    Err(failure) => Output::error(&format!("{}: {}", outcome.input, failure)),
                }
            }
        })
        .await;

    Output::header("Summary");
    Output::kv("Succeeded", &report.succeeded().to_string());
    Output::kv("Failed", &report.failed().to_string());
    Output::kv("Output directory", &settings.output_dir().display().to_string());

    if let Some(e) = report.fatal_error() {
        Output::error(&format!("Stopped early: {}", e));
    } else if report.is_success() {
        Output::success(&format!(
            "{} guide(s) ready.",
            style(report.succeeded()).bold()
        ));
    }

    Ok(exit_code(&report))
}

fn preflight_failed(e: &GuideError) -> u8 {
    Output::error(&e.to_string());
    Output::info("Run 'sermon-guide doctor' for detailed diagnostics.");
    EXIT_CONFIG
}

/// Ask once on stdin for a single input. An empty answer means "nothing to do".
fn prompt_for_input() -> io::Result<Option<String>> {
    print!(
        "{} Enter a YouTube URL, video ID or transcript file: ",
        style("?").cyan()
    );
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_string()))
}
