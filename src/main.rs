//! sermon-guide CLI entry point.

use clap::Parser;
use sermon_guide::cli::{commands, Cli, Commands, Output, EXIT_CONFIG, EXIT_ITEM_FAILED};
use sermon_guide::config::Settings;
use sermon_guide::error::GuideError;
use sermon_guide::logging;
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; keys may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            Output::error(&format!("{:#}", e));
            let fatal = e
                .downcast_ref::<GuideError>()
                .is_some_and(GuideError::is_fatal);
            ExitCode::from(if fatal { EXIT_CONFIG } else { EXIT_ITEM_FAILED })
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = cli.config.as_deref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    match &cli.command {
        Some(Commands::Doctor) => commands::run_doctor(&settings),

        Some(Commands::Config { action }) => {
            commands::run_config(action, &settings, cli.config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }

        None => commands::run_generate(&cli.generate, settings).await,
    }
}
