//! Doctor command - verify tools, API keys and assets.

use crate::cli::Output;
use crate::config::{GenerationProvider, Settings};
use console::style;
use std::process::{Command, ExitCode};

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<ExitCode> {
    Output::header("sermon-guide doctor");
    println!();

    let mut checks = Vec::new();

    let tools = vec![
        check_tool(
            "wkhtmltopdf",
            &settings.converter_candidate(),
            install_hint_wkhtmltopdf(),
        ),
        // yt-dlp is only needed for YouTube inputs.
        downgrade(check_tool(
            "yt-dlp",
            &settings.youtube.ytdlp_path,
            install_hint_ytdlp(),
        )),
    ];
    print_section("External Tools", &tools);
    checks.extend(tools);

    let keys = vec![
        check_api_key(GenerationProvider::Gemini, settings.generation.provider),
        check_api_key(GenerationProvider::OpenAi, settings.generation.provider),
    ];
    print_section("API Configuration", &keys);
    checks.extend(keys);

    let assets = check_assets(settings);
    print_section("Assets", &assets);
    checks.extend(assets);

    let config = vec![check_config_file()];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before generating guides.",
            errors
        ));
        Ok(ExitCode::FAILURE)
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
        Ok(ExitCode::SUCCESS)
    } else {
        Output::success("All checks passed! Ready to generate guides.");
        Ok(ExitCode::SUCCESS)
    }
}

/// Turn an error into a warning.
fn downgrade(check: CheckResult) -> CheckResult {
    match check.status {
        CheckStatus::Error => CheckResult {
            status: CheckStatus::Warning,
            ..check
        },
        _ => check,
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str, program: &str, hint: &str) -> CheckResult {
    match Command::new(program).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, &format!("not found ({})", program), hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Mask all but the edges of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check the API key of `provider`. Only the active provider's key is required.
fn check_api_key(provider: GenerationProvider, active: GenerationProvider) -> CheckResult {
    let var = provider.api_key_env();
    let hint = format!("Set with: export {}='...' (or add it to .env)", var);

    let result = match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => {
            return CheckResult::ok(var, &format!("configured ({})", mask_key(key.trim())));
        }
        Ok(_) => CheckResult::error(var, "empty", &hint),
        Err(_) => CheckResult::error(var, "not set", &hint),
    };

    if provider == active {
        result
    } else {
        CheckResult::warning(
            var,
            &format!("{} (only needed with --provider {})", result.message, provider),
            &hint,
        )
    }
}

/// Check the logo and font files.
fn check_assets(settings: &Settings) -> Vec<CheckResult> {
    let dir = settings.assets_dir();
    let hint = format!("Place the file in {} (it is left out of the PDF otherwise)", dir.display());

    let mut files = vec![("Logo", settings.render.logo_file.as_str())];
    files.extend(
        settings
            .render
            .fonts
            .faces()
            .into_iter()
            .map(|face| (face.family.as_str(), face.file.as_str())),
    );

    files
        .into_iter()
        .map(|(label, file)| {
            let path = dir.join(file);
            if path.is_file() {
                CheckResult::ok(label, &path.display().to_string())
            } else {
                CheckResult::warning(label, &format!("{} missing", path.display()), &hint)
            }
        })
        .collect()
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: sermon-guide config init",
        )
    }
}

/// Platform-specific install hint for wkhtmltopdf.
fn install_hint_wkhtmltopdf() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install wkhtmltopdf (or set WKHTMLTOPDF_PATH)"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install wkhtmltopdf (or set WKHTMLTOPDF_PATH)"
    } else {
        "Install from: https://wkhtmltopdf.org/downloads.html (or set WKHTMLTOPDF_PATH)"
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_downgrade() {
        let result = downgrade(CheckResult::error("yt-dlp", "not found", "install"));
        assert_eq!(result.status, CheckStatus::Warning);
        assert_eq!(downgrade(CheckResult::ok("x", "y")).status, CheckStatus::Ok);
    }

    #[test]
    fn test_missing_tool() {
        let result = check_tool("wkhtmltopdf", "definitely-not-a-real-binary-xyz", "hint");
        assert_eq!(result.status, CheckStatus::Error);
        assert!(result.message.starts_with("not found"));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("AIzaSyA1234567890abcd"), "AIza...abcd");
        assert_eq!(mask_key("short"), "****");
    }

    #[test]
    fn test_assets_missing_are_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.render.assets_dir = dir.path().to_string_lossy().to_string();
        std::fs::write(dir.path().join(&settings.render.logo_file), b"png").unwrap();

        let checks = check_assets(&settings);
        assert_eq!(checks.len(), 5);
        assert_eq!(checks[0].status, CheckStatus::Ok);
        assert!(checks[1..].iter().all(|c| c.status == CheckStatus::Warning));
    }
}
