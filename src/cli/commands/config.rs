//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command. `explicit_path` is the `--config` argument, if any.
pub fn run_config(action: &ConfigAction, settings: &Settings, explicit_path: Option<&str>) -> Result<()> {
    let config_path = explicit_path
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => init_config(&config_path, *force)?,
    }

    Ok(())
}

fn init_config(path: &PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        Output::warning(&format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        ));
        return Ok(());
    }

    Settings::default().save_to(path)?;
    Output::success(&format!("Wrote default configuration to {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_config(&path, false).unwrap();
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.general.org_name, Settings::default().general.org_name);
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\norg_name = \"Grace\"\n").unwrap();

        init_config(&path, false).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Grace"));

        init_config(&path, true).unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("Grace"));
    }
}
