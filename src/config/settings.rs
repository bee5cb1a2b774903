//! Configuration settings for sermon-guide.

use crate::error::{GuideError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the HTML-to-PDF converter path.
pub const CONVERTER_PATH_ENV: &str = "WKHTMLTOPDF_PATH";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub generation: GenerationSettings,
    pub youtube: YoutubeSettings,
    pub render: RenderSettings,
    pub cache: CacheSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Organization name used in output file names.
    pub org_name: String,
    /// Directory where PDFs are written.
    pub output_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            org_name: "Kings Church".to_string(),
            output_dir: ".".to_string(),
        }
    }
}

/// Text generation provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// Google Gemini (default).
    #[default]
    Gemini,
    /// OpenAI chat completions.
    OpenAi,
}

impl GenerationProvider {
    /// Name of the environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            GenerationProvider::Gemini => GEMINI_API_KEY_ENV,
            GenerationProvider::OpenAi => OPENAI_API_KEY_ENV,
        }
    }
}

impl std::str::FromStr for GenerationProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(GenerationProvider::Gemini),
            "openai" | "gpt" => Ok(GenerationProvider::OpenAi),
            _ => Err(format!("Unknown generation provider: {}", s)),
        }
    }
}

impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationProvider::Gemini => write!(f, "gemini"),
            GenerationProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Guide generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Which provider generates the guide.
    pub provider: GenerationProvider,
    /// Gemini model name.
    pub gemini_model: String,
    /// Gemini REST API base URL.
    pub gemini_base_url: String,
    /// OpenAI model name.
    pub openai_model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempts per guide (1 disables retries).
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::Gemini,
            gemini_model: "gemini-3-flash-preview".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            openai_model: "gpt-4.1".to_string(),
            temperature: 0.4,
            timeout_secs: 300,
            max_attempts: 2,
            retry_delay_ms: 2000,
        }
    }
}

/// YouTube caption retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Path or name of the yt-dlp executable.
    pub ytdlp_path: String,
    /// Caption language code.
    pub caption_language: String,
    /// Timeout for each yt-dlp invocation and caption download, in seconds.
    pub timeout_secs: u64,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            caption_language: "en".to_string(),
            timeout_secs: 120,
        }
    }
}

/// A font file and the CSS family name it is registered under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub file: String,
}

impl FontFace {
    fn new(family: &str, file: &str) -> Self {
        Self {
            family: family.to_string(),
            file: file.to_string(),
        }
    }
}

/// Fonts by typographic role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// Body text.
    pub body: FontFace,
    /// Top-level headings.
    pub title: FontFace,
    /// Section headings.
    pub section: FontFace,
    /// Sub-headings and bold text.
    pub accent: FontFace,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            body: FontFace::new("Montserrat ExtraLight", "Mont-ExtraLightDEMO.otf"),
            title: FontFace::new("Montserrat Heavy", "Mont-HeavyDEMO.otf"),
            section: FontFace::new("Gotham Pro Black", "GothaProBla.otf"),
            accent: FontFace::new("Gotham Pro Medium", "GothaProMed.otf"),
        }
    }
}

impl FontSettings {
    /// All font faces in declaration order.
    pub fn faces(&self) -> [&FontFace; 4] {
        [&self.title, &self.body, &self.section, &self.accent]
    }
}

/// PDF rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Explicit path to wkhtmltopdf. Falls back to `WKHTMLTOPDF_PATH`, then `PATH`.
    pub converter_path: Option<String>,
    /// Directory holding the logo and font files.
    pub assets_dir: String,
    /// Logo file name inside the assets directory.
    pub logo_file: String,
    /// Alt text for the logo.
    pub logo_alt: String,
    /// Document title used when the transcript has none.
    pub default_title: String,
    /// Font files inside the assets directory.
    pub fonts: FontSettings,
    /// Page size passed to the converter.
    pub page_size: String,
    /// Page margin passed to the converter (all four sides).
    pub margin: String,
    /// Converter timeout in seconds.
    pub timeout_secs: u64,
    /// Total converter attempts per document (1 disables retries).
    pub max_attempts: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            converter_path: None,
            assets_dir: "assets".to_string(),
            logo_file: "Kings Primary Black.png".to_string(),
            logo_alt: "Kings Church Logo".to_string(),
            default_title: "Small Group Discussion Guide".to_string(),
            fonts: FontSettings::default(),
            page_size: "Letter".to_string(),
            margin: "1in".to_string(),
            timeout_secs: 120,
            max_attempts: 1,
        }
    }
}

/// Development-only sidecar caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Reuse generated Markdown instead of calling the AI again.
    #[serde(alias = "enableMarkdownCache")]
    pub enable_markdown_cache: bool,
    /// Reuse rendered HTML instead of rebuilding it.
    #[serde(alias = "enableHtmlCache")]
    pub enable_html_cache: bool,
    /// Directory holding cache files.
    pub dir: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enable_markdown_cache: false,
            enable_html_cache: false,
            dir: ".guide-cache".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// An explicitly given path must exist; the default location is optional.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => {
                return Err(GuideError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GuideError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sermon-guide")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Get the expanded assets directory path.
    pub fn assets_dir(&self) -> PathBuf {
        Self::expand_path(&self.render.assets_dir)
    }

    /// Get the expanded cache directory path.
    pub fn cache_dir(&self) -> PathBuf {
        Self::expand_path(&self.cache.dir)
    }

    /// Converter path from config, then the environment, else the bare binary name.
    pub fn converter_candidate(&self) -> String {
        self.render
            .converter_path
            .clone()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| {
                std::env::var(CONVERTER_PATH_ENV)
                    .ok()
                    .filter(|p| !p.trim().is_empty())
            })
            .map(|p| shellexpand::tilde(&p).to_string())
            .unwrap_or_else(|| "wkhtmltopdf".to_string())
    }
}

/// API credentials, read once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub provider: GenerationProvider,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read the key required by `provider` from the environment.
    pub fn from_env(provider: GenerationProvider) -> Result<Self> {
        let var = provider.api_key_env();
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self {
                provider,
                api_key: key.trim().to_string(),
            }),
            Ok(_) => Err(GuideError::Config(format!(
                "{} is empty. Set it in the environment or a .env file.",
                var
            ))),
            Err(_) => Err(GuideError::Config(format!(
                "{} not set. Set it in the environment or a .env file.",
                var
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.generation.provider, GenerationProvider::Gemini);
        assert!(!settings.cache.enable_markdown_cache);
        assert!(!settings.cache.enable_html_cache);
        assert_eq!(settings.general.org_name, "Kings Church");
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(
            "Gemini".parse::<GenerationProvider>().unwrap(),
            GenerationProvider::Gemini
        );
        assert_eq!(
            "openai".parse::<GenerationProvider>().unwrap(),
            GenerationProvider::OpenAi
        );
        assert!("claude".parse::<GenerationProvider>().is_err());
    }

    #[test]
    fn test_cache_flags_accept_camel_case() {
        let settings: Settings = toml::from_str(
            r#"
            [cache]
            enableMarkdownCache = true
            enableHtmlCache = true
            "#,
        )
        .unwrap();
        assert!(settings.cache.enable_markdown_cache);
        assert!(settings.cache.enable_html_cache);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [general]
            org_name = "Grace Fellowship"

            [generation]
            provider = "openai"
            "#,
        )
        .unwrap();
        assert_eq!(settings.general.org_name, "Grace Fellowship");
        assert_eq!(settings.general.output_dir, ".");
        assert_eq!(settings.generation.provider, GenerationProvider::OpenAi);
        assert_eq!(settings.render.fonts.body.file, "Mont-ExtraLightDEMO.otf");
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let path = PathBuf::from("/definitely/not/here/config.toml");
        let err = Settings::load_from(Some(&path)).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_converter_candidate_prefers_config() {
        let mut settings = Settings::default();
        settings.render.converter_path = Some("/opt/wk/bin/wkhtmltopdf".to_string());
        assert_eq!(settings.converter_candidate(), "/opt/wk/bin/wkhtmltopdf");
    }
}
