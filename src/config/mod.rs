//! Configuration module for sermon-guide.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{GuidePrompts, Prompts};
pub use settings::{
    CacheSettings, Credentials, FontFace, FontSettings, GeneralSettings, GenerationProvider,
    GenerationSettings, PromptSettings, RenderSettings, Settings, YoutubeSettings,
    CONVERTER_PATH_ENV, GEMINI_API_KEY_ENV, OPENAI_API_KEY_ENV,
};
