//! Prompt templates for sermon-guide.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub guide: GuidePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for discussion guide generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidePrompts {
    /// Main template. Receives `{{transcript}}` and `{{hint}}`.
    pub user: String,
    /// Wrapper for the optional structural hint. Receives `{{hint}}`.
    pub hint: String,
}

impl Default for GuidePrompts {
    fn default() -> Self {
        Self {
            user: r#"Based on the following sermon transcript, create a small group leader discussion guide suitable for a 20-40 minute discussion.

The guide should follow the SOAP structure (Scripture, Observation, Application, Prayer) and include the following elements:
1. Scripture:
    a. a brief summary of the sermon passage (focus more on summarizing the sermon's passage than the sermon itself) (2-3 sentences)
    b. Key themes and scripture references mentioned
2. Observation:
    a. 5-7 thoughtful discussion questions that:
        - Help participants reflect on the sermon's passage
        - Connect the sermon and its passage to personal application
        - Encourage deeper theological exploration
        - Foster group conversation
        - Aid in answering the following questions each week (but can phrase differently as needed for the particular sermon passage):
            1. What do we learn about God?
            2. What do we learn about humanity?
            3. What is God inviting us to believe or obey in this passage?
3. Application:
    a. A practical application challenge for the week
4. Prayer:
    a. Suggested closing prayer points

Lay out the guide in a clear, easy-to-read structure that a small group leader can follow. Please do not include any reference to the AI or the tool used to generate the guide. Also do not reference the prompt itself in the guide (e.g. "This guide is intended for a 20-40 minute discussion", etc.)

Please note that the sermon transcript may include some announcements at the beginning and an invitation to respond at the end; focus on the main sermon content.
{{hint}}
The output must be in Markdown format.

BEGIN SERMON TRANSCRIPT.

{{transcript}}

END SERMON TRANSCRIPT.
Please provide a well-structured discussion guide."#
                .to_string(),

            hint: r#"
Additional guidance from the group leader: {{hint}}
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let guide_path = custom_path.join("guide.toml");
            if guide_path.exists() {
                let content = std::fs::read_to_string(&guide_path)?;
                prompts.guide = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Build the full guide prompt for a transcript and optional hint.
    ///
    /// The transcript is substituted last so that `{{...}}` sequences spoken in
    /// a sermon are never treated as template variables.
    pub fn guide_prompt(&self, transcript: &str, hint: Option<&str>) -> String {
        let hint_block = match hint.map(str::trim).filter(|h| !h.is_empty()) {
            Some(h) => {
                let mut vars = HashMap::new();
                vars.insert("hint".to_string(), h.to_string());
                Self::render(&self.guide.hint, &vars)
            }
            None => String::new(),
        };

        let mut vars = HashMap::new();
        vars.insert("hint".to_string(), hint_block);
        let rendered = self.render_with_custom(&self.guide.user, &vars);
        rendered.replace("{{transcript}}", transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.guide.user.contains("{{transcript}}"));
        for section in ["Scripture", "Observation", "Application", "Prayer"] {
            assert!(prompts.guide.user.contains(section));
        }
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_guide_prompt_embeds_transcript() {
        let prompts = Prompts::default();
        let prompt = prompts.guide_prompt("In the beginning was the Word.", None);
        assert!(prompt.contains(
            "BEGIN SERMON TRANSCRIPT.\n\nIn the beginning was the Word.\n\nEND SERMON TRANSCRIPT."
        ));
        assert!(!prompt.contains("{{hint}}"));
        assert!(!prompt.contains("Additional guidance"));
    }

    #[test]
    fn test_guide_prompt_with_hint() {
        let prompts = Prompts::default();
        let prompt = prompts.guide_prompt("text", Some("Focus on Romans 8"));
        assert!(prompt.contains("Additional guidance from the group leader: Focus on Romans 8"));
    }

    #[test]
    fn test_transcript_braces_are_not_substituted() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("church".to_string(), "Kings".to_string());
        let prompt = prompts.guide_prompt("we sang {{church}} songs", None);
        assert!(prompt.contains("we sang {{church}} songs"));
    }
}
