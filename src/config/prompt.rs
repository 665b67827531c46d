use serde::Deserialize;
use std::fs;
use std::path::Path;
use log::info;
use thiserror::Error;

const DEFAULT_SYSTEM_TEMPLATE: &str = "\
You are an apology writing assistant.

You are given a case rules document that contains:
- A case name
- Forbidden words and phrases
- Tone guidelines
- Example apology structure

You MUST:
- Follow the tone guidelines.
- Use the example structure as a template.
- Avoid using any forbidden words or phrases exactly as written.
- Be emotionally safe, accountable, and sincere.

CASE RULES DOCUMENT:
\"\"\"{rules}\"\"\"";

const DEFAULT_USER_TEMPLATE: &str = "\
Case description: {case_description}
What I did wrong: {wrongdoing}

Write a sincere, emotionally intelligent apology letter (4-8 sentences)
that follows the above rules.";

const DEFAULT_NO_MATCH_MESSAGE: &str =
    "I couldn't find any matching rules for that situation. Try describing the case differently.";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Prompt template '{template}' is missing placeholder {placeholder}")]
    MissingPlaceholder {
        template: &'static str,
        placeholder: &'static str,
    },
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    pub system_template: String,
    pub user_template: String,
    pub no_match_message: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_template: DEFAULT_SYSTEM_TEMPLATE.to_string(),
            user_template: DEFAULT_USER_TEMPLATE.to_string(),
            no_match_message: DEFAULT_NO_MATCH_MESSAGE.to_string(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        let required = [
            ("system_template", &self.system_template, "{rules}"),
            ("user_template", &self.user_template, "{case_description}"),
            ("user_template", &self.user_template, "{wrongdoing}"),
        ];
        for (template, text, placeholder) in required {
            if !text.contains(placeholder) {
                return Err(PromptError::MissingPlaceholder { template, placeholder });
            }
        }
        Ok(())
    }
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<PromptConfig, PromptError> {
    let path = path.as_ref();
    let file_content = fs::read_to_string(path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded prompt templates from {}", path.display());
    Ok(config)
}

pub fn get_system_prompt(config: &PromptConfig, rules: &str) -> String {
    config.system_template.replace("{rules}", rules)
}

pub fn get_user_prompt(config: &PromptConfig, case_description: &str, wrongdoing: &str) -> String {
    config.user_template
        .replace("{case_description}", case_description)
        .replace("{wrongdoing}", wrongdoing)
}
