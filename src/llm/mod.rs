pub mod chat;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    Ollama,
    Anthropic,
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("Invalid LLM type: '{0}'")]
pub struct ParseLlmTypeError(pub String);

impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmType::Ollama),
            "anthropic" => Ok(LlmType::Anthropic),
            _ => Err(ParseLlmTypeError(s.to_string())),
        }
    }
}

pub const DEFAULT_MAX_TOKENS: u32 = 400;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::Ollama,
            api_key: None,
            model: None,
            base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}
