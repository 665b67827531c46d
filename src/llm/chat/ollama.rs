use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;
use super::{ ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, LlmType };
use log::debug;

pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>, max_tokens: u32) -> Self {
        let model = completion_model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into());

        Self {
            http: HttpClient::new(),
            base_url: url,
            completion_model: model,
            max_tokens,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != LlmType::Ollama {
            return Err("Invalid config type for OllamaClient".into());
        }

        Ok(Self::new(config.base_url.clone(), config.model.clone(), config.max_tokens))
    }

    pub async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str
    ) -> Result<GenerateResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let req = GenerateRequest {
            model: self.completion_model.clone(),
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
            stream: false,
            options: GenerateOptions { num_predict: self.max_tokens },
        };
        debug!("POST {} (model {})", url, self.completion_model);
        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<GenerateResponse>().await?;
        Ok(data)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let resp = self.generate(system, prompt).await?;
        Ok(CompletionResponse { response: resp.response })
    }

    fn model(&self) -> String {
        self.completion_model.clone()
    }
}
