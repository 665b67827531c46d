use async_trait::async_trait;
use log::debug;
use std::error::Error as StdError;
use super::{ ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, LlmType };
use rllm::{
    builder::{ LLMBackend, LLMBuilder },
    chat::{ ChatMessage as LlmMessage, ChatRole, MessageType },
};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

pub struct AnthropicChatClient {
    api_key: String,
    model: String,
    base_url: Option<String>,
    max_tokens: u32,
}

impl AnthropicChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        max_tokens: u32
    ) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
            max_tokens,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != LlmType::Anthropic {
            return Err("Invalid config type for AnthropicChatClient".into());
        }
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| "Anthropic API key is required for AnthropicChatClient".to_string())?;

        Ok(Self::new(api_key, config.model.clone(), config.base_url.clone(), config.max_tokens))
    }
}

#[async_trait]
impl ChatClient for AnthropicChatClient {
    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::Anthropic)
            .api_key(self.api_key.clone())
            .model(&self.model)
            .max_tokens(self.max_tokens);

        if let Some(system) = system {
            builder = builder.system(system);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url.clone());
        }

        let provider = builder.build()?;
        let messages = vec![LlmMessage {
            role: ChatRole::User,
            content: prompt.to_string(),
            message_type: MessageType::Text,
        }];

        debug!("Sending completion to Anthropic model {}", self.model);
        let resp = provider.chat(&messages).await?;
        let response = resp
            .text()
            .map(|s| s.to_string())
            .unwrap_or_else(|| resp.to_string());

        Ok(CompletionResponse { response })
    }

    fn model(&self) -> String {
        self.model.clone()
    }
}
