mod memory;

pub use memory::MemoryHistoryStore;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use serde_json::Value;
use std::error::Error;
use crate::contract::{ validate_chat_message_with, ValidationPolicy };
use crate::models::{ ChatMessage, Conversation, Role };

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub message: ChatMessage,
    pub recorded_at: DateTime<Utc>,
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn add_message(
        &self,
        conversation_id: &str,
        message: &ChatMessage
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// The last `limit` turns, earliest first.
    async fn get_conversation(
        &self,
        conversation_id: &str,
        limit: usize
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>>;

    fn policy(&self) -> ValidationPolicy {
        ValidationPolicy::Lenient
    }

    /// Validates an incoming payload first; a rejected turn is never stored.
    async fn add_raw(
        &self,
        conversation_id: &str,
        payload: &Value
    ) -> Result<ChatMessage, Box<dyn Error + Send + Sync>> {
        let message = validate_chat_message_with(payload, self.policy())?;
        self.add_message(conversation_id, &message).await?;
        Ok(message)
    }
}

pub fn format_history_for_prompt(conversation: &Conversation) -> String {
    if conversation.messages.is_empty() {
        return String::new();
    }
    let mut result = String::from("Previous conversation:\n");
    for msg in &conversation.messages {
        let role_display = match msg.role() {
            Role::User => "User",
            Role::Bot => "Bot",
            Role::System => "System",
        };

        match msg.message_type() {
            Some(kind) => result.push_str(&format!("{} [{}]: {}\n", role_display, kind, msg.content())),
            None => result.push_str(&format!("{}: {}\n", role_display, msg.content())),
        }
    }

    result
}
