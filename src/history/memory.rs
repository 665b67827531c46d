use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use tokio::sync::RwLock;
use crate::contract::ValidationPolicy;
use crate::history::{ HistoryEntry, HistoryStore };
use crate::models::{ ChatMessage, Conversation };

#[derive(Default)]
pub struct MemoryHistoryStore {
    conversations: RwLock<HashMap<String, Vec<HistoryEntry>>>,
    policy: ValidationPolicy,
}

impl MemoryHistoryStore {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            policy,
        }
    }

    pub async fn entries(&self, conversation_id: &str) -> Vec<HistoryEntry> {
        self.conversations.read().await.get(conversation_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn add_message(
        &self,
        conversation_id: &str,
        message: &ChatMessage
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let entry = HistoryEntry {
            message: message.clone(),
            recorded_at: Utc::now(),
        };
        self.conversations
            .write().await
            .entry(conversation_id.to_string())
            .or_default()
            .push(entry);
        debug!("Appended {} turn to conversation {}", message.role(), conversation_id);
        Ok(())
    }

    async fn get_conversation(
        &self,
        conversation_id: &str,
        limit: usize
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>> {
        let conversations = self.conversations.read().await;
        let messages = conversations
            .get(conversation_id)
            .map(|entries| {
                let skip = entries.len().saturating_sub(limit);
                entries[skip..].iter().map(|e| e.message.clone()).collect()
            })
            .unwrap_or_default();

        Ok(Conversation {
            id: conversation_id.to_string(),
            messages,
        })
    }

    fn policy(&self) -> ValidationPolicy {
        self.policy
    }
}
