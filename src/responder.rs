//! Bot response generation: find the case that governs a situation and
//! answer from it, or apologise when nothing matches.

use log::{ info, warn };
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use thiserror::Error;

use crate::cases::CaseIndex;
use crate::config::prompt::{ self, PromptConfig };
use crate::history::format_history_for_prompt;
use crate::llm::chat::ChatClient;
use crate::models::{ ChatMessage, Conversation, MessageType };

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApologyRequest {
    pub case_description: String,
    pub wrongdoing: String,
}

#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("case retrieval failed: {0}")]
    Retrieval(Box<dyn std::error::Error + Send + Sync>),
    #[error("completion failed: {0}")]
    Llm(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Clone)]
pub struct ApologyResponder {
    index: Arc<dyn CaseIndex>,
    chat_client: Arc<dyn ChatClient>,
    prompt_config: Arc<PromptConfig>,
}

impl ApologyResponder {
    pub fn new(
        index: Arc<dyn CaseIndex>,
        chat_client: Arc<dyn ChatClient>,
        prompt_config: Arc<PromptConfig>
    ) -> Self {
        Self {
            index,
            chat_client,
            prompt_config,
        }
    }

    /// The user's side of the exchange, as it is recorded in history.
    pub fn user_turn(request: &ApologyRequest) -> ChatMessage {
        ChatMessage::user(
            format!(
                "Case description: {}\nWhat I did wrong: {}",
                request.case_description,
                request.wrongdoing
            )
        )
    }

    pub fn notice(text: impl Into<String>) -> ChatMessage {
        ChatMessage::system_notice(text)
    }

    /// `history` holds the turns that preceded this request; it is rendered
    /// ahead of the request in the user prompt.
    pub async fn respond(
        &self,
        request: &ApologyRequest,
        history: &Conversation
    ) -> Result<ChatMessage, ResponderError> {
        let best = self.index
            .search(&request.case_description, 1).await
            .map_err(ResponderError::Retrieval)?
            .into_iter()
            .next();

        let Some(hit) = best else {
            warn!("No indexed case matched '{}'", request.case_description);
            return Ok(
                ChatMessage::bot(self.prompt_config.no_match_message.clone(), Some(MessageType::Apology))
            );
        };

        info!("Answering from '{}' (score {:.3})", hit.case.case_name, hit.score);
        let system_prompt = prompt::get_system_prompt(&self.prompt_config, &hit.case.raw_text);
        let request_prompt = prompt::get_user_prompt(
            &self.prompt_config,
            &request.case_description,
            &request.wrongdoing
        );
        let history_text = format_history_for_prompt(history);
        let user_prompt = if history_text.is_empty() {
            request_prompt
        } else {
            format!("{}\n{}", history_text, request_prompt)
        };

        let completion = self.chat_client
            .complete(Some(&system_prompt), &user_prompt).await
            .map_err(ResponderError::Llm)?;

        Ok(ChatMessage::bot(completion.response.trim(), Some(MessageType::RuleAnswer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::{ CaseIngestor, MemoryCaseIndex };
    use crate::llm::chat::CompletionResponse;
    use crate::models::Role;
    use async_trait::async_trait;
    use std::error::Error as StdError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        prompts: Mutex<Vec<(Option<String>, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatClient for RecordingClient {
        async fn complete(
            &self,
            system: Option<&str>,
            prompt: &str
        ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
            if self.fail {
                return Err("backend unavailable".into());
            }
            self.prompts.lock().unwrap().push((system.map(str::to_string), prompt.to_string()));
            Ok(CompletionResponse { response: "  I am sorry I was late.  ".to_string() })
        }

        fn model(&self) -> String {
            "recording".to_string()
        }
    }

    fn request() -> ApologyRequest {
        ApologyRequest {
            case_description: "She waited an hour because I was late".to_string(),
            wrongdoing: "I was late to dinner".to_string(),
        }
    }

    #[tokio::test]
    async fn apologises_when_nothing_is_indexed() {
        let client = Arc::new(RecordingClient::default());
        let responder = ApologyResponder::new(
            Arc::new(MemoryCaseIndex::new()),
            client.clone(),
            Arc::new(PromptConfig::default())
        );
        let reply = responder.respond(&request(), &Conversation::new("t")).await.unwrap();
        assert_eq!(reply.role(), Role::Bot);
        assert_eq!(reply.message_type(), Some(MessageType::Apology));
        assert_eq!(reply.content(), PromptConfig::default().no_match_message);
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn answers_from_the_matching_case() {
        let index: Arc<dyn CaseIndex> = Arc::new(MemoryCaseIndex::new());
        CaseIngestor::new(index.clone())
            .ingest_text("CASE 1: Late For Dinner\nForbidden Words\n- traffic\nTone Guidelines\n- own it")
            .await
            .unwrap();

        let client = Arc::new(RecordingClient::default());
        let responder = ApologyResponder::new(index, client.clone(), Arc::new(PromptConfig::default()));
        let reply = responder.respond(&request(), &Conversation::new("t")).await.unwrap();

        assert_eq!(reply.message_type(), Some(MessageType::RuleAnswer));
        assert_eq!(reply.content(), "I am sorry I was late.");

        let prompts = client.prompts.lock().unwrap();
        let (system, user) = &prompts[0];
        assert!(system.as_deref().unwrap().contains("CASE 1: Late For Dinner"));
        assert!(system.as_deref().unwrap().contains("Forbidden Words:\ntraffic"));
        assert!(user.starts_with("Case description:"));
        assert!(user.contains("What I did wrong: I was late to dinner"));
    }

    #[tokio::test]
    async fn earlier_turns_are_rendered_into_the_prompt() {
        let index: Arc<dyn CaseIndex> = Arc::new(MemoryCaseIndex::new());
        CaseIngestor::new(index.clone()).ingest_text("CASE 1: Late\n").await.unwrap();
        let client = Arc::new(RecordingClient::default());
        let responder = ApologyResponder::new(index, client.clone(), Arc::new(PromptConfig::default()));

        let mut history = Conversation::new("t");
        history.push(ApologyResponder::notice("Rules uploaded and indexed successfully."));
        history.push(ChatMessage::user("I was late last week too"));
        responder.respond(&request(), &history).await.unwrap();

        let prompts = client.prompts.lock().unwrap();
        let (_, user) = &prompts[0];
        assert!(user.starts_with(
            "Previous conversation:\nSystem [system]: Rules uploaded and indexed successfully.\nUser: I was late last week too\n"
        ));
        assert!(user.ends_with("that follows the above rules."));
    }

    #[tokio::test]
    async fn completion_failure_is_reported() {
        let index: Arc<dyn CaseIndex> = Arc::new(MemoryCaseIndex::new());
        CaseIngestor::new(index.clone()).ingest_text("CASE 1: Late\n").await.unwrap();
        let client = Arc::new(RecordingClient { fail: true, ..Default::default() });
        let responder = ApologyResponder::new(index, client, Arc::new(PromptConfig::default()));
        let result = responder.respond(&request(), &Conversation::new("t")).await;
        assert!(matches!(result, Err(ResponderError::Llm(_))));
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let req: ApologyRequest = serde_json::from_str(
            r#"{"caseDescription":"forgot birthday","wrongdoing":"no gift"}"#
        ).unwrap();
        assert_eq!(req.case_description, "forgot birthday");
        let turn = ApologyResponder::user_turn(&req);
        assert_eq!(turn.message_type(), None);
        assert_eq!(ApologyResponder::notice("Rules reloaded.").message_type(), Some(MessageType::System));
    }
}
