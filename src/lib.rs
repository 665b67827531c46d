pub mod cases;
pub mod cli;
pub mod config;
pub mod contract;
pub mod history;
pub mod llm;
pub mod models;
pub mod responder;

use cases::{ CaseIndex, CaseIngestor, MemoryCaseIndex };
use cli::{ Args, Command, PayloadKind };
use config::prompt::{ load_prompts, PromptConfig };
use contract::{ parse_chat_message, parse_upload_response, ValidationPolicy };
use history::{ HistoryStore, MemoryHistoryStore };
use llm::chat::new_client as new_chat_client;
use llm::LlmConfig;
use log::info;
use models::ChatMessage;
use responder::{ ApologyRequest, ApologyResponder };
use std::error::Error;
use std::io::Read;
use std::sync::Arc;
use uuid::Uuid;

const HISTORY_FOR_PROMPT_LEN: usize = 6;

pub fn llm_config_from_args(args: &Args) -> Result<LlmConfig, Box<dyn Error + Send + Sync>> {
    Ok(LlmConfig {
        llm_type: args.chat_llm_type.parse()?,
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
        max_tokens: args.chat_max_tokens,
    })
}

fn policy_from_args(args: &Args) -> ValidationPolicy {
    if args.strict_roles {
        ValidationPolicy::Strict
    } else {
        ValidationPolicy::Lenient
    }
}

fn read_payload(file: Option<&str>) -> Result<String, Box<dyn Error + Send + Sync>> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read payload file '{}': {}", path, e).into()),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Records the user turn, answers with the recent history as context, and
/// records the reply. Both turns pass the store's validation before they are
/// appended.
pub async fn answer_in_conversation(
    history: &dyn HistoryStore,
    responder: &ApologyResponder,
    conversation_id: &str,
    request: &ApologyRequest
) -> Result<ChatMessage, Box<dyn Error + Send + Sync>> {
    let earlier = history.get_conversation(conversation_id, HISTORY_FOR_PROMPT_LEN).await?;

    let user_turn = serde_json::to_value(ApologyResponder::user_turn(request))?;
    history.add_raw(conversation_id, &user_turn).await?;

    let reply = responder.respond(request, &earlier).await?;
    history.add_raw(conversation_id, &serde_json::to_value(&reply)?).await
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let policy = policy_from_args(&args);

    info!("--- Core Configuration ---");
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Validation Policy: {:?}", policy);
    info!("-------------------------");

    match &args.command {
        Command::Validate { kind, file } => {
            let raw = read_payload(file.as_deref())?;
            let normalized = match kind {
                PayloadKind::Chat => serde_json::to_string_pretty(&parse_chat_message(&raw, policy)?)?,
                PayloadKind::Upload => serde_json::to_string_pretty(&parse_upload_response(&raw)?)?,
            };
            println!("{}", normalized);
        }
        Command::Upload { file } => {
            let ingestor = CaseIngestor::new(Arc::new(MemoryCaseIndex::new()));
            let response = ingestor.ingest_file(file).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Apologize { rules, case_description, wrongdoing } => {
            let prompt_config = match &args.prompts_path {
                Some(path) => load_prompts(path)?,
                None => PromptConfig::default(),
            };
            let chat_client = new_chat_client(&llm_config_from_args(&args)?)?;
            info!("Chat client configured: Model={}", chat_client.model());

            let index: Arc<dyn CaseIndex> = Arc::new(MemoryCaseIndex::new());
            let upload = CaseIngestor::new(index.clone()).ingest_file(rules).await?;

            let history = MemoryHistoryStore::new(policy);
            let conversation_id = Uuid::new_v4().to_string();
            let notice = ApologyResponder::notice(
                format!("{} ({} cases)", upload.message, upload.cases_indexed)
            );
            history.add_raw(&conversation_id, &serde_json::to_value(&notice)?).await?;

            let request = ApologyRequest {
                case_description: case_description.clone(),
                wrongdoing: wrongdoing.clone(),
            };
            let responder = ApologyResponder::new(index, chat_client, Arc::new(prompt_config));
            answer_in_conversation(&history, &responder, &conversation_id, &request).await?;

            let conversation = history.get_conversation(&conversation_id, usize::MAX).await?;
            for message in &conversation.messages {
                println!("{}", serde_json::to_string(message)?);
            }
        }
    }

    Ok(())
}
