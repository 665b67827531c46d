use clap::{ Parser, Subcommand, ValueEnum };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (ollama, anthropic)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "ollama", global = true)]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL", global = true)] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider (required for Anthropic)
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true, global = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., llama3, claude-3-5-sonnet-latest)
    #[arg(long, env = "CHAT_MODEL", global = true)] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Maximum tokens generated per answer.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "400", global = true)]
    pub chat_max_tokens: u32,

    // --- General App Args ---
    /// Optional path to a JSON file overriding the built-in prompt templates.
    #[arg(long, env = "PROMPTS_PATH", global = true)]
    pub prompts_path: Option<String>,

    /// Reject user turns classified as 'apology' or 'rule-answer'.
    #[arg(long, env = "STRICT_ROLES", default_value = "false", global = true)]
    pub strict_roles: bool,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate a JSON payload against the chat or upload contract.
    Validate {
        #[arg(value_enum)]
        kind: PayloadKind,

        /// Read the payload from this file instead of stdin.
        #[arg(long)]
        file: Option<String>,
    },
    /// Index a plain-text rules document and print the upload response.
    Upload {
        #[arg(long)]
        file: String,
    },
    /// Index a rules document, then answer one situation from it.
    Apologize {
        /// Plain-text rules document to index first.
        #[arg(long)]
        rules: String,

        /// What happened.
        #[arg(long = "case")]
        case_description: String,

        /// What you did wrong.
        #[arg(long)]
        wrongdoing: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Chat,
    Upload,
}
