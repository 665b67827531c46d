pub mod chat;
pub mod upload;

pub use chat::{ ChatMessage, Conversation, MessageType, Role };
pub use upload::UploadResponse;
