use serde::{ Serialize, Deserialize };
use std::fmt;
use crate::contract::{ validate_chat_message, ValidationError };

/// Who produced a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
    System,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Bot, Role::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
            Role::System => "system",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "bot" => Some(Role::Bot),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a bot or system turn was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// No indexed case matched the request.
    #[serde(rename = "apology")]
    Apology,
    /// The answer was derived from an indexed case.
    #[serde(rename = "rule-answer")]
    RuleAnswer,
    #[serde(rename = "system")]
    System,
}

impl MessageType {
    pub const ALL: [MessageType; 3] = [
        MessageType::Apology,
        MessageType::RuleAnswer,
        MessageType::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Apology => "apology",
            MessageType::RuleAnswer => "rule-answer",
            MessageType::System => "system",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "apology" => Some(MessageType::Apology),
            "rule-answer" => Some(MessageType::RuleAnswer),
            "system" => Some(MessageType::System),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn in a conversation. Fields are private so a message cannot be
/// changed after construction; deserializing goes through the contract
/// validator (lenient policy).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct ChatMessage {
    role: Role,
    content: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    message_type: Option<MessageType>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>, message_type: Option<MessageType>) -> Self {
        Self {
            role,
            content: content.into(),
            message_type,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, None)
    }

    pub fn bot(content: impl Into<String>, message_type: Option<MessageType>) -> Self {
        Self::new(Role::Bot, content, message_type)
    }

    pub fn system_notice(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, Some(MessageType::System))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn message_type(&self) -> Option<MessageType> {
        self.message_type
    }
}

impl TryFrom<serde_json::Value> for ChatMessage {
    type Error = ValidationError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        validate_chat_message(&value)
    }
}

/// Ordered turns, earliest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_is_omitted_when_absent() {
        let msg = ChatMessage::user("hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({ "role": "user", "content": "hello" }));
    }

    #[test]
    fn rule_answer_uses_kebab_case_on_the_wire() {
        let msg = ChatMessage::bot("Cite case 2.", Some(MessageType::RuleAnswer));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "rule-answer");
        assert_eq!(value["role"], "bot");
    }

    #[test]
    fn wire_names_match_serde_names() {
        for role in Role::ALL {
            let value = serde_json::to_value(role).unwrap();
            assert_eq!(value, json!(role.as_str()));
            assert_eq!(Role::from_wire(role.as_str()), Some(role));
        }
        for kind in MessageType::ALL {
            let value = serde_json::to_value(kind).unwrap();
            assert_eq!(value, json!(kind.as_str()));
            assert_eq!(MessageType::from_wire(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn deserializing_rejects_what_validation_rejects() {
        let err = serde_json::from_value::<ChatMessage>(
            json!({ "role": "assistant", "content": "hi" })
        ).unwrap_err();
        assert!(err.to_string().contains("invalid role"));

        let err = serde_json::from_str::<ChatMessage>(r#"{"role":"bot","content":"x","type":"joke"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid message type"));

        let msg: ChatMessage = serde_json::from_value(
            json!({ "role": "bot", "content": "Sorry.", "type": "apology", "extra": 1 })
        ).unwrap();
        assert_eq!(msg, ChatMessage::bot("Sorry.", Some(MessageType::Apology)));
    }

    #[test]
    fn conversation_keeps_insertion_order() {
        let mut conversation = Conversation::new("c1");
        conversation.push(ChatMessage::user("first"));
        conversation.push(ChatMessage::bot("second", None));
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages[0].content(), "first");
        assert_eq!(conversation.last().map(|m| m.role()), Some(Role::Bot));
    }
}
