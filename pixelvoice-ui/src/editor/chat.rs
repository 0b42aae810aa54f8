// Chat-style log of everything said to and by the assistant.

use pixelvoice_core::now_millis;
use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    /// Informational notices and error reports.
    System,
}

impl Role {
    /// Speaker tag shown under a message.
    pub fn speaker(&self) -> &'static str {
        match self {
            Role::User => "Bạn",
            Role::Assistant | Role::System => "AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub timestamp: i64,
    /// History entry produced by the interaction this message reports, if any.
    pub entry_id: Option<Uuid>,
}

/// Append-only list of chat messages. It outlives uploads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) -> &ChatMessage {
        self.push_message(role, text.into(), None)
    }

    pub fn push_with_entry(&mut self, role: Role, text: impl Into<String>, entry_id: Uuid) -> &ChatMessage {
        self.push_message(role, text.into(), Some(entry_id))
    }

    fn push_message(&mut self, role: Role, text: String, entry_id: Option<Uuid>) -> &ChatMessage {
        let timestamp = now_millis();

        trace!(?role, %text, "chat message");
        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            role,
            text,
            timestamp,
            entry_id,
        });
        // Just pushed, so there is a last element.
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages added after the first `seen` ones.
    pub fn since(&self, seen: usize) -> &[ChatMessage] {
        self.messages.get(seen..).unwrap_or_default()
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
