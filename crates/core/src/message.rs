//! Message and conversation history domain types.
//!
//! These are the value objects that flow through a chat turn:
//! widget sends history + message → gateway normalizes roles → generator answers.

use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The site visitor
    User,
    /// The assistant
    Assistant,
}

impl ChatRole {
    /// Map an untrusted role string onto the closed role set.
    ///
    /// Exactly `"user"` is a user turn. Every other value, including foreign
    /// or corrupted labels such as `"bot"`, `"User"` or `""`, is an assistant turn.
    pub fn normalize(raw: &str) -> Self {
        if raw == "user" {
            ChatRole::User
        } else {
            ChatRole::Assistant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message
    pub role: ChatRole,

    /// The text content
    pub content: String,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A history entry exactly as it travels on the wire.
///
/// The role is a free-form string here; it only becomes a [`ChatRole`]
/// through [`HistoryEntry::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Convert into a domain message, coercing the role.
    pub fn normalize(self) -> ChatMessage {
        ChatMessage {
            role: ChatRole::normalize(&self.role),
            content: self.content,
        }
    }
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(msg: &ChatMessage) -> Self {
        Self::new(msg.role.as_str(), msg.content.clone())
    }
}

/// Ordered prior turns of a conversation.
///
/// Owned by the client and resubmitted every turn. Insertion order is
/// conversation order and the only mutation is appending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<ChatMessage>);

impl ConversationHistory {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a message at the end of the conversation.
    pub fn push(&mut self, message: ChatMessage) {
        self.0.push(message);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ChatMessage] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.0
    }
}

impl FromIterator<HistoryEntry> for ConversationHistory {
    fn from_iter<I: IntoIterator<Item = HistoryEntry>>(iter: I) -> Self {
        Self(iter.into_iter().map(HistoryEntry::normalize).collect())
    }
}

impl FromIterator<ChatMessage> for ConversationHistory {
    fn from_iter<I: IntoIterator<Item = ChatMessage>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
