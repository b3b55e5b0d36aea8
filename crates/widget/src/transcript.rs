//! The displayed message list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use distillery_core::message::{ChatRole, HistoryEntry};

/// Who a displayed message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Agent,
}

impl Speaker {
    /// Role used when the message is sent back as history.
    pub fn wire_role(self) -> ChatRole {
        match self {
            Speaker::User => ChatRole::User,
            Speaker::Agent => ChatRole::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayedMessage {
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl DisplayedMessage {
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only list of displayed messages. The first entry is always the
/// local greeting, which never goes over the wire.
#[derive(Debug, Clone)]
pub struct Transcript {
    entries: Vec<DisplayedMessage>,
}

impl Transcript {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            entries: vec![DisplayedMessage::new(Speaker::Agent, greeting)],
        }
    }

    pub fn push(&mut self, speaker: Speaker, content: impl Into<String>) -> &DisplayedMessage {
        self.entries.push(DisplayedMessage::new(speaker, content));
        &self.entries[self.entries.len() - 1]
    }

    pub fn greeting(&self) -> &DisplayedMessage {
        &self.entries[0]
    }

    pub fn entries(&self) -> &[DisplayedMessage] {
        &self.entries
    }

    pub fn last(&self) -> Option<&DisplayedMessage> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry after the greeting, as wire history.
    pub fn wire_history(&self) -> Vec<HistoryEntry> {
        self.entries[1..]
            .iter()
            .map(|m| HistoryEntry::new(m.speaker.wire_role().as_str(), m.content.clone()))
            .collect()
    }
}
