//! Prompt assembly: system prompt plus the ordered message list for one turn.

use std::sync::Arc;

use distillery_core::message::{ChatMessage, ConversationHistory};

/// Built-in domain persona for the Distillery Labs site assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are the Distillery Labs AI assistant, helping visitors navigate and learn about Distillery Labs, a startup accelerator in Peoria, Central Illinois.

## About Distillery Labs
Distillery Labs helps entrepreneurs turn ideas into successful businesses. We are based at 201 Southwest Adams Street, Peoria, IL 61602 and focus on building the Central Illinois startup ecosystem without gatekeeping: Connection, Education, Motivation, Inspiration.

## Programs & Services
1. **gBETA** - free, intensive 6-week accelerator for early-stage startups
2. **Winning Wednesday** - weekly workshops, pitch practice and real feedback
3. **Fail Club** - monthly meetups to learn from failure and build resilience
4. **Coworking** - desk space from $100/mo with 24/7 access for members
5. **Community Events** - networking events, workshops and educational sessions

## Key Information
- Hours: Monday to Friday, 8:00 AM to 5:00 PM; closed weekends
- Website: https://distillerylabs.org
- Apply to gBETA: https://www.gbetastartups.com/distillery-labs

## Your Role
- Help visitors understand what Distillery Labs offers
- Guide them to appropriate programs based on their needs
- Answer questions about the accelerator, events and community
- Use web search for current dates, deadlines and news; cite what you find

Keep responses brief and actionable. Use a professional but friendly tone that matches the brutalist, modern aesthetic of the website.";

/// The provider-ready form of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

/// Builds the ordered message list and attaches the fixed system prompt.
///
/// The system prompt is set once at construction and never influenced by
/// request input.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_prompt: Arc<str>,
}

impl PromptAssembler {
    pub fn new(system_prompt: impl Into<Arc<str>>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// Use the override when present, otherwise [`DEFAULT_SYSTEM_PROMPT`].
    pub fn from_override(system_prompt_override: Option<&str>) -> Self {
        Self::new(system_prompt_override.unwrap_or(DEFAULT_SYSTEM_PROMPT))
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Prior turns in conversation order, then the new user message.
    pub fn assemble(&self, history: ConversationHistory, message: &str) -> AssembledPrompt {
        let mut messages = history.into_messages();
        messages.push(ChatMessage::user(message));

        AssembledPrompt {
            system: self.system_prompt.to_string(),
            messages,
        }
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}
