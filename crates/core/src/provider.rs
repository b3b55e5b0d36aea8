//! Generator trait: the abstraction over the external generation capability.
//!
//! A Generator takes an assembled conversation, a system prompt and a bounded
//! web search tool declaration, and returns the provider's content blocks in
//! one piece. There is no streaming: a call either yields a complete
//! [`GenerationResponse`] or fails.
//!
//! Implementations: Anthropic Messages API (`distillery-providers`), scripted
//! mocks in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::ChatMessage;

/// Maximum number of web search invocations the provider may make per request.
pub const TOOL_INVOCATION_BUDGET: u32 = 3;

/// Approximate geographic hint handed to the search tool.
///
/// Only a hint for result relevance; never a correctness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLocation {
    pub city: String,
    pub region: String,
    pub country: String,
    pub timezone: String,
}

/// Declaration of the server-side web search tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchTool {
    /// Tool name as seen by the model
    pub name: String,

    /// Invocation cap for a single request
    pub max_uses: u32,

    /// Approximate location hint
    pub user_location: UserLocation,
}

impl WebSearchTool {
    /// A `web_search` tool capped at [`TOOL_INVOCATION_BUDGET`] uses.
    pub fn bounded(user_location: UserLocation) -> Self {
        Self {
            name: "web_search".into(),
            max_uses: TOOL_INVOCATION_BUDGET,
            user_location,
        }
    }
}

/// Everything the generator needs for one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model to use (e.g., "claude-haiku-4-5-20251001")
    pub model: String,

    /// Fixed system prompt, sent separately from the messages
    pub system: String,

    /// Prior turns followed by the new user message
    pub messages: Vec<ChatMessage>,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// The single declared tool
    pub web_search: WebSearchTool,
}

/// A source cited by generated text. Identity key is `url`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CitationSource {
    pub title: String,
    pub url: String,
}

impl CitationSource {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// One block of provider output that carries user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain generated text
    Text { text: String },
    /// Generated text backed by one or more sources
    TextWithCitations {
        text: String,
        citations: Vec<CitationSource>,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn cited(text: impl Into<String>, citations: Vec<CitationSource>) -> Self {
        ContentBlock::TextWithCitations {
            text: text.into(),
            citations,
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } | ContentBlock::TextWithCitations { text, .. } => text,
        }
    }

    pub fn citations(&self) -> &[CitationSource] {
        match self {
            ContentBlock::Text { .. } => &[],
            ContentBlock::TextWithCitations { citations, .. } => citations,
        }
    }
}

/// Provider-reported usage counters, passed through opaquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageMetrics(serde_json::Value);

impl UsageMetrics {
    pub fn new(raw: serde_json::Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }
}

/// The complete structured output of one generator call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Text-bearing blocks in the order the provider returned them
    pub content: Vec<ContentBlock>,

    /// Usage payload as reported
    pub usage: UsageMetrics,

    /// Which model actually responded
    pub model: String,
}

/// The user-facing outcome of a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Merged text, with a sources section when citations were present
    pub text: String,

    pub usage: UsageMetrics,

    /// Number of web searches the provider reports having made
    pub searches_used: u64,
}

/// The external generation capability.
///
/// Constructed once at process start and shared read-only across requests.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this generator (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Run one complete generation. No retry, no partial delivery.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError>;
}
