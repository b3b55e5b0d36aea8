//! # Distillery Core
//!
//! Domain types, traits, and error definitions for the Distillery Labs chat
//! assistant. This crate has **zero framework dependencies**: it defines the
//! domain model that the provider, agent, gateway and widget crates implement
//! against.
//!
//! ## Design Philosophy
//!
//! The external generation capability is defined as a trait here
//! ([`Generator`]). Implementations live in `distillery-providers`. This enables:
//! - Swapping the backend via configuration
//! - Testing the whole pipeline with scripted generators
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::ProviderError;
pub use message::{ChatMessage, ChatRole, ConversationHistory, HistoryEntry};
pub use provider::{
    CitationSource, ContentBlock, GenerationRequest, GenerationResponse, GenerationResult,
    Generator, TOOL_INVOCATION_BUDGET, UsageMetrics, UserLocation, WebSearchTool,
};
