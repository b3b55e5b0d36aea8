//! Chat turn pipeline for Distillery.
//!
//! Implements the server side of a turn:
//! 1. **Assemble**: normalized history + new message + fixed system prompt
//! 2. **Generate**: one call to the external generator with a bounded search tool
//! 3. **Extract**: merge text blocks, dedupe citations, append sources
//!
//! [`Assistant`] ties the three together and is what the gateway holds.

pub mod assistant;
pub mod extractor;
pub mod prompt;

pub use assistant::Assistant;
pub use extractor::ResponseExtractor;
pub use prompt::{AssembledPrompt, DEFAULT_SYSTEM_PROMPT, PromptAssembler};
