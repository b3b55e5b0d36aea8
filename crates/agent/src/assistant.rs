//! One chat turn: assemble the prompt, call the generator once, extract the reply.

use std::sync::Arc;

use distillery_config::AppConfig;
use distillery_core::error::ProviderError;
use distillery_core::message::ConversationHistory;
use distillery_core::provider::{GenerationRequest, GenerationResult, Generator, WebSearchTool};
use tracing::{debug, info};

use crate::extractor::ResponseExtractor;
use crate::prompt::PromptAssembler;

/// The turn pipeline shared by every request.
///
/// Holds the process-wide generator plus immutable settings; it keeps no
/// per-request state, so one instance serves all requests concurrently.
pub struct Assistant {
    /// The generation capability
    generator: Arc<dyn Generator>,

    /// System prompt and message ordering
    assembler: PromptAssembler,

    /// The model to use
    model: String,

    /// Max output tokens per turn
    max_tokens: u32,

    /// The bounded search tool declared on every call
    web_search: WebSearchTool,
}

impl Assistant {
    pub fn new(
        generator: Arc<dyn Generator>,
        assembler: PromptAssembler,
        model: impl Into<String>,
        max_tokens: u32,
        web_search: WebSearchTool,
    ) -> Self {
        Self {
            generator,
            assembler,
            model: model.into(),
            max_tokens,
            web_search,
        }
    }

    /// Build from configuration around an already constructed generator.
    pub fn from_config(generator: Arc<dyn Generator>, config: &AppConfig) -> Self {
        Self::new(
            generator,
            PromptAssembler::from_override(config.assistant.system_prompt_override.as_deref()),
            &config.model,
            config.max_tokens,
            WebSearchTool::bounded(config.search.user_location()),
        )
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Answer `message` given the prior turns.
    ///
    /// Any generator failure is returned as-is; nothing is retried.
    pub async fn respond(
        &self,
        message: &str,
        history: ConversationHistory,
    ) -> Result<GenerationResult, ProviderError> {
        let prompt = self.assembler.assemble(history, message);

        debug!(
            generator = self.generator.name(),
            messages = prompt.messages.len(),
            "Dispatching turn"
        );

        let response = self
            .generator
            .generate(GenerationRequest {
                model: self.model.clone(),
                system: prompt.system,
                messages: prompt.messages,
                max_tokens: self.max_tokens,
                web_search: self.web_search.clone(),
            })
            .await?;

        let result = ResponseExtractor::extract(response);
        info!(
            reply_len = result.text.len(),
            searches_used = result.searches_used,
            "Turn completed"
        );
        Ok(result)
    }
}
