//! Generation provider implementations for Distillery.
//!
//! All providers implement the `distillery_core::Generator` trait.
//! [`build_from_config`] constructs the process-wide generator once at startup.

pub mod anthropic;

use std::sync::Arc;

use distillery_config::AppConfig;
use distillery_core::error::ProviderError;
use distillery_core::provider::Generator;

pub use anthropic::AnthropicGenerator;

/// Build the generator described by the configuration.
///
/// Fails with `NotConfigured` when no credential is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Generator>, ProviderError> {
    let api_key = config.api_key.as_deref().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no API key: set ANTHROPIC_API_KEY or api_key in config.toml".into(),
        )
    })?;

    tracing::info!(provider = "anthropic", model = %config.model, "Generator configured");
    Ok(Arc::new(AnthropicGenerator::new(api_key)))
}
