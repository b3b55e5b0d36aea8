//! Error types for the Distillery domain.
//!
//! Uses `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// Failures surfaced by the external generation capability.
///
/// Every variant is terminal for the current request. The gateway collapses
/// all of them into a single downstream failure; nothing here is retried.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}
