//! The `/chat` endpoint.
//!
//! - `POST`   : process one turn: `{ message, history? }` → `{ message, usage, searchesUsed }`
//! - `OPTIONS`: pre-flight, 200 with an empty body
//! - anything else: 405
//!
//! Bodies over the size limit get 413; any other unreadable body counts as a
//! missing message.
//!
//! Validation happens before any outbound call. Every generator failure maps
//! to a 500 carrying the raw failure text in `details`.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use distillery_core::message::{ConversationHistory, HistoryEntry};
use distillery_core::provider::UsageMetrics;

use crate::SharedState;

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The visitor's new message.
    #[serde(default)]
    pub message: Option<String>,
    /// Prior turns, oldest first. Absent or null means none.
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub usage: UsageMetrics,
    #[serde(rename = "searchesUsed")]
    pub searches_used: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ── Errors ────────────────────────────────────────────────────────────────

/// Terminal outcomes of a `/chat` request other than success.
#[derive(Debug)]
pub enum ApiError {
    /// `message` missing, empty, or unreadable
    InvalidRequest,
    /// Method other than POST or OPTIONS
    MethodNotSupported,
    /// Body exceeds the router's size limit
    PayloadTooLarge,
    /// The generator failed; `details` is its raw error text
    DownstreamFailure { details: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidRequest => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Message is required".into(),
                    details: None,
                },
            ),
            ApiError::MethodNotSupported => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse {
                    error: "Method not allowed".into(),
                    details: None,
                },
            ),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse {
                    error: "Request body too large".into(),
                    details: None,
                },
            ),
            ApiError::DownstreamFailure { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Failed to process chat request".into(),
                    details: Some(details),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            debug!(reason = %rejection.body_text(), "Chat request body over limit");
            return Err(ApiError::PayloadTooLarge);
        }
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "Unreadable chat request body");
            return Err(ApiError::InvalidRequest);
        }
    };

    let message = match payload.message {
        Some(message) if !message.is_empty() => message,
        _ => return Err(ApiError::InvalidRequest),
    };

    let history: ConversationHistory = payload.history.unwrap_or_default().into_iter().collect();

    info!(
        message_len = message.len(),
        history_len = history.len(),
        "chat request"
    );

    match state.assistant.respond(&message, history).await {
        Ok(result) => Ok(Json(ChatResponse {
            message: result.text,
            usage: result.usage,
            searches_used: result.searches_used,
        })),
        Err(e) => {
            error!(error = %e, "Chat API error");
            Err(ApiError::DownstreamFailure {
                details: e.to_string(),
            })
        }
    }
}

/// Pre-flight: success, empty body, no processing.
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotSupported
}
