//! Transport seam between the controller and the chat gateway.
//!
//! The wire shapes mirror the gateway's `/chat` contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use distillery_core::message::HistoryEntry;

/// One outbound turn: the new message plus every prior displayed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundChat {
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

/// The gateway's success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub usage: serde_json::Value,
    #[serde(default, rename = "searchesUsed")]
    pub searches_used: u64,
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway returned status {0}")]
    Status(u16),

    #[error("Undecodable gateway response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, chat: &OutboundChat) -> Result<ChatReply, TransportError>;
}

/// JSON over HTTP to the gateway. Relies on the client's default timeouts.
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, chat: &OutboundChat) -> Result<ChatReply, TransportError> {
        debug!(endpoint = %self.endpoint, history_len = chat.history.len(), "Posting chat turn");

        let response = self
            .client
            .post(&self.endpoint)
            .json(chat)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<ChatReply>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/chat")
    }

    fn turn() -> OutboundChat {
        OutboundChat {
            message: "What is gBETA?".into(),
            history: vec![HistoryEntry::new("user", "hi")],
        }
    }

    #[test]
    fn outbound_serializes_as_gateway_request() {
        let json = serde_json::to_value(turn()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "What is gBETA?",
                "history": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[tokio::test]
    async fn posts_turn_and_decodes_reply() {
        let app = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["history"][0]["content"], "hi");
                Json(serde_json::json!({
                    "message": format!("echo: {}", body["message"].as_str().unwrap_or_default()),
                    "usage": {"output_tokens": 3},
                    "searchesUsed": 1
                }))
            }),
        );
        let transport = HttpTransport::new(spawn(app).await);

        let reply = transport.send(&turn()).await.unwrap();
        assert_eq!(reply.message, "echo: What is gBETA?");
        assert_eq!(reply.searches_used, 1);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "Failed to process chat request"})),
                )
            }),
        );
        let transport = HttpTransport::new(spawn(app).await);

        let err = transport.send(&turn()).await.unwrap_err();
        assert!(matches!(err, TransportError::Status(500)));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(format!("http://{addr}/api/chat"));
        let err = transport.send(&turn()).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}
