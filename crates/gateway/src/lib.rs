//! HTTP chat gateway for the Distillery site assistant.
//!
//! Exposes the chat endpoint the site widget talks to, plus a health check.
//! Every response carries permissive cross-origin headers.
//!
//! Built on Axum. The gateway is stateless: the only shared value is the
//! [`Assistant`], built once at startup and read-only afterwards.

pub mod chat;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    http::{HeaderValue, header},
    response::Json,
    routing::{MethodRouter, get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

use distillery_agent::Assistant;

/// Methods advertised to browsers.
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
/// Request headers advertised to browsers.
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub assistant: Arc<Assistant>,
    /// Value of `Access-Control-Allow-Origin`
    pub allowed_origin: HeaderValue,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    /// State that allows any origin.
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            allowed_origin: HeaderValue::from_static("*"),
        }
    }

    pub fn with_allowed_origin(mut self, origin: HeaderValue) -> Self {
        self.allowed_origin = origin;
        self
    }
}

/// The chat method table: POST turns, OPTIONS pre-flight, 405 otherwise.
fn chat_route() -> MethodRouter<SharedState> {
    post(chat::chat_handler)
        .options(chat::preflight_handler)
        .fallback(chat::method_not_allowed_handler)
}

/// Build the Axum router with all gateway routes.
///
/// `/api/chat` is the path the site widget posts to; `/chat` is the same
/// handler without the hosting prefix.
pub fn build_router(state: SharedState) -> Router {
    let origin = state.allowed_origin.clone();

    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", chat_route())
        .route("/api/chat", chat_route())
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the generator and assistant once and shares them across requests.
pub async fn start(config: distillery_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let generator = distillery_providers::build_from_config(&config)?;
    let assistant = Arc::new(Assistant::from_config(generator, &config));
    let origin = HeaderValue::from_str(&config.gateway.allowed_origin)?;

    info!(
        addr = %addr,
        model = %config.model,
        generator = assistant.generator_name(),
        "Gateway starting"
    );

    let state = Arc::new(GatewayState::new(assistant).with_allowed_origin(origin));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
