//! End-to-end integration tests for the Distillery chat pipeline.
//!
//! These tests drive the client controller through the real gateway router,
//! assistant and extractor, with only the generation capability mocked.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use tower::ServiceExt;

use distillery_agent::Assistant;
use distillery_config::AppConfig;
use distillery_core::error::ProviderError;
use distillery_core::message::ChatRole;
use distillery_core::provider::{
    CitationSource, ContentBlock, GenerationRequest, GenerationResponse, Generator, UsageMetrics,
};
use distillery_gateway::{GatewayState, build_router};
use distillery_widget::{
    ChatController, ChatReply, ChatState, ChatTransport, LocalIdentity, OutboundChat, Speaker,
    TransportError,
};

// ── Mock Generator ───────────────────────────────────────────────────────

/// A mock generator that returns scripted responses in sequence.
struct ScriptedGenerator {
    responses: Mutex<Vec<Result<GenerationResponse, ProviderError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn new(responses: Vec<Result<GenerationResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            panic!("ScriptedGenerator exhausted: call #{}", requests.len() + 1);
        }
        requests.push(request);
        responses.remove(0)
    }
}

fn text_response(text: &str) -> Result<GenerationResponse, ProviderError> {
    Ok(GenerationResponse {
        content: vec![ContentBlock::text(text)],
        usage: UsageMetrics::new(serde_json::json!({"input_tokens": 10, "output_tokens": 5})),
        model: "mock-model".into(),
    })
}

// ── In-process transport ─────────────────────────────────────────────────

/// Delivers turns straight into the gateway router, no sockets involved.
struct RouterTransport {
    router: Router,
}

#[async_trait::async_trait]
impl ChatTransport for RouterTransport {
    async fn send(&self, chat: &OutboundChat) -> Result<ChatReply, TransportError> {
        let body = serde_json::to_vec(chat).map_err(|e| TransportError::Decode(e.to_string()))?;
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?
            .to_bytes();
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

fn pipeline(generator: Arc<ScriptedGenerator>, signed_in: bool) -> ChatController {
    let config = AppConfig::default();
    let assistant = Arc::new(Assistant::from_config(generator, &config));
    let router = build_router(Arc::new(GatewayState::new(assistant)));

    let identity = LocalIdentity::new("visitor");
    let identity = if signed_in { identity.signed_in() } else { identity };

    ChatController::from_config(Arc::new(identity), Arc::new(RouterTransport { router }), &config)
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_plain_answer_reaches_transcript() {
    let generator = Arc::new(ScriptedGenerator::new(vec![text_response(
        "gBETA is a free, six-week accelerator.",
    )]));
    let mut chat = pipeline(generator.clone(), true);

    let reply = chat.send("What is gBETA?").await.unwrap();
    assert_eq!(reply.speaker, Speaker::Agent);
    assert_eq!(reply.content, "gBETA is a free, six-week accelerator.");

    assert_eq!(chat.state(), ChatState::Idle);
    assert_eq!(chat.transcript().len(), 3);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn e2e_history_excludes_greeting_and_keeps_order() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        text_response("Hello! How can I help?"),
        text_response("Coworking is open weekdays."),
    ]));
    let mut chat = pipeline(generator.clone(), true);

    chat.send("hi").await.unwrap();
    chat.send("Tell me about coworking").await.unwrap();

    let requests = generator.requests.lock().unwrap();
    let second = &requests[1];
    let turns: Vec<(ChatRole, &str)> = second
        .messages
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![
            (ChatRole::User, "hi"),
            (ChatRole::Assistant, "Hello! How can I help?"),
            (ChatRole::User, "Tell me about coworking"),
        ]
    );
    assert!(second.system.contains("Distillery Labs"));
}

#[tokio::test]
async fn e2e_citations_are_rendered_once() {
    let source = CitationSource::new("Distillery Events", "https://distillerylabs.org/events");
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(GenerationResponse {
        content: vec![
            ContentBlock::cited("Fail Club meets monthly. ", vec![source.clone()]),
            ContentBlock::cited("Winning Wednesday is weekly.", vec![source]),
        ],
        usage: UsageMetrics::new(serde_json::json!({"server_tool_use": {"web_search_requests": 1}})),
        model: "mock-model".into(),
    })]));
    let mut chat = pipeline(generator, true);

    let reply = chat.send("What events are coming up?").await.unwrap();
    assert_eq!(
        reply.content,
        "Fail Club meets monthly. Winning Wednesday is weekly.\n\n\
         Sources:\n• Distillery Events: https://distillerylabs.org/events"
    );
}

#[tokio::test]
async fn e2e_downstream_failure_shows_fallback() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Err(ProviderError::Network("connection reset".into())),
        text_response("Recovered."),
    ]));
    let mut chat = pipeline(generator.clone(), true);

    let fallback = AppConfig::default().assistant.fallback_message;
    let reply = chat.send("hello").await.unwrap();
    assert_eq!(reply.content, fallback);
    assert!(!reply.content.contains("connection reset"));
    assert_eq!(chat.state(), ChatState::Idle);

    let reply = chat.send("hello again").await.unwrap();
    assert_eq!(reply.content, "Recovered.");
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn e2e_unauthenticated_sends_nothing() {
    let generator = Arc::new(ScriptedGenerator::new(vec![text_response("Welcome.")]));
    let mut chat = pipeline(generator.clone(), false);

    assert!(chat.send("hi").await.is_none());
    assert_eq!(generator.calls(), 0);

    chat.sign_in().await.unwrap();
    assert_eq!(chat.send("hi").await.unwrap().content, "Welcome.");
    assert_eq!(generator.calls(), 1);

    assert!(chat.sign_out().await);
    assert!(chat.send("still there?").await.is_none());
    assert_eq!(generator.calls(), 1);
    assert_eq!(chat.transcript().len(), 3);
}

#[tokio::test]
async fn e2e_search_tool_is_bounded() {
    let generator = Arc::new(ScriptedGenerator::new(vec![text_response("ok")]));
    let mut chat = pipeline(generator.clone(), true);

    chat.send("Any news?").await.unwrap();

    let requests = generator.requests.lock().unwrap();
    assert_eq!(requests[0].web_search.max_uses, 3);
    assert_eq!(requests[0].web_search.user_location.timezone, "America/Chicago");
}
