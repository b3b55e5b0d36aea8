//! Anthropic native generator implementation.
//!
//! Uses Anthropic's Messages API directly.
//!
//! Features:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as top-level field
//! - Server-side `web_search` tool with a use cap and approximate location
//! - Text blocks with `web_search_result_location` citations

use async_trait::async_trait;
use distillery_core::error::ProviderError;
use distillery_core::message::ChatMessage;
use distillery_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";

/// Anthropic native Messages API generator.
pub struct AnthropicGenerator {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicGenerator {
    /// Create a new Anthropic generator.
    ///
    /// No client timeout is set; calls rely on the platform defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the Messages API body for a request.
    fn to_api_request(request: &GenerationRequest) -> MessagesRequest<'_> {
        let tool = &request.web_search;
        MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: request.messages.iter().map(ApiMessage::from).collect(),
            tools: vec![ApiWebSearchTool {
                tool_type: WEB_SEARCH_TOOL_TYPE,
                name: &tool.name,
                max_uses: tool.max_uses,
                user_location: ApiUserLocation {
                    location_type: "approximate",
                    city: &tool.user_location.city,
                    region: &tool.user_location.region,
                    country: &tool.user_location.country,
                    timezone: &tool.user_location.timezone,
                },
            }],
        }
    }

    /// Convert an Anthropic API response into text-bearing content blocks.
    ///
    /// Blocks without user-facing text (`server_tool_use`,
    /// `web_search_tool_result`, anything unknown) are dropped here.
    fn to_generation_response(resp: MessagesResponse) -> GenerationResponse {
        let content = resp
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseContentBlock::Text {
                    text,
                    citations: None,
                } => Some(ContentBlock::Text { text }),
                ResponseContentBlock::Text {
                    text,
                    citations: Some(citations),
                } => Some(ContentBlock::TextWithCitations {
                    text,
                    citations: citations
                        .into_iter()
                        .filter_map(ResponseCitation::into_source)
                        .collect(),
                }),
                ResponseContentBlock::Other => None,
            })
            .collect();

        GenerationResponse {
            content,
            usage: UsageMetrics::new(resp.usage),
            model: resp.model,
        }
    }
}

#[async_trait]
impl Generator for AnthropicGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = Self::to_api_request(&request);

        debug!(
            provider = "anthropic",
            model = %request.model,
            messages = request.messages.len(),
            max_search_uses = request.web_search.max_uses,
            "Sending generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Anthropic API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Anthropic API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let api_resp: MessagesResponse = serde_json::from_slice(&bytes).map_err(|e| {
            ProviderError::MalformedResponse(format!("Failed to parse Anthropic response: {e}"))
        })?;

        Ok(Self::to_generation_response(api_resp))
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ApiMessage<'a>>,
    tools: Vec<ApiWebSearchTool<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for ApiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiWebSearchTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    name: &'a str,
    max_uses: u32,
    user_location: ApiUserLocation<'a>,
}

#[derive(Debug, Serialize)]
struct ApiUserLocation<'a> {
    #[serde(rename = "type")]
    location_type: &'static str,
    city: &'a str,
    region: &'a str,
    country: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ResponseContentBlock>,
    #[serde(default = "empty_usage")]
    usage: serde_json::Value,
}

fn empty_usage() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseContentBlock {
    Text {
        text: String,
        #[serde(default)]
        citations: Option<Vec<ResponseCitation>>,
    },
    #[serde(other)]
    Other,
}

/// Any citation kind; only those carrying a URL become sources.
#[derive(Debug, Deserialize)]
struct ResponseCitation {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl ResponseCitation {
    fn into_source(self) -> Option<CitationSource> {
        let url = self.url?;
        let title = self.title.unwrap_or_else(|| url.clone());
        Some(CitationSource { title, url })
    }
}
