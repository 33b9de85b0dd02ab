// Anthropic Messages API Driver
//
// Implementation of CompletionDriver for Anthropic's Messages API.
// One reqwest client is shared by every concurrent call in a run; the
// per-call timeout is enforced by that client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use llmbench_core::error::{BenchError, Result};
use llmbench_core::{Completion, CompletionDriver, CompletionRequest, Provider};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API driver
///
/// A missing API key is not rejected at construction. Every call then fails
/// and the failure lands in that call's outcome record.
///
/// # Example
///
/// ```ignore
/// use llmbench_anthropic::AnthropicDriver;
///
/// let driver = AnthropicDriver::from_env("claude-3-7-sonnet-latest", timeout)?;
/// // or with custom endpoint
/// let driver = AnthropicDriver::new(Some(key), "claude-3-7-sonnet-latest", timeout)?
///     .with_api_url("https://api.example.com/v1/messages");
/// ```
#[derive(Clone)]
pub struct AnthropicDriver {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl AnthropicDriver {
    /// Create a new driver for `model` with a per-call timeout
    pub fn new(api_key: Option<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.is_empty()),
            api_url: DEFAULT_API_URL.to_string(),
            model: model.into(),
        })
    }

    /// Create a new driver reading ANTHROPIC_API_KEY
    pub fn from_env(model: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::new(std::env::var("ANTHROPIC_API_KEY").ok(), model, timeout)
    }

    /// Use a custom Messages API URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl CompletionDriver for AnthropicDriver {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| BenchError::config("ANTHROPIC_API_KEY environment variable not set"))?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        tracing::debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            "Sending Messages API request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BenchError::http(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BenchError::provider(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| BenchError::decode(format!("Invalid Messages API response: {}", e)))?;

        parsed.into_completion()
    }
}

impl std::fmt::Debug for AnthropicDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicDriver")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Anthropic API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: Option<u32>,
    #[serde(default)]
    output_tokens: Option<u32>,
}

impl MessagesResponse {
    pub(crate) fn into_completion(self) -> Result<Completion> {
        // Only content[0] is read; a leading non-text block is a failed call
        let text = match self.content.into_iter().next() {
            Some(ContentBlock::Text { text }) => text,
            Some(ContentBlock::Other) => {
                return Err(BenchError::decode("response content[0] is not a text block"))
            }
            None => return Err(BenchError::decode("response content is empty")),
        };

        let (input_tokens, output_tokens) = self
            .usage
            .map(|u| (u.input_tokens, u.output_tokens))
            .unwrap_or((None, None));

        Ok(Completion {
            text,
            input_tokens,
            output_tokens,
        })
    }
}
