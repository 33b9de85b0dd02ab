// Bedrock InvokeModel Driver

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use llmbench_core::error::{BenchError, Result};
use llmbench_core::{BenchConfig, Completion, CompletionDriver, CompletionRequest, Provider};

/// Protocol version tag expected by Anthropic models on Bedrock
pub const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Bedrock runtime driver
///
/// Authenticates with a Bedrock API key sent as a bearer token. A missing
/// token fails each call rather than the construction.
#[derive(Clone)]
pub struct BedrockDriver {
    client: Client,
    bearer_token: Option<String>,
    endpoint: String,
    model_id: String,
}

impl BedrockDriver {
    /// Create a driver against the regional runtime endpoint
    pub fn new(
        bearer_token: Option<String>,
        model_id: impl Into<String>,
        region: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            bearer_token: bearer_token.filter(|t| !t.is_empty()),
            endpoint: format!("https://bedrock-runtime.{}.amazonaws.com", region),
            model_id: model_id.into(),
        })
    }

    /// Create a driver from the benchmark configuration and AWS_BEARER_TOKEN_BEDROCK
    pub fn from_config(config: &BenchConfig) -> Result<Self> {
        let driver = Self::new(
            std::env::var("AWS_BEARER_TOKEN_BEDROCK").ok(),
            config.bedrock_model_id.clone(),
            &config.bedrock_region,
            config.timeout,
        )?;
        Ok(match &config.bedrock_endpoint {
            Some(endpoint) => driver.with_endpoint(endpoint.clone()),
            None => driver,
        })
    }

    /// Use a custom runtime endpoint (scheme and host)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `{endpoint}/model/{model_id}/invoke` with the model id as one encoded segment
    pub(crate) fn invoke_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| BenchError::config(format!("invalid endpoint '{}': {}", self.endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| BenchError::config(format!("endpoint '{}' cannot be a base", self.endpoint)))?
            .pop_if_empty()
            .extend(["model", self.model_id.as_str(), "invoke"]);
        Ok(url)
    }
}

#[async_trait]
impl CompletionDriver for BedrockDriver {
    fn provider(&self) -> Provider {
        Provider::Bedrock
    }

    fn model(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let token = self
            .bearer_token
            .as_deref()
            .ok_or_else(|| BenchError::config("AWS_BEARER_TOKEN_BEDROCK environment variable not set"))?;

        let body = InvokeBody {
            anthropic_version: BEDROCK_ANTHROPIC_VERSION,
            max_tokens: request.max_tokens,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let url = self.invoke_url()?;
        tracing::debug!(url = %url, max_tokens = request.max_tokens, "Invoking Bedrock model");

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BenchError::http(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BenchError::provider(format!(
                "Bedrock API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: InvokeResponse = response
            .json()
            .await
            .map_err(|e| BenchError::decode(format!("Invalid InvokeModel response: {}", e)))?;

        let text = parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| BenchError::decode("response content[0].text missing"))?;

        Ok(Completion::text(text))
    }
}

impl std::fmt::Debug for BedrockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockDriver")
            .field("endpoint", &self.endpoint)
            .field("model_id", &self.model_id)
            .field("bearer_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct InvokeBody<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}
