// Outcome records and completion payloads
//
// An OutcomeRecord is produced exactly once per invocation attempt and is
// never mutated afterwards. Success and failure records are only built
// through their constructors so `response` and `error` stay mutually
// exclusive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Backend used to reach the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Direct Messages API
    Anthropic,
    /// Managed runtime wrapper around the same model family
    Bedrock,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Anthropic, Provider::Bedrock];

    /// Lowercase identifier used in configuration and file names
    pub fn slug(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::Bedrock => "bedrock",
        }
    }

    /// Human readable label used for grouping and charts
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic",
            Provider::Bedrock => "Bedrock",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Provider {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "bedrock" => Ok(Provider::Bedrock),
            other => Err(BenchError::config(format!(
                "unknown provider '{}', expected 'anthropic' or 'bedrock'",
                other
            ))),
        }
    }
}

/// A single completion request as seen by a driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

/// Normalized completion returned by a driver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Text of the first content block
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl Completion {
    /// Create a completion without usage metadata
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: None,
            output_tokens: None,
        }
    }

    /// Attach token usage
    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.input_tokens = Some(input_tokens);
        self.output_tokens = Some(output_tokens);
        self
    }
}

/// Result of one completion attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub success: bool,
    /// Round-trip latency in seconds, populated for failures too
    pub latency: f64,
    pub provider: Provider,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub model: String,
    /// Present iff `success`
    pub response: Option<String>,
    /// Present iff `!success`
    pub error: Option<String>,
}

impl OutcomeRecord {
    /// Build a successful record from a completion
    pub fn success(
        provider: Provider,
        model: impl Into<String>,
        latency: f64,
        completion: Completion,
    ) -> Self {
        Self {
            success: true,
            latency: latency.max(0.0),
            provider,
            input_tokens: completion.input_tokens,
            output_tokens: completion.output_tokens,
            model: model.into(),
            response: Some(completion.text),
            error: None,
        }
    }

    /// Build a failed record; token counts are always absent
    pub fn failure(
        provider: Provider,
        model: impl Into<String>,
        latency: f64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            latency: latency.max(0.0),
            provider,
            input_tokens: None,
            output_tokens: None,
            model: model.into(),
            response: None,
            error: Some(error.into()),
        }
    }
}
