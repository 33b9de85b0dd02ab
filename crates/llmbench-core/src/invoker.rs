// Completion driver seam and the timing invoker
//
// Drivers only know how to turn a prompt into a Completion. The Invoker owns
// the measurement: it timestamps around the driver call and converts every
// outcome, including errors, into an OutcomeRecord. Errors never propagate
// past `invoke`, and no retry is attempted.

use std::fmt;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::Result;
use crate::outcome::{Completion, CompletionRequest, OutcomeRecord, Provider};

/// Output-token cap used when a scenario does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// A backend that can answer a single-turn completion
///
/// Implementations must tolerate concurrent calls on `&self`; one driver
/// instance (and its HTTP client) is shared by every invocation in a run.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Backend tag written into every record
    fn provider(&self) -> Provider;

    /// Model identifier written into every record
    fn model(&self) -> &str;

    /// Send one request and normalize the response
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

/// Type alias for boxed drivers
pub type BoxedCompletionDriver = Box<dyn CompletionDriver>;

/// Measures one completion call per `invoke`
pub struct Invoker {
    driver: BoxedCompletionDriver,
}

impl Invoker {
    /// Wrap a driver; the backend is fixed for the lifetime of the invoker
    pub fn new(driver: impl CompletionDriver + 'static) -> Self {
        Self {
            driver: Box::new(driver),
        }
    }

    /// Wrap an already boxed driver
    pub fn from_boxed(driver: BoxedCompletionDriver) -> Self {
        Self { driver }
    }

    pub fn provider(&self) -> Provider {
        self.driver.provider()
    }

    pub fn model(&self) -> &str {
        self.driver.model()
    }

    /// Issue one request and record its outcome
    pub async fn invoke(&self, prompt: &str, max_output_tokens: Option<u32>) -> OutcomeRecord {
        let request = CompletionRequest {
            prompt: prompt.to_string(),
            max_tokens: max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };
        let provider = self.driver.provider();
        let model = self.driver.model();

        let start = Instant::now();
        let result = self.driver.complete(&request).await;
        let latency = start.elapsed().as_secs_f64();

        match result {
            Ok(completion) => {
                tracing::info!(
                    provider = %provider,
                    input_tokens = ?completion.input_tokens,
                    output_tokens = ?completion.output_tokens,
                    latency,
                    "Completion succeeded"
                );
                OutcomeRecord::success(provider, model, latency, completion)
            }
            Err(e) => {
                tracing::error!(provider = %provider, latency, "{} API error: {}", provider, e);
                OutcomeRecord::failure(provider, model, latency, e.to_string())
            }
        }
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker")
            .field("provider", &self.driver.provider())
            .field("model", &self.driver.model())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::mock::{MockDriver, MockReply};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_invoke_success_records_latency_and_tokens() {
        let driver = MockDriver::new(Provider::Anthropic, "claude-test").with_replies(vec![
            MockReply::ok(Completion::text("4").with_usage(15, 1)).after(Duration::from_millis(1500)),
        ]);
        let invoker = Invoker::new(driver);

        let record = invoker.invoke("What is 2+2?", None).await;

        assert!(record.success);
        assert_eq!(record.latency, 1.5);
        assert_eq!(record.response.as_deref(), Some("4"));
        assert_eq!(record.input_tokens, Some(15));
        assert_eq!(record.output_tokens, Some(1));
        assert_eq!(record.model, "claude-test");
        assert_eq!(record.provider, Provider::Anthropic);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invoke_failure_is_captured() {
        let driver = MockDriver::new(Provider::Bedrock, "arn:model").with_replies(vec![
            MockReply::err(BenchError::provider("rate limited")).after(Duration::from_millis(250)),
        ]);
        let invoker = Invoker::new(driver);

        let record = invoker.invoke("hello", Some(10)).await;

        assert!(!record.success);
        assert_eq!(record.latency, 0.25);
        assert_eq!(record.error.as_deref(), Some("Provider error: rate limited"));
        assert!(record.input_tokens.is_none());
        assert!(record.response.is_none());
    }

    #[tokio::test]
    async fn test_invoke_applies_default_max_tokens() {
        let driver = MockDriver::new(Provider::Anthropic, "m");
        let calls = driver.call_log();
        let invoker = Invoker::new(driver);

        invoker.invoke("a", None).await;
        invoker.invoke("b", Some(20)).await;

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls[0].max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(calls[1].max_tokens, 20);
        assert_eq!(calls[1].prompt, "b");
    }

    #[tokio::test]
    async fn test_missing_usage_yields_none() {
        let driver = MockDriver::new(Provider::Anthropic, "m")
            .with_replies(vec![MockReply::ok(Completion::text("no usage"))]);
        let record = Invoker::new(driver).invoke("x", None).await;

        assert!(record.success);
        assert!(record.input_tokens.is_none());
        assert!(record.output_tokens.is_none());
        assert!(record.latency >= 0.0);
    }

    #[test]
    fn test_debug_shows_backend() {
        let invoker = Invoker::new(MockDriver::new(Provider::Bedrock, "arn"));
        let debug = format!("{:?}", invoker);
        assert!(debug.contains("Bedrock"));
        assert!(debug.contains("arn"));
    }
}
