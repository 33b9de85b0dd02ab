// MockDriver - Returns scripted replies
//
// Used by unit tests here and by the pipeline tests downstream. Replies are
// consumed in call order; once the script runs out the fallback answers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{BenchError, Result};
use crate::invoker::CompletionDriver;
use crate::outcome::{Completion, CompletionRequest, Provider};

/// One scripted reply
#[derive(Debug)]
pub struct MockReply {
    result: Result<Completion>,
    delay: Duration,
}

impl MockReply {
    /// A successful reply
    pub fn ok(completion: Completion) -> Self {
        Self {
            result: Ok(completion),
            delay: Duration::ZERO,
        }
    }

    /// A failing reply
    pub fn err(error: BenchError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    /// Simulated round-trip time (tokio time, so paused clocks stay exact)
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
enum Fallback {
    Reply(Completion),
    Fail(String),
}

/// Mock completion driver for testing
#[derive(Debug)]
pub struct MockDriver {
    provider: Provider,
    model: String,
    replies: Mutex<VecDeque<MockReply>>,
    fallback: Fallback,
    fallback_delay: Duration,
    call_log: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockDriver {
    /// A driver that answers every call successfully
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            replies: Mutex::new(VecDeque::new()),
            fallback: Fallback::Reply(Completion::text("Mock response").with_usage(10, 5)),
            fallback_delay: Duration::ZERO,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A driver whose every call fails with a provider error
    pub fn failing(provider: Provider, model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fallback: Fallback::Fail(message.into()),
            ..Self::new(provider, model)
        }
    }

    /// Queue scripted replies ahead of the fallback
    pub fn with_replies(self, replies: Vec<MockReply>) -> Self {
        if let Ok(mut queue) = self.replies.lock() {
            queue.extend(replies);
        }
        self
    }

    /// Delay applied to fallback replies
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Shared handle to every request received
    pub fn call_log(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.call_log)
    }

    fn next_reply(&self) -> MockReply {
        let scripted = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        scripted.unwrap_or_else(|| {
            let reply = match &self.fallback {
                Fallback::Reply(completion) => MockReply::ok(completion.clone()),
                Fallback::Fail(message) => MockReply::err(BenchError::provider(message.clone())),
            };
            reply.after(self.fallback_delay)
        })
    }
}

#[async_trait]
impl CompletionDriver for MockDriver {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(request.clone());
        }

        let reply = self.next_reply();
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}
