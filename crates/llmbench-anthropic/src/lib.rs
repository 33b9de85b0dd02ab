// Anthropic Direct Completion Backend
//
// This crate provides the direct Messages API backend. It implements the
// CompletionDriver trait from llmbench-core so the invoker can time calls
// against Anthropic's hosted API.

mod driver;

#[cfg(test)]
mod tests;

pub use driver::{AnthropicDriver, ANTHROPIC_VERSION, DEFAULT_API_URL};

// Re-export core types for convenience
pub use llmbench_core::CompletionDriver;
