// Bedrock Managed Runtime Backend
//
// Wraps the same model family behind Bedrock's InvokeModel API. The request
// body is the provider-specific JSON envelope; the response body is parsed
// back into the core Completion shape.

mod driver;


pub use driver::{BedrockDriver, BEDROCK_ANTHROPIC_VERSION};
