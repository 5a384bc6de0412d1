//! LLM domain - messages, requests, and the provider seam

mod message;
mod provider;
mod request;
mod response;

pub use message::{Message, MessageRole, ToolCall};
pub use provider::LlmProvider;
pub use request::{LlmRequest, LlmRequestBuilder, ToolDefinition};
pub use response::{FinishReason, LlmResponse, Usage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
