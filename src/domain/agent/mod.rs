//! Conversational agent domain - the agent seam and its tool contract

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::llm::{Message, ToolDefinition};
use crate::domain::DomainError;

/// Per-invocation session configuration.
///
/// The thread id scopes conversation memory; two requests with the same
/// thread id share history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub thread_id: String,
}

impl SessionConfig {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("default")
    }
}

/// A tool the agent may invoke mid-conversation
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Definition advertised to the model
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with JSON arguments, returning a JSON result
    async fn call(&self, arguments: Value) -> Result<Value, DomainError>;
}

/// A language-model-backed responder that may call registered tools before
/// producing a final textual answer.
#[async_trait]
pub trait ChatAgent: Send + Sync + Debug {
    async fn invoke(
        &self,
        messages: Vec<Message>,
        session: SessionConfig,
    ) -> Result<String, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock agent recording invocations and returning a fixed response
    #[derive(Debug)]
    pub struct MockChatAgent {
        response: String,
        error: Option<String>,
        invocations: Mutex<Vec<(Vec<Message>, SessionConfig)>>,
    }

    impl MockChatAgent {
        pub fn new(response: impl Into<String>) -> Self {
            Self {
                response: response.into(),
                error: None,
                invocations: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: impl Into<String>) -> Self {
            Self {
                response: String::new(),
                error: Some(error.into()),
                invocations: Mutex::new(Vec::new()),
            }
        }

        pub fn invocations(&self) -> Vec<(Vec<Message>, SessionConfig)> {
            self.invocations.lock().unwrap().clone()
        }

        /// Content of the last user message the agent was invoked with
        pub fn last_prompt(&self) -> Option<String> {
            self.invocations
                .lock()
                .unwrap()
                .last()
                .and_then(|(messages, _)| messages.last())
                .map(|m| m.content.clone())
        }
    }

    #[async_trait]
    impl ChatAgent for MockChatAgent {
        async fn invoke(
            &self,
            messages: Vec<Message>,
            session: SessionConfig,
        ) -> Result<String, DomainError> {
            self.invocations.lock().unwrap().push((messages, session));

            if let Some(ref error) = self.error {
                return Err(DomainError::agent(error.clone()));
            }
            Ok(self.response.clone())
        }
    }
}
