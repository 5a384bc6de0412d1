//! Tool-calling chat agent with per-thread conversation memory

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::agent::{ChatAgent, SessionConfig, Tool};
use crate::domain::llm::{LlmProvider, LlmRequest, Message};
use crate::domain::DomainError;

const SYSTEM_PROMPT: &str = "You are an expert bank statement analyzer.\n\
You have access to one tool:\n\n\
- get_bank_rate: use this to get current bank FX rate\n\n\
If a user asks you to give an estimate currency conversion for X transactions, use the tool.";

const DEFAULT_TEMPERATURE: f32 = 0.5;
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// (question, answer) exchanges remembered per thread
const MAX_HISTORY_PAIRS: usize = 5;

/// Upper bound on chat/tool round trips per invocation
const MAX_TOOL_ITERATIONS: usize = 5;

/// Agent that loops between the model and registered tools until the model
/// produces a final textual answer.
pub struct ToolAgent<P: LlmProvider> {
    provider: P,
    model: String,
    tools: Vec<Arc<dyn Tool>>,
    sessions: RwLock<HashMap<String, VecDeque<Message>>>,
}

impl<P: LlmProvider> Debug for ToolAgent<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolAgent")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("tool_count", &self.tools.len())
            .finish()
    }
}

impl<P: LlmProvider> ToolAgent<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            tools: Vec::new(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.definition().name == name)
    }

    async fn execute_tool(&self, name: &str, arguments: &str) -> Result<String, DomainError> {
        let tool = self
            .find_tool(name)
            .ok_or_else(|| DomainError::agent(format!("Unknown tool '{}'", name)))?;

        let args: Value = if arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(arguments).map_err(|e| {
                DomainError::agent(format!("Invalid arguments for tool '{}': {}", name, e))
            })?
        };

        let result = tool.call(args).await?;
        serde_json::to_string(&result)
            .map_err(|e| DomainError::agent(format!("Failed to serialize tool result: {}", e)))
    }

    async fn history(&self, thread_id: &str) -> Vec<Message> {
        self.sessions
            .read()
            .await
            .get(thread_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn remember(&self, thread_id: &str, messages: Vec<Message>) {
        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(thread_id.to_string()).or_default();

        history.extend(messages);

        // Evict whole exchanges, oldest first
        while history.len() > MAX_HISTORY_PAIRS * 2 {
            history.pop_front();
            history.pop_front();
        }
    }
}

#[async_trait]
impl<P: LlmProvider + 'static> ChatAgent for ToolAgent<P> {
    async fn invoke(
        &self,
        messages: Vec<Message>,
        session: SessionConfig,
    ) -> Result<String, DomainError> {
        let mut conversation = vec![Message::system(SYSTEM_PROMPT)];
        conversation.extend(self.history(&session.thread_id).await);
        conversation.extend(messages.clone());

        let tool_definitions: Vec<_> = self.tools.iter().map(|t| t.definition()).collect();

        for _ in 0..MAX_TOOL_ITERATIONS {
            let request = LlmRequest::builder()
                .messages(conversation.clone())
                .tools(tool_definitions.clone())
                .temperature(DEFAULT_TEMPERATURE)
                .max_tokens(DEFAULT_MAX_TOKENS)
                .build();

            let response = self.provider.chat(&self.model, request).await?;

            if !response.requested_tool_calls() {
                let answer = response.content().to_string();

                let mut remembered = messages;
                remembered.push(Message::assistant(answer.clone()));
                self.remember(&session.thread_id, remembered).await;

                return Ok(answer);
            }

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            for call in tool_calls {
                tracing::debug!(tool = %call.name, "Executing tool call");
                let result = self.execute_tool(&call.name, &call.arguments).await?;
                conversation.push(Message::tool_result(call.id, result));
            }
        }

        Err(DomainError::agent(format!(
            "Tool call limit of {} iterations exceeded",
            MAX_TOOL_ITERATIONS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::{FinishReason, LlmResponse, MessageRole, ToolCall};
    use crate::domain::llm::MockLlmProvider;
    use crate::infrastructure::agent::tools::BankRateTool;

    fn tool_call_response(name: &str) -> LlmResponse {
        LlmResponse::new(
            "resp-tool".to_string(),
            "mock-model".to_string(),
            Message::assistant_tool_calls(vec![ToolCall::new("call_1", name, "{}")]),
        )
        .with_finish_reason(FinishReason::ToolCalls)
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let provider = MockLlmProvider::new().with_text_response("The balance is 1200 EUR.");
        let agent = ToolAgent::new(provider, "mock-model");

        let answer = agent
            .invoke(vec![Message::user("What is my balance?")], SessionConfig::default())
            .await
            .unwrap();

        assert_eq!(answer, "The balance is 1200 EUR.");
    }

    #[tokio::test]
    async fn test_tool_loop_executes_and_answers() {
        let provider = MockLlmProvider::new()
            .with_response(tool_call_response("get_bank_rate"))
            .with_text_response("The current rate is 0.42.");

        let agent =
            ToolAgent::new(provider, "mock-model").with_tool(Arc::new(BankRateTool::new()));

        let answer = agent
            .invoke(
                vec![Message::user("What is the bank rate?")],
                SessionConfig::default(),
            )
            .await
            .unwrap();

        assert_eq!(answer, "The current rate is 0.42.");

        // Second round trip carried the tool result back to the model
        let requests = agent.provider.recorded_requests();
        assert_eq!(requests.len(), 2);
        let last_message = requests[1].messages.last().unwrap();
        assert_eq!(last_message.role, MessageRole::Tool);
        assert!(last_message.content.contains("rate"));
    }

    #[tokio::test]
    async fn test_unknown_tool_fails() {
        let provider = MockLlmProvider::new().with_response(tool_call_response("get_weather"));
        let agent = ToolAgent::new(provider, "mock-model");

        let result = agent
            .invoke(vec![Message::user("hi")], SessionConfig::default())
            .await;

        assert!(matches!(result, Err(DomainError::Agent { .. })));
    }

    #[tokio::test]
    async fn test_system_prompt_and_tools_advertised() {
        let provider = MockLlmProvider::new().with_text_response("ok");
        let agent =
            ToolAgent::new(provider, "mock-model").with_tool(Arc::new(BankRateTool::new()));

        agent
            .invoke(vec![Message::user("hi")], SessionConfig::default())
            .await
            .unwrap();

        let requests = agent.provider.recorded_requests();
        let request = &requests[0];

        assert_eq!(request.messages[0].role, MessageRole::System);
        assert!(request.messages[0].content.contains("bank statement analyzer"));
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, "get_bank_rate");
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn test_session_memory_shared_within_thread() {
        let provider = MockLlmProvider::new()
            .with_text_response("First answer")
            .with_text_response("Second answer");
        let agent = ToolAgent::new(provider, "mock-model");
        let session = SessionConfig::new("thread-1");

        agent
            .invoke(vec![Message::user("First question")], session.clone())
            .await
            .unwrap();
        agent
            .invoke(vec![Message::user("Second question")], session)
            .await
            .unwrap();

        let requests = agent.provider.recorded_requests();
        let second = &requests[1];

        let contents: Vec<&str> = second.messages.iter().map(|m| m.content.as_str()).collect();
        assert!(contents.contains(&"First question"));
        assert!(contents.contains(&"First answer"));
        assert!(contents.contains(&"Second question"));
    }

    #[tokio::test]
    async fn test_session_memory_isolated_between_threads() {
        let provider = MockLlmProvider::new()
            .with_text_response("Answer A")
            .with_text_response("Answer B");
        let agent = ToolAgent::new(provider, "mock-model");

        agent
            .invoke(vec![Message::user("Question A")], SessionConfig::new("a"))
            .await
            .unwrap();
        agent
            .invoke(vec![Message::user("Question B")], SessionConfig::new("b"))
            .await
            .unwrap();

        let requests = agent.provider.recorded_requests();
        let second = &requests[1];

        assert!(second.messages.iter().all(|m| m.content != "Question A"));
    }

    #[tokio::test]
    async fn test_session_memory_keeps_early_exchanges_within_capacity() {
        let mut provider = MockLlmProvider::new();
        for i in 0..4 {
            provider = provider.with_text_response(format!("Answer {}", i));
        }
        let agent = ToolAgent::new(provider, "mock-model");
        let session = SessionConfig::new("short-thread");

        for i in 0..4 {
            agent
                .invoke(vec![Message::user(format!("Question {}", i))], session.clone())
                .await
                .unwrap();
        }

        // Three prior exchanges fit well within the five-pair window, so the
        // fourth request still carries the very first one
        let requests = agent.provider.recorded_requests();
        let last = requests.last().unwrap();
        assert!(last.messages.iter().any(|m| m.content == "Question 0"));
        assert!(last.messages.iter().any(|m| m.content == "Answer 0"));
    }

    #[tokio::test]
    async fn test_session_memory_capped_at_five_pairs() {
        let mut provider = MockLlmProvider::new();
        for i in 0..7 {
            provider = provider.with_text_response(format!("Answer {}", i));
        }
        let agent = ToolAgent::new(provider, "mock-model");
        let session = SessionConfig::new("long-thread");

        for i in 0..7 {
            agent
                .invoke(vec![Message::user(format!("Question {}", i))], session.clone())
                .await
                .unwrap();
        }

        // System prompt + at most five remembered pairs + the new user message
        let requests = agent.provider.recorded_requests();
        let last = requests.last().unwrap();
        assert!(last.messages.len() <= 1 + MAX_HISTORY_PAIRS * 2 + 1);

        // The oldest exchange was evicted whole; the next one survives intact
        assert!(last.messages.iter().all(|m| m.content != "Question 0"));
        assert!(last.messages.iter().all(|m| m.content != "Answer 0"));
        assert!(last.messages.iter().any(|m| m.content == "Question 1"));
        assert!(last.messages.iter().any(|m| m.content == "Answer 1"));
    }
}
