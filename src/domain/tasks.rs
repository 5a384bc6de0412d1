//! Task layer records - typed inputs and uniform success/error outputs
//!
//! Each facade operation is exposed as a named task. Task outputs carry
//! either a success payload or an error message, never both; errors raised
//! below the task boundary are reshaped into these records instead of
//! propagating.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Input for the `kb-create` task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbCreateRequest {
    pub kb_id: String,
}

/// Output of the `kb-create` task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbCreateOutput {
    pub message: String,
    pub kb_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KbCreateOutput {
    pub fn success(kb_id: impl Into<String>) -> Self {
        Self {
            message: "Knowledge base created successfully.".to_string(),
            kb_id: kb_id.into(),
            error: None,
        }
    }

    pub fn failure(kb_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: "Failed to create knowledge base.".to_string(),
            kb_id: kb_id.into(),
            error: Some(error.into()),
        }
    }
}

/// Output of the `kb-get` task.
///
/// Listing is best-effort: store failures degrade to an empty result, so
/// unlike the other outputs there is no error-shaped variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbListOutput {
    pub message: String,
    pub knowledge_bases: Vec<String>,
}

impl KbListOutput {
    pub fn success(knowledge_bases: Vec<String>) -> Self {
        Self {
            message: "Knowledge bases fetched successfully.".to_string(),
            knowledge_bases,
        }
    }
}

/// Input for the `kb-upload` task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbUploadRequest {
    pub kb_id: String,
    /// Path to the staged file; the task owns its removal
    pub file_path: String,
}

/// Output of the `kb-upload` task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbUploadOutput {
    pub filename: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KbUploadOutput {
    pub fn success(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            message: "File uploaded successfully.".to_string(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            filename: String::new(),
            message: "Unable to upload to knowledge base.".to_string(),
            error: Some(error.into()),
        }
    }
}

/// Input for the `kb-query` task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbQueryRequest {
    pub kb_id: String,
    pub query: String,
    /// Scopes agent conversation memory; requests sharing a thread id share
    /// history
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Output of the `kb-query` task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbQueryOutput {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KbQueryOutput {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            response: String::new(),
            error: Some(error.into()),
        }
    }
}

/// The named tasks the HTTP layer dispatches to.
///
/// Implementations absorb all failures into the output records; these
/// methods never return errors.
#[async_trait]
pub trait KbTaskService: Send + Sync + Debug {
    async fn kb_create(&self, request: KbCreateRequest) -> KbCreateOutput;

    async fn kb_get(&self) -> KbListOutput;

    async fn kb_upload(&self, request: KbUploadRequest) -> KbUploadOutput;

    async fn kb_query(&self, request: KbQueryRequest) -> KbQueryOutput;
}

/// Bounded retry policy for transient failures inside a task.
///
/// Stands in for the at-least-once policy a durable-execution engine would
/// apply between task invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial try
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 100,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// No retries; every failure is final
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay before the given retry attempt (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> std::time::Duration {
        let ms = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        std::time::Duration::from_millis(ms as u64)
    }
}
