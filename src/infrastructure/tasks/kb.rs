//! Knowledge base task runner
//!
//! Implements the four named tasks behind the HTTP layer: kb-create, kb-get,
//! kb-upload, and kb-query. Every failure below this layer is shaped into the
//! task's output record; transient failures are retried with backoff first.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::agent::{ChatAgent, SessionConfig};
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::llm::Message;
use crate::domain::tasks::{
    KbCreateOutput, KbCreateRequest, KbListOutput, KbQueryOutput, KbQueryRequest, KbTaskService,
    KbUploadOutput, KbUploadRequest, RetryConfig,
};
use crate::domain::DomainError;
use crate::infrastructure::rag::RagClient;

#[derive(Debug)]
pub struct KbTaskRunner {
    rag: RagClient,
    agent: Arc<dyn ChatAgent>,
    retry: RetryConfig,
}

impl KbTaskRunner {
    pub fn new(rag: RagClient, agent: Arc<dyn ChatAgent>) -> Self {
        Self {
            rag,
            agent,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Run an operation, retrying transient failures with backoff
    async fn with_retry<T, F, Fut>(&self, task: &str, mut op: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        task,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn upload_inner(&self, request: &KbUploadRequest) -> Result<String, DomainError> {
        let kb_id = KnowledgeBaseId::new(&request.kb_id)?;
        let path = Path::new(&request.file_path);

        let rag = self.rag.clone();
        let kb = kb_id.clone();
        let path_buf = path.to_path_buf();
        self.with_retry("kb-upload", move || {
            let rag = rag.clone();
            let kb = kb.clone();
            let path = path_buf.clone();
            async move { rag.ingest_file(&kb, &path).await }
        })
        .await
    }

    async fn query_inner(&self, request: &KbQueryRequest) -> Result<String, DomainError> {
        let kb_id = KnowledgeBaseId::new(&request.kb_id)?;

        let rag = self.rag.clone();
        let kb = kb_id.clone();
        let query = request.query.clone();
        let chunks = self
            .with_retry("kb-query", move || {
                let rag = rag.clone();
                let kb = kb.clone();
                let query = query.clone();
                async move { rag.query(&kb, &query).await }
            })
            .await?;

        // The agent is invoked even with empty context; it can still answer
        // from conversation history or say it found nothing
        let context = RagClient::format_context(&chunks)?;
        let prompt = format!("Context:\n{}\n\nQuestion: {}", context, request.query);

        let thread_id = request
            .thread_id
            .clone()
            .unwrap_or_else(|| "default".to_string());

        let agent = self.agent.clone();
        self.with_retry("kb-query", move || {
            let agent = agent.clone();
            let prompt = prompt.clone();
            let thread_id = thread_id.clone();
            async move {
                agent
                    .invoke(vec![Message::user(prompt)], SessionConfig::new(thread_id))
                    .await
            }
        })
        .await
    }
}

#[async_trait]
impl KbTaskService for KbTaskRunner {
    async fn kb_create(&self, request: KbCreateRequest) -> KbCreateOutput {
        let kb_id = match KnowledgeBaseId::new(&request.kb_id) {
            Ok(id) => id,
            Err(error) => {
                tracing::error!(kb_id = %request.kb_id, %error, "Knowledge base creation rejected");
                return KbCreateOutput::failure(request.kb_id, error.to_string());
            }
        };

        let rag = self.rag.clone();
        let kb = kb_id.clone();
        let result = self
            .with_retry("kb-create", move || {
                let rag = rag.clone();
                let kb = kb.clone();
                async move { rag.create(&kb).await }
            })
            .await;

        match result {
            Ok(()) => KbCreateOutput::success(request.kb_id),
            Err(error) => {
                tracing::error!(kb_id = kb_id.as_str(), %error, "Knowledge base creation failed");
                KbCreateOutput::failure(request.kb_id, error.to_string())
            }
        }
    }

    async fn kb_get(&self) -> KbListOutput {
        KbListOutput::success(self.rag.list().await)
    }

    async fn kb_upload(&self, request: KbUploadRequest) -> KbUploadOutput {
        let result = self.upload_inner(&request).await;

        // The staged file is removed exactly once, on success and on failure
        if let Err(error) = tokio::fs::remove_file(&request.file_path).await {
            tracing::warn!(path = %request.file_path, %error, "Failed to remove staged file");
        }

        match result {
            Ok(doc_id) => KbUploadOutput::success(doc_id),
            Err(error) => {
                tracing::error!(kb_id = %request.kb_id, %error, "Upload failed");
                KbUploadOutput::failure(error.to_string())
            }
        }
    }

    async fn kb_query(&self, request: KbQueryRequest) -> KbQueryOutput {
        match self.query_inner(&request).await {
            Ok(response) => KbQueryOutput::success(response),
            Err(error) => {
                tracing::error!(kb_id = %request.kb_id, %error, "Query failed");
                KbQueryOutput::failure(error.to_string())
            }
        }
    }
}
