//! KB Gateway API
//!
//! A backend for named knowledge bases with:
//! - PDF upload and chunked ingestion
//! - Relevance-based retrieval over in-memory or pgvector storage
//! - A tool-calling chat agent answering questions over retrieved context

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::AppState;
use domain::knowledge_base::RetrievalPreset;
use domain::DomainError;
use infrastructure::agent::{BankRateTool, ToolAgent};
use infrastructure::knowledge_base::build_store;
use infrastructure::llm::{HttpClient, OpenAiProvider};
use infrastructure::rag::RagClient;
use infrastructure::tasks::KbTaskRunner;

/// Wire the application state from configuration.
///
/// Builds the store backend, the retrieval facade, the tool-calling agent,
/// and the task layer that ties them together.
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, DomainError> {
    let store = build_store(config).await?;
    let preset: RetrievalPreset = config.retrieval.preset.parse()?;
    let rag = RagClient::new(store, config.store.embedding_dimension, preset);

    let http_client = HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?;
    let api_key = config.llm.api_key()?;
    let provider = match &config.llm.base_url {
        Some(base_url) => OpenAiProvider::with_base_url(http_client, api_key, base_url),
        None => OpenAiProvider::new(http_client, api_key),
    };

    let agent = ToolAgent::new(provider, config.llm.model.clone())
        .with_tool(Arc::new(BankRateTool::new()));

    let tasks = KbTaskRunner::new(rag, Arc::new(agent));

    Ok(AppState::new(Arc::new(tasks), &config.staging.dir))
}
