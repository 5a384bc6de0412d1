//! Store construction from configuration

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPool;

use crate::config::{AppConfig, StoreBackend};
use crate::domain::knowledge_base::KnowledgeBaseStore;
use crate::domain::DomainError;
use crate::infrastructure::embedding::OpenAiEmbeddingProvider;
use crate::infrastructure::ingestion::ChunkingConfig;
use crate::infrastructure::llm::HttpClient;

use super::in_memory::InMemoryKnowledgeBaseStore;
use super::pgvector::PgvectorKnowledgeBaseStore;

/// Build the configured knowledge base store backend
pub async fn build_store(config: &AppConfig) -> Result<Arc<dyn KnowledgeBaseStore>, DomainError> {
    let chunking = ChunkingConfig::new(config.store.chunk_size, config.store.chunk_overlap);

    match config.store.backend {
        StoreBackend::InMemory => {
            tracing::info!("Using in-memory knowledge base store");
            Ok(Arc::new(InMemoryKnowledgeBaseStore::new(chunking)))
        }
        StoreBackend::Pgvector => {
            let database_url = config.store.database_url.as_deref().ok_or_else(|| {
                DomainError::configuration(
                    "store.database_url is required for the pgvector backend",
                )
            })?;

            let pool = PgPool::connect(database_url).await.map_err(|e| {
                DomainError::store(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

            let http_client =
                HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?;
            let api_key = config.llm.api_key()?;

            let embedding_provider = match config.llm.base_url.as_deref() {
                Some(base_url) => OpenAiEmbeddingProvider::with_base_url(
                    http_client,
                    api_key,
                    &config.llm.embedding_model,
                    config.store.embedding_dimension,
                    base_url,
                ),
                None => OpenAiEmbeddingProvider::new(
                    http_client,
                    api_key,
                    &config.llm.embedding_model,
                    config.store.embedding_dimension,
                ),
            };

            let store = PgvectorKnowledgeBaseStore::new(pool, embedding_provider, chunking);
            store.ensure_schema().await?;

            tracing::info!("Using pgvector knowledge base store");
            Ok(Arc::new(store))
        }
    }
}
