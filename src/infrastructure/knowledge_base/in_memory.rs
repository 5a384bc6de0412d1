//! In-memory knowledge base store for development and testing

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::knowledge_base::{
    KnowledgeBaseId, KnowledgeBaseStore, RetrievalPreset, RetrievedChunk,
};
use crate::domain::DomainError;
use crate::infrastructure::ingestion::{ChunkingConfig, SentenceChunker};

/// In-memory store for development without PostgreSQL.
///
/// Retrieval scores chunks by term overlap with the query instead of vector
/// similarity; good enough to exercise the full pipeline locally.
#[derive(Debug)]
pub struct InMemoryKnowledgeBaseStore {
    collections: RwLock<HashMap<String, Collection>>,
    chunker: SentenceChunker,
    chunking: ChunkingConfig,
}

#[derive(Debug)]
struct Collection {
    #[allow(dead_code)]
    dimension: u32,
    chunks: Vec<StoredChunk>,
}

#[derive(Debug, Clone)]
struct StoredChunk {
    doc_id: String,
    content: String,
}

impl InMemoryKnowledgeBaseStore {
    pub fn new(chunking: ChunkingConfig) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            chunker: SentenceChunker::new(),
            chunking,
        }
    }

    fn terms(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect()
    }

    /// Fraction of query terms present in the chunk
    fn score(query_terms: &HashSet<String>, content: &str) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }
        let chunk_terms = Self::terms(content);
        let overlap = query_terms.intersection(&chunk_terms).count();
        overlap as f32 / query_terms.len() as f32
    }
}

impl Default for InMemoryKnowledgeBaseStore {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

#[async_trait]
impl KnowledgeBaseStore for InMemoryKnowledgeBaseStore {
    fn backend_name(&self) -> &'static str {
        "in_memory"
    }

    async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        let mut ids: Vec<String> = self.collections.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn create_collection(
        &self,
        id: &KnowledgeBaseId,
        dimension: u32,
    ) -> Result<(), DomainError> {
        let mut collections = self.collections.write().await;

        if collections.contains_key(id.as_str()) {
            return Err(DomainError::conflict(format!(
                "Knowledge base '{}' already exists",
                id
            )));
        }

        collections.insert(
            id.as_str().to_string(),
            Collection {
                dimension,
                chunks: Vec::new(),
            },
        );

        tracing::info!(kb_id = id.as_str(), dimension, "Created knowledge base");
        Ok(())
    }

    async fn add_document(
        &self,
        kb_id: &KnowledgeBaseId,
        doc_id: &str,
        text: &str,
    ) -> Result<(), DomainError> {
        let chunks = self.chunker.chunk(text, &self.chunking)?;

        let mut collections = self.collections.write().await;
        let collection = collections.get_mut(kb_id.as_str()).ok_or_else(|| {
            DomainError::not_found(format!("Knowledge base '{}' does not exist", kb_id))
        })?;

        // Re-adding a document replaces its previous chunks
        collection.chunks.retain(|c| c.doc_id != doc_id);
        collection.chunks.extend(chunks.into_iter().map(|content| StoredChunk {
            doc_id: doc_id.to_string(),
            content,
        }));

        tracing::info!(
            kb_id = kb_id.as_str(),
            doc_id,
            chunk_count = collection.chunks.iter().filter(|c| c.doc_id == doc_id).count(),
            "Added document"
        );
        Ok(())
    }

    async fn query(
        &self,
        kb_id: &KnowledgeBaseId,
        query: &str,
        preset: RetrievalPreset,
    ) -> Result<Vec<RetrievedChunk>, DomainError> {
        let collections = self.collections.read().await;
        let collection = collections.get(kb_id.as_str()).ok_or_else(|| {
            DomainError::not_found(format!("Knowledge base '{}' does not exist", kb_id))
        })?;

        let query_terms = Self::terms(query);
        let min_score = preset.min_score();

        let mut scored: Vec<RetrievedChunk> = collection
            .chunks
            .iter()
            .map(|c| RetrievedChunk::new(&c.doc_id, &c.content, Self::score(&query_terms, &c.content)))
            .filter(|c| c.score > 0.0 && c.score >= min_score)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(preset.top_k());

        Ok(scored)
    }
}
