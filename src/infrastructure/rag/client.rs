//! Retrieval facade over the knowledge base store

use std::path::Path;
use std::sync::Arc;

use crate::domain::knowledge_base::{
    KnowledgeBaseId, KnowledgeBaseStore, RetrievalPreset, RetrievedChunk,
};
use crate::domain::DomainError;
use crate::infrastructure::ingestion::extract_pdf_text;

/// High-level entry point for knowledge base operations.
///
/// Wraps the configured store backend with ingestion and context formatting
/// so callers never touch chunking, embedding, or retrieval mechanics.
#[derive(Debug, Clone)]
pub struct RagClient {
    store: Arc<dyn KnowledgeBaseStore>,
    dimension: u32,
    preset: RetrievalPreset,
}

impl RagClient {
    pub fn new(store: Arc<dyn KnowledgeBaseStore>, dimension: u32, preset: RetrievalPreset) -> Self {
        Self {
            store,
            dimension,
            preset,
        }
    }

    /// List existing knowledge base ids.
    ///
    /// A store failure logs a warning and yields an empty list; listing is
    /// best-effort.
    pub async fn list(&self) -> Vec<String> {
        match self.store.list_collections().await {
            Ok(ids) => ids,
            Err(error) => {
                tracing::warn!(%error, backend = self.store.backend_name(), "Failed to list knowledge bases");
                Vec::new()
            }
        }
    }

    /// Create a knowledge base with the configured embedding dimension
    pub async fn create(&self, kb_id: &KnowledgeBaseId) -> Result<(), DomainError> {
        self.store.create_collection(kb_id, self.dimension).await
    }

    /// Extract a PDF's text and add it to the knowledge base.
    ///
    /// The document id is the staged file's name with its staging prefix
    /// stripped, so re-uploading the same file replaces the earlier version.
    pub async fn ingest_file(
        &self,
        kb_id: &KnowledgeBaseId,
        path: &Path,
    ) -> Result<String, DomainError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DomainError::validation("File path has no usable file name"))?;

        let doc_id = strip_staging_prefix(file_name);
        let text = extract_pdf_text(path)?;

        self.store.add_document(kb_id, doc_id, &text).await?;
        Ok(doc_id.to_string())
    }

    /// Retrieve chunks relevant to the query, most relevant first
    pub async fn query(
        &self,
        kb_id: &KnowledgeBaseId,
        query: &str,
    ) -> Result<Vec<RetrievedChunk>, DomainError> {
        self.store.query(kb_id, query, self.preset).await
    }

    /// Render retrieved chunks into the context block handed to the agent.
    ///
    /// One line per chunk, in retrieval order, numbered from 1.
    pub fn format_context(chunks: &[RetrievedChunk]) -> Result<String, DomainError> {
        let mut lines = Vec::with_capacity(chunks.len());

        for (i, chunk) in chunks.iter().enumerate() {
            if chunk.doc_id.is_empty() {
                return Err(DomainError::validation(format!(
                    "Chunk {} has an empty document id",
                    i + 1
                )));
            }
            lines.push(format!(
                "Document {} (ID: {}): {}",
                i + 1,
                chunk.doc_id,
                chunk.content
            ));
        }

        Ok(lines.join("\n"))
    }
}

/// Staged uploads are named `{uuid}_{original name}`; the document id is the
/// original name. A name without the prefix passes through unchanged.
fn strip_staging_prefix(file_name: &str) -> &str {
    match file_name.split_once('_') {
        Some((prefix, rest)) if !rest.is_empty() && uuid::Uuid::parse_str(prefix).is_ok() => rest,
        _ => file_name,
    }
}
