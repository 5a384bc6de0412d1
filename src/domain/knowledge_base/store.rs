//! Knowledge base store trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{KnowledgeBaseId, RetrievalPreset, RetrievedChunk};
use crate::domain::error::DomainError;

/// Store trait for knowledge base operations.
///
/// Implementations own persistence, chunking, and embedding for their backend
/// and translate between this interface and backend-specific operations. One
/// knowledge base id maps to exactly one underlying collection.
#[async_trait]
pub trait KnowledgeBaseStore: Send + Sync + Debug {
    /// Backend name, for logging and diagnostics
    fn backend_name(&self) -> &'static str;

    /// List the ids of all existing collections
    async fn list_collections(&self) -> Result<Vec<String>, DomainError>;

    /// Create a new collection with the given embedding dimension.
    ///
    /// Fails with a conflict if the id already names a collection.
    async fn create_collection(
        &self,
        id: &KnowledgeBaseId,
        dimension: u32,
    ) -> Result<(), DomainError>;

    /// Add a document's text to the named collection.
    ///
    /// The store chunks and embeds as its backend requires. Re-adding an
    /// existing document id replaces the previous content.
    async fn add_document(
        &self,
        kb_id: &KnowledgeBaseId,
        doc_id: &str,
        text: &str,
    ) -> Result<(), DomainError>;

    /// Query the named collection for chunks relevant to the query text,
    /// under the given retrieval preset. Results are ordered most relevant
    /// first.
    async fn query(
        &self,
        kb_id: &KnowledgeBaseId,
        query: &str,
        preset: RetrievalPreset,
    ) -> Result<Vec<RetrievedChunk>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    /// Mock store for testing the facade and task layers
    #[derive(Debug, Default)]
    pub struct MockKnowledgeBaseStore {
        collections: RwLock<HashMap<String, Vec<(String, String)>>>,
        fixed_query_results: RwLock<Option<Vec<RetrievedChunk>>>,
        query_count: AtomicUsize,
        fail_with: RwLock<Option<String>>,
    }

    impl MockKnowledgeBaseStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Return these chunks from every query, regardless of content
        pub async fn set_query_results(&self, chunks: Vec<RetrievedChunk>) {
            *self.fixed_query_results.write().await = Some(chunks);
        }

        /// Make every operation fail with a store error
        pub async fn set_fail_with(&self, message: impl Into<String>) {
            *self.fail_with.write().await = Some(message.into());
        }

        pub async fn clear_failure(&self) {
            *self.fail_with.write().await = None;
        }

        pub fn query_count(&self) -> usize {
            self.query_count.load(Ordering::SeqCst)
        }

        pub async fn document_count(&self, kb_id: &str) -> usize {
            self.collections
                .read()
                .await
                .get(kb_id)
                .map(|docs| docs.len())
                .unwrap_or(0)
        }

        async fn check_failure(&self) -> Result<(), DomainError> {
            if let Some(message) = self.fail_with.read().await.as_ref() {
                return Err(DomainError::store(message.clone()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KnowledgeBaseStore for MockKnowledgeBaseStore {
        fn backend_name(&self) -> &'static str {
            "mock"
        }

        async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
            self.check_failure().await?;
            let mut ids: Vec<String> = self.collections.read().await.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        }

        async fn create_collection(
            &self,
            id: &KnowledgeBaseId,
            _dimension: u32,
        ) -> Result<(), DomainError> {
            self.check_failure().await?;
            let mut collections = self.collections.write().await;
            if collections.contains_key(id.as_str()) {
                return Err(DomainError::conflict(format!(
                    "Knowledge base '{}' already exists",
                    id
                )));
            }
            collections.insert(id.as_str().to_string(), Vec::new());
            Ok(())
        }

        async fn add_document(
            &self,
            kb_id: &KnowledgeBaseId,
            doc_id: &str,
            text: &str,
        ) -> Result<(), DomainError> {
            self.check_failure().await?;
            let mut collections = self.collections.write().await;
            let docs = collections.get_mut(kb_id.as_str()).ok_or_else(|| {
                DomainError::not_found(format!("Knowledge base '{}' does not exist", kb_id))
            })?;
            docs.retain(|(id, _)| id != doc_id);
            docs.push((doc_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn query(
            &self,
            kb_id: &KnowledgeBaseId,
            query: &str,
            preset: RetrievalPreset,
        ) -> Result<Vec<RetrievedChunk>, DomainError> {
            self.query_count.fetch_add(1, Ordering::SeqCst);
            self.check_failure().await?;

            if let Some(fixed) = self.fixed_query_results.read().await.as_ref() {
                return Ok(fixed.iter().take(preset.top_k()).cloned().collect());
            }

            let collections = self.collections.read().await;
            let docs = collections.get(kb_id.as_str()).ok_or_else(|| {
                DomainError::not_found(format!("Knowledge base '{}' does not exist", kb_id))
            })?;

            let query_lower = query.to_lowercase();
            Ok(docs
                .iter()
                .filter(|(_, text)| text.to_lowercase().contains(&query_lower))
                .take(preset.top_k())
                .map(|(id, text)| RetrievedChunk::new(id, text, 1.0))
                .collect())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_create_add_query() {
            let store = MockKnowledgeBaseStore::new();
            let kb_id = KnowledgeBaseId::new("test-kb").unwrap();

            store.create_collection(&kb_id, 1024).await.unwrap();
            store
                .add_document(&kb_id, "report.pdf", "Total yield: 4.2%")
                .await
                .unwrap();

            let chunks = store
                .query(&kb_id, "yield", RetrievalPreset::Balanced)
                .await
                .unwrap();

            assert_eq!(chunks.len(), 1);
            assert_eq!(chunks[0].doc_id, "report.pdf");
            assert_eq!(store.query_count(), 1);
        }

        #[tokio::test]
        async fn test_mock_duplicate_create_conflicts() {
            let store = MockKnowledgeBaseStore::new();
            let kb_id = KnowledgeBaseId::new("test-kb").unwrap();

            store.create_collection(&kb_id, 1024).await.unwrap();
            let err = store.create_collection(&kb_id, 1024).await.unwrap_err();
            assert!(matches!(err, DomainError::Conflict { .. }));
        }

        #[tokio::test]
        async fn test_mock_failure_injection() {
            let store = MockKnowledgeBaseStore::new();
            store.set_fail_with("backend down").await;

            let result = store.list_collections().await;
            assert!(matches!(result, Err(DomainError::Store { .. })));
        }
    }
}
