//! pgvector knowledge base store implementation

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::knowledge_base::{
    KnowledgeBaseId, KnowledgeBaseStore, RetrievalPreset, RetrievedChunk,
};
use crate::domain::DomainError;
use crate::infrastructure::ingestion::{ChunkingConfig, SentenceChunker};

const KB_TABLE: &str = "knowledge_bases";
const CHUNK_TABLE: &str = "knowledge_base_chunks";

/// pgvector-backed store.
///
/// Collections share two tables: a metadata row per knowledge base and a
/// chunk row per embedded text chunk. Cosine distance drives retrieval;
/// similarity is 1 - distance.
pub struct PgvectorKnowledgeBaseStore<E: EmbeddingProvider> {
    pool: PgPool,
    embedding_provider: E,
    chunker: SentenceChunker,
    chunking: ChunkingConfig,
}

impl<E: EmbeddingProvider> Debug for PgvectorKnowledgeBaseStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgvectorKnowledgeBaseStore")
            .field("embedding_provider", &self.embedding_provider)
            .field("chunking", &self.chunking)
            .finish()
    }
}

impl<E: EmbeddingProvider> PgvectorKnowledgeBaseStore<E> {
    pub fn new(pool: PgPool, embedding_provider: E, chunking: ChunkingConfig) -> Self {
        Self {
            pool,
            embedding_provider,
            chunker: SentenceChunker::new(),
            chunking,
        }
    }

    /// Ensure the pgvector extension and both tables exist
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::store(format!("Failed to create vector extension: {}", e))
            })?;

        let kb_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id VARCHAR(50) PRIMARY KEY,
                dimension INTEGER NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            KB_TABLE
        );

        sqlx::query(&kb_table)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to create {} table: {}", KB_TABLE, e)))?;

        let chunk_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                kb_id VARCHAR(50) NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                doc_id VARCHAR(255) NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding vector({}) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            CHUNK_TABLE,
            KB_TABLE,
            self.embedding_provider.dimensions()
        );

        sqlx::query(&chunk_table)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::store(format!("Failed to create {} table: {}", CHUNK_TABLE, e))
            })?;

        let kb_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_kb_id ON {} (kb_id)",
            CHUNK_TABLE, CHUNK_TABLE
        );

        sqlx::query(&kb_index)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to create kb_id index: {}", e)))?;

        // IVFFlat needs data to build, so a failure here is not fatal
        let vector_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_embedding ON {} USING ivfflat (embedding vector_cosine_ops)",
            CHUNK_TABLE, CHUNK_TABLE
        );
        let _ = sqlx::query(&vector_index).execute(&self.pool).await;

        Ok(())
    }

    async fn collection_exists(&self, id: &KnowledgeBaseId) -> Result<bool, DomainError> {
        let query = format!("SELECT 1 FROM {} WHERE id = $1", KB_TABLE);

        let row = sqlx::query(&query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to look up knowledge base: {}", e)))?;

        Ok(row.is_some())
    }

    fn embedding_to_pgvector(embedding: &[f32]) -> String {
        let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
        format!("[{}]", values.join(","))
    }
}

#[async_trait]
impl<E: EmbeddingProvider + 'static> KnowledgeBaseStore for PgvectorKnowledgeBaseStore<E> {
    fn backend_name(&self) -> &'static str {
        "pgvector"
    }

    async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        let query = format!("SELECT id FROM {} ORDER BY id", KB_TABLE);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to list knowledge bases: {}", e)))?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn create_collection(
        &self,
        id: &KnowledgeBaseId,
        dimension: u32,
    ) -> Result<(), DomainError> {
        if self.collection_exists(id).await? {
            return Err(DomainError::conflict(format!(
                "Knowledge base '{}' already exists",
                id
            )));
        }

        let query = format!(
            "INSERT INTO {} (id, dimension, created_at) VALUES ($1, $2, $3)",
            KB_TABLE
        );

        sqlx::query(&query)
            .bind(id.as_str())
            .bind(dimension as i32)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to create knowledge base: {}", e)))?;

        tracing::info!(kb_id = id.as_str(), dimension, "Created knowledge base");
        Ok(())
    }

    async fn add_document(
        &self,
        kb_id: &KnowledgeBaseId,
        doc_id: &str,
        text: &str,
    ) -> Result<(), DomainError> {
        if !self.collection_exists(kb_id).await? {
            return Err(DomainError::not_found(format!(
                "Knowledge base '{}' does not exist",
                kb_id
            )));
        }

        let chunks = self.chunker.chunk(text, &self.chunking)?;

        if chunks.is_empty() {
            tracing::warn!(kb_id = kb_id.as_str(), doc_id, "Document produced no chunks");
            return Ok(());
        }

        let embeddings = self.embedding_provider.embed(chunks.clone()).await?;

        if embeddings.len() != chunks.len() {
            return Err(DomainError::store("Embedding count mismatch"));
        }

        // Re-adding a document replaces its previous chunks atomically
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::store(format!("Failed to begin transaction: {}", e)))?;

        let delete = format!("DELETE FROM {} WHERE kb_id = $1 AND doc_id = $2", CHUNK_TABLE);
        sqlx::query(&delete)
            .bind(kb_id.as_str())
            .bind(doc_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::store(format!("Failed to clear previous chunks: {}", e)))?;

        for (index, (content, embedding)) in chunks.iter().zip(embeddings.iter()).enumerate() {
            let embedding_str = Self::embedding_to_pgvector(embedding);

            let insert = format!(
                r#"
                INSERT INTO {} (id, kb_id, doc_id, chunk_index, content, embedding)
                VALUES ($1, $2, $3, $4, $5, '{}'::vector)
                "#,
                CHUNK_TABLE, embedding_str
            );

            sqlx::query(&insert)
                .bind(Uuid::new_v4())
                .bind(kb_id.as_str())
                .bind(doc_id)
                .bind(index as i32)
                .bind(content)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::store(format!("Failed to insert chunk: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::store(format!("Failed to commit document: {}", e)))?;

        tracing::info!(
            kb_id = kb_id.as_str(),
            doc_id,
            chunk_count = chunks.len(),
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
        if !self.collection_exists(kb_id).await? {
            return Err(DomainError::not_found(format!(
                "Knowledge base '{}' does not exist",
                kb_id
            )));
        }

        let embeddings = self.embedding_provider.embed(vec![query.to_string()]).await?;
        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::store("Failed to generate query embedding"))?;

        let embedding_str = Self::embedding_to_pgvector(&query_embedding);

        let sql = format!(
            r#"
            SELECT doc_id, content, embedding <=> '{}' AS distance
            FROM {}
            WHERE kb_id = $1
            ORDER BY distance
            LIMIT {}
            "#,
            embedding_str,
            CHUNK_TABLE,
            preset.top_k()
        );

        let rows = sqlx::query(&sql)
            .bind(kb_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(kb_id = kb_id.as_str(), error = %e, "Query failed");
                DomainError::store(format!("Query failed: {}", e))
            })?;

        let min_score = preset.min_score();
        let mut results = Vec::with_capacity(rows.len());

        for row in rows {
            let doc_id: String = row.get("doc_id");
            let content: String = row.get("content");
            let distance: f64 = row.get("distance");
            let score = (1.0 - distance) as f32;

            if score < min_score {
                continue;
            }

            results.push(RetrievedChunk::new(doc_id, content, score));
        }

        tracing::debug!(
            kb_id = kb_id.as_str(),
            results = results.len(),
            "Query completed"
        );
        Ok(results)
    }
}
