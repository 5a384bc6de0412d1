//! Embedding provider seam

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for embedding providers (to generate embeddings from text)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate embeddings for the given texts, one vector per input, in order
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Embedding dimensions this provider produces
    fn dimensions(&self) -> u32;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Mock provider producing deterministic fixed-dimension vectors
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: u32,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: u32) -> Self {
            Self { dimensions }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError> {
            Ok(texts
                .iter()
                .map(|text| {
                    // Stable per-text vector derived from byte sums
                    let seed = text.bytes().map(|b| b as f32).sum::<f32>();
                    (0..self.dimensions)
                        .map(|i| ((seed + i as f32) % 97.0) / 97.0)
                        .collect()
                })
                .collect())
        }

        fn dimensions(&self) -> u32 {
            self.dimensions
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_embedding_shape() {
            let provider = MockEmbeddingProvider::new(8);
            let vectors = provider
                .embed(vec!["one".to_string(), "two".to_string()])
                .await
                .unwrap();

            assert_eq!(vectors.len(), 2);
            assert_eq!(vectors[0].len(), 8);
        }
    }
}
