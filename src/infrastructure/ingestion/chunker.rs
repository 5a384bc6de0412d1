//! Sentence-based chunking for document ingestion

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::DomainError;

/// Configuration for text chunking
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target maximum chunk size in bytes
    pub chunk_size: usize,
    /// Bytes of trailing text carried into the next chunk
    pub chunk_overlap: usize,
    /// Chunks shorter than this are dropped
    pub min_chunk_size: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            min_chunk_size: 1,
        }
    }

    pub fn with_min_chunk_size(mut self, min_chunk_size: usize) -> Self {
        self.min_chunk_size = min_chunk_size;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("Chunk size must be greater than 0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(
                "Chunk overlap must be smaller than chunk size",
            ));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            min_chunk_size: 1,
        }
    }
}

/// Splits text into chunks along sentence boundaries
#[derive(Debug, Clone, Default)]
pub struct SentenceChunker;

impl SentenceChunker {
    pub fn new() -> Self {
        Self
    }

    fn split_sentences(text: &str) -> Vec<&str> {
        text.unicode_sentences().collect()
    }

    pub fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
        config.validate()?;

        let content = content.trim();

        if content.is_empty() {
            return Ok(vec![]);
        }

        if content.len() <= config.chunk_size {
            return Ok(vec![content.to_string()]);
        }

        let sentences = Self::split_sentences(content);

        let mut chunks = Vec::new();
        let mut current_chunk = String::new();

        for sentence in sentences {
            let sentence = sentence.trim();

            if sentence.is_empty() {
                continue;
            }

            if current_chunk.is_empty() {
                current_chunk.push_str(sentence);
            } else if current_chunk.len() + 1 + sentence.len() <= config.chunk_size {
                current_chunk.push(' ');
                current_chunk.push_str(sentence);
            } else {
                if current_chunk.len() >= config.min_chunk_size {
                    chunks.push(current_chunk.clone());
                }

                if config.chunk_overlap > 0 {
                    // Char-boundary-safe tail of the finished chunk
                    let mut overlap_start =
                        current_chunk.len().saturating_sub(config.chunk_overlap);
                    while !current_chunk.is_char_boundary(overlap_start) {
                        overlap_start += 1;
                    }
                    current_chunk = format!("{} {}", &current_chunk[overlap_start..], sentence);
                } else {
                    current_chunk = sentence.to_string();
                }
            }
        }

        if !current_chunk.is_empty() && current_chunk.len() >= config.min_chunk_size {
            chunks.push(current_chunk);
        }

        if chunks.is_empty() {
            chunks.push(content.to_string());
        }

        Ok(chunks)
    }
}
