//! Document ingestion - PDF extraction and chunking

pub mod chunker;
pub mod pdf;

pub use chunker::{ChunkingConfig, SentenceChunker};
pub use pdf::extract_pdf_text;
