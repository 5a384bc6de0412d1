//! Infrastructure layer - concrete implementations of the domain seams

pub mod agent;
pub mod embedding;
pub mod ingestion;
pub mod knowledge_base;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod tasks;
