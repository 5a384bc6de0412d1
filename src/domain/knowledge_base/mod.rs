//! Knowledge base domain - collections, retrieval, and the store seam

mod entity;
mod store;
mod validation;

pub use entity::{KnowledgeBaseId, RetrievalPreset, RetrievedChunk};
pub use store::KnowledgeBaseStore;
pub use validation::{validate_knowledge_base_id, KnowledgeBaseValidationError};

#[cfg(test)]
pub use store::mock::MockKnowledgeBaseStore;
