//! Knowledge base store backends

pub mod factory;
pub mod in_memory;
pub mod pgvector;

pub use factory::build_store;
pub use in_memory::InMemoryKnowledgeBaseStore;
pub use pgvector::PgvectorKnowledgeBaseStore;
