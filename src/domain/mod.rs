//! Domain layer - core types, traits, and errors

pub mod agent;
pub mod embedding;
pub mod error;
pub mod knowledge_base;
pub mod llm;
pub mod tasks;

pub use error::DomainError;
