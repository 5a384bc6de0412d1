//! HTTP API layer

pub mod chat;
pub mod health;
pub mod knowledge_bases;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;
