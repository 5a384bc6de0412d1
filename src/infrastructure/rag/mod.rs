//! RAG facade

pub mod client;

pub use client::RagClient;
