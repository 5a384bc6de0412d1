//! Task runners sitting between the HTTP layer and the facade

pub mod kb;

pub use kb::KbTaskRunner;
