//! Chat agent implementation and built-in tools

pub mod tool_agent;
pub mod tools;

pub use tool_agent::ToolAgent;
pub use tools::BankRateTool;
