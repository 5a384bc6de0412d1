//! Built-in agent tools

use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};

use crate::domain::agent::Tool;
use crate::domain::llm::ToolDefinition;
use crate::domain::DomainError;

/// Looks up the current bank FX rate for a currency code.
///
/// The rate is sampled uniformly from [0, 1) and rounded to three decimals;
/// a stand-in for a real rates feed.
#[derive(Debug, Clone, Default)]
pub struct BankRateTool;

impl BankRateTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for BankRateTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "get_bank_rate",
            "Get current bank rate",
            json!({
                "type": "object",
                "properties": {
                    "fx": {
                        "type": "string",
                        "description": "Currency code to look up the rate for"
                    }
                },
                "required": ["fx"]
            }),
        )
    }

    async fn call(&self, _arguments: Value) -> Result<Value, DomainError> {
        let rate = (rand::thread_rng().gen_range(0.0_f64..1.0) * 1000.0).round() / 1000.0;
        Ok(json!({ "rate": rate }))
    }
}
