use serde::{Deserialize, Serialize};

/// Body of a streaming chat-completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User prompt; for meal plans a JSON-encoded parameter object
    pub message: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, max_tokens: u32, temperature: f64) -> Self {
        Self {
            message: message.into(),
            max_tokens,
            temperature,
        }
    }
}
