use crate::error::RequestError;
use crate::generation::{GenerationConfig, Model};

/// Everything a responder sees: the prompt and the parameters as they were
/// when the prompt was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRequest {
    pub prompt: String,
    pub model: Model,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ResponseRequest {
    pub fn new(prompt: impl Into<String>, config: &GenerationConfig) -> Self {
        Self {
            prompt: prompt.into(),
            model: config.model(),
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
        }
    }
}

pub trait Responder: Send + Sync {
    fn respond(&self, request: &ResponseRequest) -> Result<String, RequestError>;
}

/// Local stand-in for a generation backend. Never touches the network and
/// never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResponder;

impl Responder for EchoResponder {
    fn respond(&self, request: &ResponseRequest) -> Result<String, RequestError> {
        Ok(format!(
            "Echo: {}\n(Model: {}, Temp: {}, MaxTokens: {})",
            request.prompt, request.model, request.temperature, request.max_tokens
        ))
    }
}
