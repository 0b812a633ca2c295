use async_trait::async_trait;

use crate::core::errors::AgentError;

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// provider name (e.g. "ollama")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, AgentError>;

    /// single-turn completion (non-streaming)
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AgentError>;
}
