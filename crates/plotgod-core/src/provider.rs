use async_trait::async_trait;

use crate::errors::LlmError;

/// Abstraction over the generative-text service that turns a session
/// transcript into prep material. The server depends on this trait only; the
/// concrete HTTP client lives in `plotgod-llm`.
#[async_trait]
pub trait PrepGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}
