use async_trait::async_trait;
use parking_lot::Mutex;

use plotgod_core::errors::LlmError;
use plotgod_core::provider::PrepGenerator;

/// Canned generator for tests: returns a fixed reply or a fixed error, and
/// records every user prompt it was asked to complete.
pub struct MockPrep {
    reply: Result<String, LlmError>,
    prompts: Mutex<Vec<String>>,
}

impl MockPrep {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: LlmError) -> Self {
        Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// User prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl PrepGenerator for MockPrep {
    async fn generate(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().push(user_prompt.to_string());
        self.reply.clone()
    }
}
