use crate::Result;

/// Completed text from a generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub content: String,
}

/// A text-generation model. Implementations enforce their own timeout and
/// report timeouts and non-success responses as errors.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation>;
}
