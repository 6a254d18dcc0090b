pub mod ollama_client;
pub mod pipeline;
pub mod prompts;
pub mod response;

pub use ollama_client::OllamaClient;
pub use pipeline::LogExtractor;
pub use prompts::ExtractionPromptBuilder;
