pub mod base;
pub mod errors;
pub mod mock;
pub mod ollama;
pub mod utils;

pub use base::{ChatProvider, ChatResponse, GenerationOptions};
pub use errors::ProviderError;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
