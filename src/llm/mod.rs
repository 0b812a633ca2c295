//! Generation provider abstraction and prompt assembly.

mod ollama;
mod prompt;
mod provider;

pub use ollama::OllamaProvider;
pub use prompt::{build_prompt, context_block};
pub use provider::{GenerationProvider, GenerationRequest};
