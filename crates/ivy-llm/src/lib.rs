pub mod openai;
pub mod provider;
pub mod types;

pub use openai::OpenAIProvider;
pub use provider::{LLMError, LLMProvider, LLMStream};
pub use types::LLMChunk;
