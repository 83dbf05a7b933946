pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{CompletionProvider, CompletionRequest, ProviderError};
pub use providers::{DEFAULT_OPENAI_BASE_URL, OpenAiProvider};
pub use types::{Completion, Message, Role, Usage};
