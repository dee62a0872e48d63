pub mod connection;
pub mod endpoints;

pub use connection::{ApiConnectionError, ChatBackend, ChatClient};
pub use endpoints::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Provider};
