//! Gemini client layer: `generateContent` over REST, multi-turn chat and the
//! realtime voice bridge.

pub mod chat;
pub mod error;
pub mod live;
pub mod providers;
pub mod retry;

pub use chat::{catalog_summary, ChatMessage, ChatRole, ChatSession, DEFAULT_THINKING_BUDGET};
pub use error::{GeminiError, GeminiResult};
pub use providers::{
    Candidate, Content, GeminiClient, GeminiConfig, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, GenerativeModel, InlineData, Part,
    ThinkingConfig,
};
pub use retry::{execute_with_retry, RetryConfig, RetryableError};
