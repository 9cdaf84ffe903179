//! AI features powered by a chat-completion API

pub mod assessment;
pub mod client;

pub use assessment::{ERROR_PREFIX, assess};
pub use client::{Completer, CompletionError, OpenAiClient};
