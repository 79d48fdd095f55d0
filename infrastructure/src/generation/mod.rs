//! Generation backend adapters

mod openai;

pub use openai::OpenAiChatBackend;
