//! quizforge-providers — LLM completion clients.
//!
//! Implements the `LlmProvider` trait for OpenAI-compatible services
//! (Together AI, OpenAI) plus an offline mock, and loads the configuration
//! that selects between them.

pub mod config;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, ProviderConfig, QuizforgeConfig};
pub use quizforge_core::error::ProviderError;
