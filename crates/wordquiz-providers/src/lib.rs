//! wordquiz-providers: Text-generation backends.
//!
//! Implements the `TextGenerator` trait for Google Gemini and
//! OpenAI-compatible chat APIs, plus a mock backend for tests.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, ProviderConfig, WordquizConfig};
pub use error::ProviderError;
