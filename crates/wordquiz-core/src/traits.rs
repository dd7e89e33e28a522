//! Core trait definitions for text-generation backends and presenters.
//!
//! `TextGenerator` is implemented by the `wordquiz-providers` crate;
//! `Presenter` by whatever shell drives the quiz (the CLI uses stdin/stdout).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Text generation backend
// ---------------------------------------------------------------------------

/// Trait for LLM backends that turn a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate text for a prompt.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List models this provider is known to serve.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to generate text from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-2.5-pro").
    pub model: String,
    /// The main prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response text.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

/// Default system prompt for vocabulary generation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a vocabulary tutor for Japanese learners of English. Reply ONLY with the requested list, one pair per line. No numbering, no headings, no explanations.";

// ---------------------------------------------------------------------------
// Presentation boundary
// ---------------------------------------------------------------------------

/// Something that can show text to the user and read a line back.
pub trait Presenter {
    /// Display a block of text.
    fn show(&mut self, text: &str) -> anyhow::Result<()>;

    /// Show `prompt` and read one line of input.
    ///
    /// Returns `Ok(None)` once the input is closed.
    fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}
