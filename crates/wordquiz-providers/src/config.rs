//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wordquiz_core::generator::GeneratorConfig;
use wordquiz_core::traits::TextGenerator;

use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

impl ProviderConfig {
    pub fn api_key(&self) -> &str {
        match self {
            ProviderConfig::Gemini { api_key, .. } | ProviderConfig::OpenAI { api_key, .. } => {
                api_key
            }
        }
    }

    /// Whether a usable key is present.
    pub fn has_api_key(&self) -> bool {
        !self.api_key().trim().is_empty()
    }

    /// Replace the key, e.g. with one typed in at the prompt.
    pub fn set_api_key(&mut self, key: &str) {
        match self {
            ProviderConfig::Gemini { api_key, .. } | ProviderConfig::OpenAI { api_key, .. } => {
                *api_key = key.trim().to_string();
            }
        }
    }

    /// An entry with no key, for a provider name the config does not mention.
    pub fn empty_for(name: &str) -> Option<Self> {
        match name {
            "gemini" => Some(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            }),
            "openai" => Some(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
            }),
            _ => None,
        }
    }
}

/// Top-level wordquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordquizConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for question generation.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Max output tokens for question generation.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Where CSV results are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-pro".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./wordquiz-results")
}

impl Default for WordquizConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            output_dir: default_output_dir(),
        }
    }
}

impl WordquizConfig {
    /// Generation settings for the given model.
    pub fn generator_config(&self, model: &str) -> GeneratorConfig {
        GeneratorConfig {
            model: model.to_string(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            system_prompt_override: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::OpenAI { api_key, base_url } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `wordquiz.toml` in the current directory
/// 2. `~/.config/wordquiz/config.toml`
///
/// Environment variable overrides: `WORDQUIZ_GEMINI_KEY`, `WORDQUIZ_OPENAI_KEY`.
pub fn load_config() -> Result<WordquizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<WordquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("wordquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => WordquizConfig::default(),
    };

    apply_env_overrides(&mut config);

    // Resolve env vars in all provider configs
    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config(content: &str) -> Result<WordquizConfig> {
    Ok(toml::from_str::<WordquizConfig>(content)?)
}

fn apply_env_overrides(config: &mut WordquizConfig) {
    for (name, var) in [
        ("gemini", "WORDQUIZ_GEMINI_KEY"),
        ("openai", "WORDQUIZ_OPENAI_KEY"),
    ] {
        let Ok(key) = std::env::var(var) else {
            continue;
        };
        if let Some(entry) = ProviderConfig::empty_for(name) {
            config
                .providers
                .entry(name.to_string())
                .or_insert(entry)
                .set_api_key(&key);
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("wordquiz"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn TextGenerator>> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Ok(Box::new(GeminiProvider::new(api_key, base_url.clone())?))
        }
        ProviderConfig::OpenAI { api_key, base_url } => {
            Ok(Box::new(OpenAiProvider::new(api_key, base_url.clone())?))
        }
    }
}
