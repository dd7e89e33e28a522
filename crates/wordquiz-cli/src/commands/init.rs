//! The `wordquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("wordquiz.toml").exists() {
        println!("wordquiz.toml already exists, skipping.");
    } else {
        std::fs::write("wordquiz.toml", SAMPLE_CONFIG)?;
        println!("Created wordquiz.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY (or edit wordquiz.toml)");
    println!("  2. Run: wordquiz play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# wordquiz configuration

default_provider = "gemini"
default_model = "gemini-2.5-pro"
temperature = 0.7
max_tokens = 2048
output_dir = "./wordquiz-results"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses() {
        let config = wordquiz_providers::config::parse_config(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.providers.len(), 2);
    }
}
