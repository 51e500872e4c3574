//! The `quizforge init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizforge.toml").exists() {
        println!("quizforge.toml already exists, skipping.");
    } else {
        std::fs::write("quizforge.toml", SAMPLE_CONFIG)?;
        println!("Created quizforge.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set TOGETHER_API_KEY (or edit quizforge.toml)");
    println!("  2. Run: quizforge generate --topic \"World capitals\"");
    println!("  3. Run: quizforge show --quiz <id>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

default_provider = "together"
default_model = "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free"
temperature = 0.7
max_tokens = 2048
max_retries = 3
retry_delay_ms = 1000
parallelism = 4
data_dir = "./quizforge-data"

[providers.together]
type = "together"
api_key = "${TOGETHER_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

# Offline provider with a canned two-question quiz.
[providers.offline]
type = "mock"
"#;
