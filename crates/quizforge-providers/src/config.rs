//! Configuration loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizforge_core::generator::GeneratorConfig;
use quizforge_core::traits::LlmProvider;

use crate::mock::MockProvider;
use crate::openai::{Flavor, OpenAiProvider};

/// Configuration for a single completion provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Together {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    /// Offline provider returning canned text (or the contents of a file).
    Mock {
        #[serde(default)]
        response_file: Option<PathBuf>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Together {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Together")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Mock { response_file } => f
                .debug_struct("Mock")
                .field("response_file", response_file)
                .finish(),
        }
    }
}

/// Top-level quizforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Max tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Max retries on provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay between retries in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Max concurrent generation requests.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Directory where quizzes and results are stored.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_provider() -> String {
    "together".to_string()
}
fn default_model() -> String {
    "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_parallelism() -> usize {
    4
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./quizforge-data")
}

impl Default for QuizforgeConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            parallelism: default_parallelism(),
            data_dir: default_data_dir(),
        }
    }
}

impl QuizforgeConfig {
    /// Generator settings for `model`, or the configured default model.
    pub fn generator_config(&self, model: Option<&str>) -> GeneratorConfig {
        GeneratorConfig {
            model: model.unwrap_or(&self.default_model).to_string(),
            parallelism: self.parallelism,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            system_prompt_override: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// References are expanded in a single left-to-right pass; substituted
/// values are copied verbatim and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + 2 + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let opt = |v: &Option<String>| v.as_ref().map(|s| resolve_env_vars(s));
    match config {
        ProviderConfig::Together { api_key, base_url } => ProviderConfig::Together {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
            org_id: opt(org_id),
        },
        ProviderConfig::Mock { response_file } => ProviderConfig::Mock {
            response_file: response_file.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment variable overrides: `QUIZFORGE_TOGETHER_KEY`,
/// `QUIZFORGE_OPENAI_KEY`.
pub fn load_config() -> Result<QuizforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizforge.toml");
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
        None => QuizforgeConfig::default(),
    };

    apply_key_overrides(&mut config);

    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config(content: &str) -> Result<QuizforgeConfig> {
    Ok(toml::from_str::<QuizforgeConfig>(content)?)
}

fn apply_key_overrides(config: &mut QuizforgeConfig) {
    if let Ok(key) = std::env::var("QUIZFORGE_TOGETHER_KEY") {
        match config.providers.get_mut("together") {
            Some(ProviderConfig::Together { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "together".into(),
                    ProviderConfig::Together {
                        api_key: key,
                        base_url: None,
                    },
                );
            }
        }
    }

    if let Ok(key) = std::env::var("QUIZFORGE_OPENAI_KEY") {
        match config.providers.get_mut("openai") {
            Some(ProviderConfig::OpenAI { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "openai".into(),
                    ProviderConfig::OpenAI {
                        api_key: key,
                        base_url: None,
                        org_id: None,
                    },
                );
            }
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    tracing::debug!("creating provider '{name}': {config:?}");
    match config {
        ProviderConfig::Together { api_key, base_url } => Ok(Box::new(
            OpenAiProvider::together(api_key, base_url.clone())?,
        )),
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Box::new(OpenAiProvider::new(
            Flavor::OpenAi,
            api_key,
            base_url.clone(),
            org_id.clone(),
        )?)),
        ProviderConfig::Mock { response_file } => match response_file {
            Some(path) => {
                let response = std::fs::read_to_string(path).with_context(|| {
                    format!("failed to read mock response: {}", path.display())
                })?;
                Ok(Box::new(MockProvider::with_fixed_response(&response)))
            }
            None => Ok(Box::new(MockProvider::default())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZFORGE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZFORGE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZFORGE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no vars ${unterminated"), "no vars ${unterminated");
        assert_eq!(
            resolve_env_vars("${_QUIZFORGE_TEST_VAR}-${_QUIZFORGE_UNSET_VAR}-${_QUIZFORGE_TEST_VAR}"),
            "hello--hello"
        );
        std::env::remove_var("_QUIZFORGE_TEST_VAR");
    }

    #[test]
    fn resolved_values_are_not_expanded_again() {
        std::env::set_var("_QUIZFORGE_SELF_REF", "${_QUIZFORGE_SELF_REF}");
        assert_eq!(
            resolve_env_vars("key=${_QUIZFORGE_SELF_REF}!"),
            "key=${_QUIZFORGE_SELF_REF}!"
        );
        std::env::remove_var("_QUIZFORGE_SELF_REF");
    }

    #[test]
    fn default_config() {
        let config = QuizforgeConfig::default();
        assert_eq!(config.default_provider, "together");
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_tokens, 2048);
        assert!((config.temperature - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "together"
default_model = "meta-llama/Llama-3.3-70B-Instruct-Turbo"
data_dir = "/tmp/quizzes"

[providers.together]
type = "together"
api_key = "tg-test"

[providers.openai]
type = "openai"
api_key = "sk-openai"

[providers.offline]
type = "mock"
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert!(matches!(
            config.providers.get("together"),
            Some(ProviderConfig::Together { .. })
        ));
        assert!(matches!(
            config.providers.get("offline"),
            Some(ProviderConfig::Mock {
                response_file: None
            })
        ));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/quizzes"));

        let gen = config.generator_config(None);
        assert_eq!(gen.model, "meta-llama/Llama-3.3-70B-Instruct-Turbo");
        assert_eq!(gen.retry_delay, Duration::from_millis(1000));
        assert_eq!(config.generator_config(Some("other")).model, "other");
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = ProviderConfig::Together {
            api_key: "secret-key".into(),
            base_url: None,
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn load_explicit_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizforge.toml");
        std::fs::write(
            &path,
            "default_provider = \"offline\"\n[providers.offline]\ntype = \"mock\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_provider, "offline");

        let missing = dir.path().join("nope.toml");
        assert!(load_config_from(Some(&missing)).is_err());
    }

    #[test]
    fn creates_mock_provider_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canned.txt");
        std::fs::write(&path, "[]").unwrap();

        let provider = create_provider(
            "offline",
            &ProviderConfig::Mock {
                response_file: Some(path),
            },
        )
        .unwrap();
        assert_eq!(provider.name(), "mock");
    }
}
