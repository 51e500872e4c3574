//! OpenAI-compatible chat completions provider.
//!
//! Serves both OpenAI and Together AI, which speaks the same
//! `/v1/chat/completions` protocol at a different base URL.

use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizforge_core::error::ProviderError;
use quizforge_core::prompt::QUIZ_SYSTEM_PROMPT;
use quizforge_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const TOGETHER_BASE_URL: &str = "https://api.together.xyz";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which service an [`OpenAiProvider`] is talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    OpenAi,
    Together,
}

impl Flavor {
    fn name(self) -> &'static str {
        match self {
            Flavor::OpenAi => "openai",
            Flavor::Together => "together",
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Flavor::OpenAi => OPENAI_BASE_URL,
            Flavor::Together => TOGETHER_BASE_URL,
        }
    }
}

/// OpenAI-compatible API provider.
pub struct OpenAiProvider {
    flavor: Flavor,
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        flavor: Flavor,
        api_key: &str,
        base_url: Option<String>,
        org_id: Option<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            flavor,
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| flavor.default_base_url().to_string()),
            org_id,
            client,
        })
    }

    /// A Together AI client.
    pub fn together(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        Self::new(Flavor::Together, api_key, base_url, None)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: ChatUsage,
    model: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        self.flavor.name()
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let system_prompt = request
            .system_prompt
            .clone()
            .unwrap_or_else(|| QUIZ_SYSTEM_PROMPT.to_string());

        let body = ChatRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
        };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");

        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }

        let response = req.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
            } else {
                ProviderError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body).into());
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(request.model.clone()).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let api_response: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let estimated_cost = self
            .available_models()
            .iter()
            .find(|m| m.id == api_response.model)
            .map(|m| {
                (api_response.usage.prompt_tokens as f64 * m.cost_per_1k_input
                    + api_response.usage.completion_tokens as f64 * m.cost_per_1k_output)
                    / 1000.0
            })
            .unwrap_or(0.0);

        Ok(GenerateResponse {
            content,
            model: api_response.model,
            token_usage: TokenUsage {
                prompt_tokens: api_response.usage.prompt_tokens,
                completion_tokens: api_response.usage.completion_tokens,
                total_tokens: api_response.usage.total_tokens,
                estimated_cost_usd: estimated_cost,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        match self.flavor {
            Flavor::Together => vec![
                ModelInfo {
                    id: "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free".into(),
                    name: "DeepSeek R1 Distill Llama 70B (free)".into(),
                    provider: "together".into(),
                    max_context: 8_192,
                    cost_per_1k_input: 0.0,
                    cost_per_1k_output: 0.0,
                },
                ModelInfo {
                    id: "meta-llama/Llama-3.3-70B-Instruct-Turbo".into(),
                    name: "Llama 3.3 70B Instruct Turbo".into(),
                    provider: "together".into(),
                    max_context: 131_072,
                    cost_per_1k_input: 0.00088,
                    cost_per_1k_output: 0.00088,
                },
            ],
            Flavor::OpenAi => vec![
                ModelInfo {
                    id: "gpt-4.1".into(),
                    name: "GPT-4.1".into(),
                    provider: "openai".into(),
                    max_context: 1_000_000,
                    cost_per_1k_input: 0.002,
                    cost_per_1k_output: 0.008,
                },
                ModelInfo {
                    id: "gpt-4.1-mini".into(),
                    name: "GPT-4.1 Mini".into(),
                    provider: "openai".into(),
                    max_context: 1_000_000,
                    cost_per_1k_input: 0.0004,
                    cost_per_1k_output: 0.0016,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &str) -> GenerateRequest {
        GenerateRequest {
            model: model.into(),
            prompt: "Generate a quiz about rivers".into(),
            system_prompt: None,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let content = r#"[{"question": "Longest river?", "options": ["Nile", "Amazon", "Danube", "Volga"], "correctAnswer": "Nile"}]"#;
        let response_body = serde_json::json!({
            "choices": [{"message": {"content": content, "role": "assistant"}, "index": 0}],
            "model": "gpt-4.1",
            "usage": {"prompt_tokens": 1000, "completion_tokens": 1000, "total_tokens": 2000}
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4.1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider =
            OpenAiProvider::new(Flavor::OpenAi, "test-key", Some(server.uri()), None).unwrap();
        let response = provider.generate(&request("gpt-4.1")).await.unwrap();

        assert_eq!(response.content, content);
        assert_eq!(response.token_usage.total_tokens, 2000);
        assert!((response.token_usage.estimated_cost_usd - 0.01).abs() < 1e-9);
    }

    #[tokio::test]
    async fn together_uses_same_protocol() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": "[]", "role": "assistant"}, "index": 0}],
            "model": "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free",
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer together-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::together("together-key", Some(server.uri())).unwrap();
        assert_eq!(provider.name(), "together");

        let response = provider
            .generate(&request("deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free"))
            .await
            .unwrap();
        assert_eq!(response.content, "[]");
        assert_eq!(response.token_usage.estimated_cost_usd, 0.0);
    }

    #[tokio::test]
    async fn null_content_becomes_empty_string() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": null, "role": "assistant"}, "index": 0}],
            "model": "gpt-4.1"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider =
            OpenAiProvider::new(Flavor::OpenAi, "key", Some(server.uri()), None).unwrap();
        let response = provider.generate(&request("gpt-4.1")).await.unwrap();
        assert_eq!(response.content, "");
    }

    #[tokio::test]
    async fn error_responses_are_classified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let provider =
            OpenAiProvider::new(Flavor::OpenAi, "key", Some(server.uri()), None).unwrap();
        let err = provider.generate(&request("gpt-4.1")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::ApiError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn rate_limit_carries_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::together("key", Some(server.uri())).unwrap();
        let err = provider.generate(&request("any")).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ProviderError>()
                .and_then(|e| e.retry_after_ms()),
            Some(3000)
        );
    }
}
