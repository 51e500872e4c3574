//! Quiz generator.
//!
//! Drives one or more quiz requests through the completion provider and the
//! normalizer, retrying transient provider failures with exponential backoff
//! and bounding concurrency with a semaphore.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::error::{ProviderError, QuizError};
use crate::model::{Quiz, QuizRequest};
use crate::normalizer::normalize;
use crate::prompt::{build_prompt, QUIZ_SYSTEM_PROMPT};
use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider};

/// Configuration for the quiz generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Maximum concurrent generation requests.
    pub parallelism: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Max tokens for generation.
    pub max_tokens: u32,
    /// Retries on transient provider errors (not malformed output).
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each attempt.
    pub retry_delay: Duration,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free".to_string(),
            parallelism: 4,
            temperature: 0.7,
            max_tokens: 2048,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            system_prompt_override: None,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_request_start(&self, topic: &str);
    fn on_quiz_ready(&self, quiz: &Quiz);
    fn on_request_error(&self, topic: &str, error: &QuizError);
    fn on_batch_complete(&self, total: usize, succeeded: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_request_start(&self, _: &str) {}
    fn on_quiz_ready(&self, _: &Quiz) {}
    fn on_request_error(&self, _: &str, _: &QuizError) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Generates validated quizzes from an injected completion provider.
pub struct QuizGenerator {
    provider: Arc<dyn LlmProvider>,
    config: GeneratorConfig,
}

impl QuizGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a single quiz.
    pub async fn generate(&self, request: &QuizRequest) -> Result<Quiz, QuizError> {
        request.validate()?;

        let completion = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(
                &request.topic,
                request.difficulty,
                request.settings.num_questions,
            ),
            system_prompt: Some(
                self.config
                    .system_prompt_override
                    .clone()
                    .unwrap_or_else(|| QUIZ_SYSTEM_PROMPT.to_string()),
            ),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self.complete_with_retry(&completion).await?;
        tracing::debug!(
            provider = self.provider.name(),
            model = %response.model,
            latency_ms = response.latency_ms,
            tokens = response.token_usage.total_tokens,
            "completion received for topic '{}'",
            request.topic
        );

        let drafts = normalize(&response.content, request.settings.num_questions as usize)
            .inspect_err(|e| tracing::warn!("rejected model output for '{}': {e}", request.topic))?;

        Quiz::assemble(request, drafts)
    }

    /// Generate several quizzes concurrently.
    ///
    /// Outcomes are returned in the same order as `requests`.
    pub async fn generate_all(
        &self,
        requests: &[QuizRequest],
        progress: &dyn ProgressReporter,
    ) -> Vec<Result<Quiz, QuizError>> {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut futures = FuturesUnordered::new();
        for (index, request) in requests.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        progress.on_request_start(&request.topic);
                        self.generate(request).await
                    }
                    Err(_) => Err(QuizError::Completion(anyhow::anyhow!("semaphore closed"))),
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<Quiz, QuizError>>> =
            requests.iter().map(|_| None).collect();
        let mut succeeded = 0usize;
        let mut failed = 0usize;

        while let Some((index, outcome)) = futures.next().await {
            match &outcome {
                Ok(quiz) => {
                    progress.on_quiz_ready(quiz);
                    succeeded += 1;
                }
                Err(e) => {
                    tracing::error!("quiz generation failed for '{}': {e}", requests[index].topic);
                    progress.on_request_error(&requests[index].topic, e);
                    failed += 1;
                }
            }
            outcomes[index] = Some(outcome);
        }

        progress.on_batch_complete(requests.len(), succeeded, failed, start.elapsed());

        outcomes.into_iter().flatten().collect()
    }

    async fn complete_with_retry(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, QuizError> {
        let mut retry_delay = self.config.retry_delay;
        let mut last_error = None;

        for retry in 0..=self.config.max_retries {
            if retry > 0 {
                tracing::warn!(
                    "retrying completion ({retry}/{}) after {}ms",
                    self.config.max_retries,
                    retry_delay.as_millis()
                );
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(Duration::from_secs(60));
            }

            match self.provider.generate(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if let Some(provider_error) = e.downcast_ref::<ProviderError>() {
                        if provider_error.is_permanent() {
                            return Err(QuizError::Completion(e));
                        }
                        if let Some(ms) = provider_error.retry_after_ms() {
                            retry_delay = Duration::from_millis(ms);
                        }
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(QuizError::Completion(
            last_error.unwrap_or_else(|| anyhow::anyhow!("unknown error")),
        ))
    }
}
