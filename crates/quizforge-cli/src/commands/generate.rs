//! The `quizforge generate` command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use quizforge_core::error::QuizError;
use quizforge_core::generator::{ProgressReporter, QuizGenerator};
use quizforge_core::model::{Difficulty, Quiz, QuizRequest, QuizSettings};
use quizforge_core::store::QuizStore;
use quizforge_core::traits::LlmProvider;
use quizforge_providers::create_provider;

use super::{user_or_default, Context};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_request_start(&self, topic: &str) {
        eprintln!("  Generating: {topic}");
    }

    fn on_quiz_ready(&self, quiz: &Quiz) {
        eprintln!(
            "  Done: {} ({} questions)",
            quiz.topic,
            quiz.questions.len()
        );
    }

    fn on_request_error(&self, topic: &str, error: &QuizError) {
        eprintln!("  ERROR: {topic}: {error}");
    }

    fn on_batch_complete(&self, total: usize, succeeded: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {succeeded}/{total} succeeded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    ctx: &Context,
    topics_str: String,
    title: Option<String>,
    num_questions: u32,
    time_limit: u32,
    difficulty: String,
    owner: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let difficulty: Difficulty = difficulty.parse().map_err(anyhow::Error::msg)?;
    let owner = user_or_default(owner);

    let topics: Vec<&str> = topics_str
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    anyhow::ensure!(!topics.is_empty(), "at least one topic is required");

    let requests: Vec<QuizRequest> = topics
        .iter()
        .map(|topic| {
            let mut request = QuizRequest::for_topic(topic, &owner);
            if let Some(title) = &title {
                request.title = if topics.len() > 1 {
                    format!("{title}: {topic}")
                } else {
                    title.clone()
                };
            }
            request.difficulty = difficulty;
            request.settings = QuizSettings {
                time_limit_minutes: time_limit,
                num_questions,
            };
            request
        })
        .collect();
    for request in &requests {
        request.validate()?;
    }

    let config = ctx.config()?;
    let provider_config = config.providers.get(&config.default_provider).ok_or_else(|| {
        anyhow::anyhow!(
            "provider '{}' not found in config. Available: {:?}",
            config.default_provider,
            config.providers.keys().collect::<Vec<_>>()
        )
    })?;
    let provider: Arc<dyn LlmProvider> =
        Arc::from(create_provider(&config.default_provider, provider_config)?);

    let generator_config = config.generator_config(model.as_deref());
    eprintln!(
        "Generating {} quiz(zes) with {}/{}\n",
        requests.len(),
        provider.name(),
        generator_config.model
    );

    let generator = QuizGenerator::new(provider, generator_config);
    let outcomes = generator.generate_all(&requests, &ConsoleReporter).await;

    let store = ctx.store()?;
    let mut failed = 0usize;
    for outcome in outcomes {
        match outcome {
            Ok(quiz) => {
                let id = store.save_quiz(&quiz)?;
                tracing::info!("saved quiz {id} under {}", store.root().display());
                println!("{id}  {} ({} questions)", quiz.title, quiz.questions.len());
            }
            Err(_) => failed += 1,
        }
    }

    anyhow::ensure!(failed == 0, "{failed} quiz(zes) could not be generated");
    Ok(())
}
