//! Error types for quiz generation, scoring, and the surrounding layers.
//!
//! `ProviderError` lives here rather than in `quizforge-providers` so the
//! generator can downcast completion failures and classify them for retry
//! decisions without string matching.

use thiserror::Error;

use crate::model::QuestionId;

/// Errors that can occur when interacting with an LLM completion service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Why a single generated element was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("element is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has the wrong type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("question text is empty")]
    EmptyQuestion,

    #[error("expected exactly 4 options, found {0}")]
    OptionCount(usize),

    #[error("option {0} is empty")]
    EmptyOption(usize),

    #[error("option {0:?} appears more than once")]
    DuplicateOption(String),

    #[error("correct answer {0:?} is not one of the options")]
    CorrectAnswerNotInOptions(String),
}

/// Failures turning raw completion text into validated questions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No JSON array of question objects could be located in the text.
    #[error("no JSON array of questions found in model output")]
    Extraction,

    /// An element failed field validation; the whole batch is rejected.
    #[error("question {index} is invalid: {violation}")]
    Schema {
        index: usize,
        violation: SchemaViolation,
    },

    /// Validation left zero questions.
    #[error("model output contained no questions")]
    EmptyResult,
}

/// Failures scoring a submission against a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// A submitted answer references a question that is not in the quiz.
    #[error("unknown question id: {0}")]
    UnknownQuestion(QuestionId),
}

/// Top-level error for operations that cross the core boundary.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Caller input failed validation before any work was done.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A referenced quiz or result does not exist (or is not visible to
    /// the caller).
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("could not generate a quiz, try again: {0}")]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// The completion service call failed.
    #[error("completion request failed: {0:#}")]
    Completion(anyhow::Error),

    /// Reading or writing persisted records failed.
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl QuizError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        QuizError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// The provider error behind a completion failure, if there is one.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            QuizError::Completion(e) => e.downcast_ref::<ProviderError>(),
            _ => None,
        }
    }

    /// HTTP status a request boundary should answer with.
    ///
    /// Validation-shaped failures map to 400, missing records to 404,
    /// upstream generation failures to 502 and everything else to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            QuizError::InvalidRequest(_) | QuizError::Scoring(_) => 400,
            QuizError::NotFound { .. } => 404,
            QuizError::Generation(_) | QuizError::Completion(_) => 502,
            QuizError::Storage(_) => 500,
        }
    }

    /// Whether asking again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            QuizError::Generation(_) => true,
            QuizError::Completion(_) => !self.provider_error().is_some_and(|p| p.is_permanent()),
            _ => false,
        }
    }
}
