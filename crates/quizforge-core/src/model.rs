//! Core data model types for quizforge.
//!
//! Field names serialize in camelCase so persisted quizzes and submitted
//! answer payloads use the same shape the completion prompt asks for.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GenerationError, QuizError};

/// Number of options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Opaque identifier of a question inside a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How hard the generated questions should be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A validated question that has not been given an id yet.
///
/// Produced by the normalizer in the order the model emitted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A multiple-choice question attached to a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Attach an id to a validated draft.
    pub fn from_draft(id: QuestionId, draft: QuestionDraft) -> Self {
        Self {
            id,
            text: draft.text,
            options: draft.options,
            correct_answer: draft.correct_answer,
            explanation: draft.explanation,
        }
    }
}

/// Per-quiz settings chosen at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    #[serde(default = "default_time_limit")]
    pub time_limit_minutes: u32,
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit_minutes: default_time_limit(),
            num_questions: default_num_questions(),
        }
    }
}

fn default_time_limit() -> u32 {
    30
}

fn default_num_questions() -> u32 {
    10
}

/// What a caller asks for when creating a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub title: String,
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub settings: QuizSettings,
    pub owner: String,
}

impl QuizRequest {
    /// A request with default settings whose title is derived from the topic.
    pub fn for_topic(topic: &str, owner: &str) -> Self {
        Self {
            title: format!("{topic} quiz"),
            topic: topic.to_string(),
            difficulty: Difficulty::default(),
            settings: QuizSettings::default(),
            owner: owner.to_string(),
        }
    }

    /// Reject requests the generator should never send to a model.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.title.trim().is_empty() {
            return Err(QuizError::InvalidRequest("title must not be empty".into()));
        }
        if self.topic.trim().is_empty() {
            return Err(QuizError::InvalidRequest("topic must not be empty".into()));
        }
        if self.settings.num_questions < 1 {
            return Err(QuizError::InvalidRequest(
                "numQuestions must be at least 1".into(),
            ));
        }
        if self.settings.time_limit_minutes < 1 {
            return Err(QuizError::InvalidRequest(
                "timeLimitMinutes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// A generated quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub settings: QuizSettings,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// Build a quiz from a request and the normalizer's drafts, giving every
    /// question a fresh id.
    pub fn assemble(request: &QuizRequest, drafts: Vec<QuestionDraft>) -> Result<Self, QuizError> {
        request.validate()?;
        if drafts.is_empty() {
            return Err(GenerationError::EmptyResult.into());
        }

        let questions = drafts
            .into_iter()
            .map(|d| Question::from_draft(QuestionId::generate(), d))
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            description: format!("Quiz about {}", request.topic.trim()),
            topic: request.topic.trim().to_string(),
            difficulty: request.difficulty,
            questions,
            settings: request.settings,
            created_by: request.owner.clone(),
            created_at: Utc::now(),
        })
    }

    /// Look up a question by id.
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }
}

/// One answer as submitted by a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    #[serde(rename = "answer", alias = "answerText")]
    pub answer_text: String,
}

impl SubmittedAnswer {
    pub fn new(question_id: impl Into<QuestionId>, answer_text: &str) -> Self {
        Self {
            question_id: question_id.into(),
            answer_text: answer_text.to_string(),
        }
    }
}

/// A candidate's full attempt at a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub candidate: String,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
    #[serde(default, rename = "timeTaken", alias = "timeTakenSeconds")]
    pub time_taken_secs: u64,
}

/// Snapshot of one compared answer, independent of later quiz edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAnswer {
    #[serde(rename = "question")]
    pub question_text: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// The immutable record of a scored submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub candidate: String,
    pub score: u32,
    pub total_questions: u32,
    #[serde(rename = "timeTaken")]
    pub time_taken_secs: u64,
    pub answers: Vec<ScoredAnswer>,
    pub created_at: DateTime<Utc>,
}

impl QuizResult {
    /// Score as a percentage of the quiz length.
    pub fn percentage(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.score as f64 / self.total_questions as f64 * 100.0
    }

    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.score == self.total_questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str, correct: &str) -> QuestionDraft {
        QuestionDraft {
            text: text.into(),
            options: vec!["A".into(), "B".into(), "C".into(), correct.into()],
            correct_answer: correct.into(),
            explanation: None,
        }
    }

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("EASY".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("normal".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("impossible".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn settings_default() {
        let settings = QuizSettings::default();
        assert_eq!(settings.time_limit_minutes, 30);
        assert_eq!(settings.num_questions, 10);

        let parsed: QuizSettings = serde_json::from_str(r#"{"numQuestions": 3}"#).unwrap();
        assert_eq!(parsed.time_limit_minutes, 30);
        assert_eq!(parsed.num_questions, 3);
    }

    #[test]
    fn request_validation() {
        let ok = QuizRequest::for_topic("Rust", "alice");
        assert!(ok.validate().is_ok());

        let mut blank = ok.clone();
        blank.topic = "   ".into();
        assert!(matches!(blank.validate(), Err(QuizError::InvalidRequest(_))));

        let mut zero = ok.clone();
        zero.settings.num_questions = 0;
        assert!(matches!(zero.validate(), Err(QuizError::InvalidRequest(_))));

        let mut no_time = ok;
        no_time.settings.time_limit_minutes = 0;
        assert!(no_time.validate().is_err());
    }

    #[test]
    fn assemble_assigns_unique_ids() {
        let request = QuizRequest::for_topic("Geography", "alice");
        let quiz = Quiz::assemble(
            &request,
            vec![draft("Capital of France?", "Paris"), draft("Answer?", "42")],
        )
        .unwrap();

        assert_eq!(quiz.questions.len(), 2);
        assert_ne!(quiz.questions[0].id, quiz.questions[1].id);
        assert_eq!(quiz.description, "Quiz about Geography");
        assert_eq!(quiz.created_by, "alice");
        assert_eq!(quiz.questions[0].text, "Capital of France?");

        let id = quiz.questions[1].id.clone();
        assert_eq!(quiz.question(&id).unwrap().correct_answer, "42");
        assert!(quiz.question(&QuestionId::from("missing")).is_none());
    }

    #[test]
    fn assemble_rejects_empty_drafts() {
        let request = QuizRequest::for_topic("Geography", "alice");
        let err = Quiz::assemble(&request, vec![]).unwrap_err();
        assert!(matches!(
            err,
            QuizError::Generation(GenerationError::EmptyResult)
        ));
    }

    #[test]
    fn submitted_answer_wire_names() {
        let a: SubmittedAnswer =
            serde_json::from_str(r#"{"questionId": "q1", "answer": "Paris"}"#).unwrap();
        assert_eq!(a, SubmittedAnswer::new("q1", "Paris"));

        let b: SubmittedAnswer =
            serde_json::from_str(r#"{"questionId": "q1", "answerText": "Paris"}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn result_percentage() {
        let result = QuizResult {
            id: Uuid::nil(),
            quiz_id: Uuid::nil(),
            candidate: "bob".into(),
            score: 3,
            total_questions: 4,
            time_taken_secs: 60,
            answers: vec![],
            created_at: Utc::now(),
        };
        assert!((result.percentage() - 75.0).abs() < f64::EPSILON);
        assert!(!result.is_perfect());

        let empty = QuizResult {
            total_questions: 0,
            score: 0,
            ..result
        };
        assert_eq!(empty.percentage(), 0.0);
        assert!(!empty.is_perfect());
    }
}
