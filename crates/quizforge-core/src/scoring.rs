//! Scoring engine.
//!
//! Compares a submission against a quiz with exact string equality and
//! produces an immutable [`QuizResult`]. Every submitted question id must
//! resolve before anything is scored.

use chrono::Utc;
use uuid::Uuid;

use crate::error::ScoringError;
use crate::model::{Quiz, QuizResult, ScoredAnswer, Submission};

/// Score a submission against a quiz.
///
/// Answers keep their submission order. Duplicate question ids are scored
/// independently and each counts toward the score. `total_questions` is the
/// quiz length, however many answers were submitted.
pub fn score(quiz: &Quiz, submission: &Submission) -> Result<QuizResult, ScoringError> {
    let resolved = submission
        .answers
        .iter()
        .map(|a| {
            quiz.question(&a.question_id)
                .map(|q| (q, a))
                .ok_or_else(|| ScoringError::UnknownQuestion(a.question_id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let answers: Vec<ScoredAnswer> = resolved
        .into_iter()
        .map(|(question, submitted)| ScoredAnswer {
            question_text: question.text.clone(),
            user_answer: submitted.answer_text.clone(),
            correct_answer: question.correct_answer.clone(),
            is_correct: submitted.answer_text == question.correct_answer,
        })
        .collect();

    let score = answers.iter().filter(|a| a.is_correct).count() as u32;

    tracing::debug!(
        quiz_id = %quiz.id,
        candidate = %submission.candidate,
        "scored {score}/{} ({} answers submitted)",
        quiz.questions.len(),
        answers.len()
    );

    Ok(QuizResult {
        id: Uuid::new_v4(),
        quiz_id: quiz.id,
        candidate: submission.candidate.clone(),
        score,
        total_questions: quiz.questions.len() as u32,
        time_taken_secs: submission.time_taken_secs,
        answers,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Question, QuizSettings, SubmittedAnswer};

    fn question(id: &str, text: &str, correct: &str) -> Question {
        Question {
            id: id.into(),
            text: text.into(),
            options: vec![correct.into(), "x".into(), "y".into(), "z".into()],
            correct_answer: correct.into(),
            explanation: None,
        }
    }

    fn quiz() -> Quiz {
        Quiz {
            id: Uuid::new_v4(),
            title: "General knowledge".into(),
            description: String::new(),
            topic: "trivia".into(),
            difficulty: Difficulty::Medium,
            questions: vec![
                question("1", "Capital of France?", "Paris"),
                question("2", "The answer?", "42"),
            ],
            settings: QuizSettings::default(),
            created_by: "alice".into(),
            created_at: Utc::now(),
        }
    }

    fn submit(answers: Vec<SubmittedAnswer>) -> Submission {
        Submission {
            candidate: "bob".into(),
            answers,
            time_taken_secs: 95,
        }
    }

    #[test]
    fn scores_correct_and_incorrect() {
        let quiz = quiz();
        let result = score(
            &quiz,
            &submit(vec![
                SubmittedAnswer::new("1", "Paris"),
                SubmittedAnswer::new("2", "41"),
            ]),
        )
        .unwrap();

        assert_eq!(result.score, 1);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.quiz_id, quiz.id);
        assert_eq!(result.candidate, "bob");
        assert_eq!(result.time_taken_secs, 95);
        let flags: Vec<bool> = result.answers.iter().map(|a| a.is_correct).collect();
        assert_eq!(flags, vec![true, false]);
        assert_eq!(result.answers[1].user_answer, "41");
        assert_eq!(result.answers[1].correct_answer, "42");
    }

    #[test]
    fn unknown_question_fails_whole_submission() {
        let err = score(
            &quiz(),
            &submit(vec![
                SubmittedAnswer::new("1", "Paris"),
                SubmittedAnswer::new("99", "anything"),
            ]),
        )
        .unwrap_err();
        assert_eq!(err, ScoringError::UnknownQuestion("99".into()));
    }

    #[test]
    fn duplicate_answers_each_count() {
        let result = score(
            &quiz(),
            &submit(vec![
                SubmittedAnswer::new("1", "Paris"),
                SubmittedAnswer::new("1", "Paris"),
            ]),
        )
        .unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.answers.len(), 2);
        assert_eq!(result.total_questions, 2);
    }

    #[test]
    fn comparison_is_case_sensitive_and_exact() {
        let result = score(
            &quiz(),
            &submit(vec![
                SubmittedAnswer::new("1", "paris"),
                SubmittedAnswer::new("2", "42 "),
            ]),
        )
        .unwrap();
        assert_eq!(result.score, 0);
        assert!(result.answers.iter().all(|a| !a.is_correct));
    }

    #[test]
    fn empty_submission_scores_zero() {
        let result = score(&quiz(), &submit(vec![])).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.total_questions, 2);
        assert!(result.answers.is_empty());
    }

    #[test]
    fn keeps_submission_order_and_snapshots_text() {
        let mut quiz = quiz();
        let result = score(
            &quiz,
            &submit(vec![
                SubmittedAnswer::new("2", "42"),
                SubmittedAnswer::new("1", "Paris"),
            ]),
        )
        .unwrap();

        quiz.questions[1].text = "Edited later".into();

        assert_eq!(result.answers[0].question_text, "The answer?");
        assert_eq!(result.answers[1].question_text, "Capital of France?");
        assert!(result.is_perfect());
    }
}
