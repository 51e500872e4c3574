//! Aggregate statistics over a candidate's quiz results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::QuizResult;

/// Summary of a set of quiz results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Number of attempts.
    pub attempts: usize,
    /// Sum of correct answers across attempts.
    pub total_correct: u32,
    /// Sum of quiz lengths across attempts.
    pub total_questions: u32,
    /// Mean of per-attempt percentages.
    pub average_percentage: f64,
    /// Highest single-attempt percentage.
    pub best_percentage: f64,
    /// Number of attempts with every question right.
    pub perfect_attempts: usize,
    /// Total time spent, in seconds.
    pub total_time_secs: u64,
    /// Best percentage per quiz.
    pub per_quiz: HashMap<Uuid, QuizStats>,
}

/// Statistics for one quiz across several attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizStats {
    pub attempts: usize,
    pub best_percentage: f64,
    /// Fastest attempt, in seconds.
    pub fastest_secs: u64,
}

/// Summarize a set of results.
pub fn summarize(results: &[QuizResult]) -> HistorySummary {
    if results.is_empty() {
        return HistorySummary::default();
    }

    let mut summary = HistorySummary {
        attempts: results.len(),
        ..Default::default()
    };
    let mut percentage_sum = 0.0;

    for r in results {
        let pct = r.percentage();
        percentage_sum += pct;
        summary.total_correct += r.score;
        summary.total_questions += r.total_questions;
        summary.total_time_secs += r.time_taken_secs;
        summary.best_percentage = summary.best_percentage.max(pct);
        if r.is_perfect() {
            summary.perfect_attempts += 1;
        }

        summary
            .per_quiz
            .entry(r.quiz_id)
            .and_modify(|s| {
                s.attempts += 1;
                s.best_percentage = s.best_percentage.max(pct);
                s.fastest_secs = s.fastest_secs.min(r.time_taken_secs);
            })
            .or_insert(QuizStats {
                attempts: 1,
                best_percentage: pct,
                fastest_secs: r.time_taken_secs,
            });
    }

    summary.average_percentage = percentage_sum / results.len() as f64;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(quiz_id: Uuid, score: u32, total: u32, secs: u64) -> QuizResult {
        QuizResult {
            id: Uuid::new_v4(),
            quiz_id,
            candidate: "bob".into(),
            score,
            total_questions: total,
            time_taken_secs: secs,
            answers: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_history() {
        let summary = summarize(&[]);
        assert_eq!(summary.attempts, 0);
        assert_eq!(summary.average_percentage, 0.0);
        assert!(summary.per_quiz.is_empty());
    }

    #[test]
    fn aggregates_across_attempts() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let results = vec![
            result(a, 2, 4, 120),
            result(a, 4, 4, 90),
            result(b, 0, 5, 300),
        ];

        let summary = summarize(&results);
        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.total_correct, 6);
        assert_eq!(summary.total_questions, 13);
        assert_eq!(summary.total_time_secs, 510);
        assert_eq!(summary.perfect_attempts, 1);
        assert!((summary.average_percentage - 50.0).abs() < 1e-9);
        assert!((summary.best_percentage - 100.0).abs() < 1e-9);

        let quiz_a = &summary.per_quiz[&a];
        assert_eq!(quiz_a.attempts, 2);
        assert!((quiz_a.best_percentage - 100.0).abs() < 1e-9);
        assert_eq!(quiz_a.fastest_secs, 90);
        assert_eq!(summary.per_quiz[&b].best_percentage, 0.0);
    }
}
