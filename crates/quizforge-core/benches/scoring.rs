use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::Utc;
use quizforge_core::model::{
    Difficulty, Question, QuestionId, Quiz, QuizResult, QuizSettings, Submission, SubmittedAnswer,
};
use quizforge_core::scoring::score;
use quizforge_core::statistics::summarize;
use uuid::Uuid;

fn make_quiz(n: usize) -> Quiz {
    Quiz {
        id: Uuid::nil(),
        title: "bench".into(),
        description: String::new(),
        topic: "bench".into(),
        difficulty: Difficulty::Medium,
        questions: (0..n)
            .map(|i| Question {
                id: QuestionId::from(format!("q{i}")),
                text: format!("Question {i}?"),
                options: vec![
                    format!("a{i}"),
                    format!("b{i}"),
                    format!("c{i}"),
                    format!("d{i}"),
                ],
                correct_answer: format!("b{i}"),
                explanation: None,
            })
            .collect(),
        settings: QuizSettings::default(),
        created_by: "bench".into(),
        created_at: Utc::now(),
    }
}

fn make_submission(n: usize) -> Submission {
    Submission {
        candidate: "bench".into(),
        answers: (0..n)
            .map(|i| {
                let answer = if i % 2 == 0 { format!("b{i}") } else { format!("a{i}") };
                SubmittedAnswer::new(format!("q{i}"), &answer)
            })
            .collect(),
        time_taken_secs: 60,
    }
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for n in [10usize, 100, 1000] {
        let quiz = make_quiz(n);
        let submission = make_submission(n);
        group.bench_function(format!("questions={n}"), |b| {
            b.iter(|| score(black_box(&quiz), black_box(&submission)))
        });
    }

    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let quiz = make_quiz(10);
    let submission = make_submission(10);
    let results: Vec<QuizResult> = (0..500)
        .map(|_| score(&quiz, &submission).unwrap())
        .collect();

    c.bench_function("summarize_500", |b| {
        b.iter(|| summarize(black_box(&results)))
    });
}

criterion_group!(benches, bench_score, bench_summarize);
criterion_main!(benches);
