//! The `quizforge submit` command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use comfy_table::{Cell, Table};

use quizforge_core::model::{Submission, SubmittedAnswer};
use quizforge_core::score;
use quizforge_core::store::QuizStore;

use super::{parse_quiz_id, user_or_default, Context};

pub fn execute(
    ctx: &Context,
    quiz_id: String,
    answers_path: PathBuf,
    candidate: Option<String>,
    time_taken: u64,
) -> Result<()> {
    let store = ctx.store()?;
    let quiz = store.quiz(parse_quiz_id(&quiz_id)?)?;

    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read {}", answers_path.display()))?;
    let answers: Vec<SubmittedAnswer> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", answers_path.display()))?;

    let submission = Submission {
        candidate: user_or_default(candidate),
        answers,
        time_taken_secs: time_taken,
    };
    let result = score(&quiz, &submission)?;
    store.save_result(&result)?;

    let mut table = Table::new();
    table.set_header(vec!["Question", "Your answer", "Correct answer", ""]);

    for answer in &result.answers {
        table.add_row(vec![
            Cell::new(&answer.question_text),
            Cell::new(&answer.user_answer),
            Cell::new(&answer.correct_answer),
            Cell::new(if answer.is_correct { "OK" } else { "WRONG" }),
        ]);
    }

    println!("{table}");
    println!(
        "\nScore: {}/{} ({:.1}%)",
        result.score,
        result.total_questions,
        result.percentage()
    );
    println!("Result: {}", result.id);

    Ok(())
}
