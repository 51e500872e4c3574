//! The `quizforge results` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizforge_core::statistics::summarize;
use quizforge_core::store::QuizStore;

use super::{user_or_default, Context};

pub fn execute(ctx: &Context, candidate: Option<String>) -> Result<()> {
    let candidate = user_or_default(candidate);
    let results = ctx.store()?.results_by_candidate(&candidate)?;

    if results.is_empty() {
        println!("No results found for {candidate}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Result", "Quiz", "Score", "%", "Time (s)", "Submitted"]);

    for r in &results {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(r.quiz_id),
            Cell::new(format!("{}/{}", r.score, r.total_questions)),
            Cell::new(format!("{:.1}", r.percentage())),
            Cell::new(r.time_taken_secs),
            Cell::new(r.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");

    let summary = summarize(&results);
    println!(
        "\n{} attempt(s), {} quiz(zes): average {:.1}%, best {:.1}%, {} perfect, {}s total",
        summary.attempts,
        summary.per_quiz.len(),
        summary.average_percentage,
        summary.best_percentage,
        summary.perfect_attempts,
        summary.total_time_secs
    );

    Ok(())
}
