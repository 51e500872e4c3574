//! The `quizforge list` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizforge_core::store::QuizStore;

use super::{user_or_default, Context};

pub fn execute(ctx: &Context, owner: Option<String>) -> Result<()> {
    let owner = user_or_default(owner);
    let quizzes = ctx.store()?.quizzes_by_owner(&owner)?;

    if quizzes.is_empty() {
        println!("No quizzes found for {owner}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Topic", "Difficulty", "Questions", "Created"]);

    for quiz in &quizzes {
        table.add_row(vec![
            Cell::new(quiz.id),
            Cell::new(&quiz.title),
            Cell::new(&quiz.topic),
            Cell::new(quiz.difficulty),
            Cell::new(quiz.questions.len()),
            Cell::new(quiz.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!("{table}");
    Ok(())
}
