//! The `quizforge show` command.

use anyhow::Result;

use quizforge_core::store::QuizStore;

use super::{parse_quiz_id, Context};

pub fn execute(ctx: &Context, quiz_id: String) -> Result<()> {
    let quiz = ctx.store()?.quiz(parse_quiz_id(&quiz_id)?)?;

    println!("{}", quiz.title);
    println!(
        "{} | {} | {} question(s) | {} min",
        quiz.topic,
        quiz.difficulty,
        quiz.questions.len(),
        quiz.settings.time_limit_minutes
    );

    // Answers stay hidden; candidates submit by question id.
    for (i, question) in quiz.questions.iter().enumerate() {
        println!("\n{}. {}  [{}]", i + 1, question.text, question.id);
        for option in &question.options {
            println!("   - {option}");
        }
    }

    Ok(())
}
