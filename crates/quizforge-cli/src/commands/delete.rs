//! The `quizforge delete` command.

use anyhow::Result;

use quizforge_core::store::QuizStore;

use super::{parse_quiz_id, user_or_default, Context};

pub fn execute(ctx: &Context, quiz_id: String, owner: Option<String>) -> Result<()> {
    let id = parse_quiz_id(&quiz_id)?;
    ctx.store()?.delete_quiz(id, &user_or_default(owner))?;
    println!("Deleted quiz {id}");
    Ok(())
}
