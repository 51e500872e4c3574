//! The `quizforge check` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizforge_core::normalize;

pub fn execute(raw_path: PathBuf, expected_count: usize) -> Result<()> {
    let raw = std::fs::read_to_string(&raw_path)
        .with_context(|| format!("failed to read {}", raw_path.display()))?;

    let drafts = normalize(&raw, expected_count)
        .with_context(|| format!("{} was rejected", raw_path.display()))?;

    println!("{} question(s) valid", drafts.len());
    for (i, draft) in drafts.iter().enumerate() {
        println!("\n{}. {}", i + 1, draft.text);
        for option in &draft.options {
            let marker = if *option == draft.correct_answer {
                "*"
            } else {
                " "
            };
            println!("   {marker} {option}");
        }
        if let Some(explanation) = &draft.explanation {
            println!("   ({explanation})");
        }
    }

    if drafts.len() != expected_count {
        println!(
            "\nWARNING: {} question(s) returned, {expected_count} requested",
            drafts.len()
        );
    }

    Ok(())
}
