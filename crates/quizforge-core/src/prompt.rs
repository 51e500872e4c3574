//! Prompt construction for quiz generation.

use crate::model::Difficulty;

/// System prompt sent with every quiz generation request.
pub const QUIZ_SYSTEM_PROMPT: &str = "You are a quiz generation assistant. Respond ONLY with a JSON array of multiple choice questions. Do not include explanations outside the JSON, and do not wrap it in markdown.";

/// Build the user prompt asking for `count` questions about `topic`.
pub fn build_prompt(topic: &str, difficulty: Difficulty, count: u32) -> String {
    format!(
        "Generate a {difficulty} difficulty quiz about {topic} with {count} multiple choice questions.\n\
Format each question as a JSON object like:\n\
{{\n  \"question\": \"The question text\",\n  \"options\": [\"option1\", \"option2\", \"option3\", \"option4\"],\n  \"correctAnswer\": \"option1\",\n  \"explanation\": \"Brief explanation of the correct answer\"\n}}\n\
Every question must have exactly 4 distinct options, and correctAnswer must be copied exactly from one of them.\n\
Return only the JSON array.",
        topic = topic.trim()
    )
}
