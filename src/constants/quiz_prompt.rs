pub const QUIZ_GENERATOR_SYSTEM_PROMPT: &str = "You are a multiple-choice quiz generator API.

You return ONLY a single JSON object matching the provided schema. No markdown, no explanations, no extra text.

### Rules:

- Generate exactly the requested number of multiple-choice questions on the requested topic.
- Every question must be unique within the quiz.
- Each question must have exactly 4 options, and no two options of a question may be identical.
- The correctAnswer must be one of the options, copied exactly.
- Questions must be answerable from general knowledge of the topic; avoid trick questions.
- Escape any double quotes inside strings using a backslash.
- Count the questions before producing the final response.";

pub const FILLER_PROMPT_PREFIX: &str =
    "Some questions for this quiz are already written. Generate additional, different questions only.";

/// User message asking for `count` questions on `topic`.
pub fn quiz_user_prompt(topic: &str, count: usize) -> String {
    format!(
        "Topic: {}\n\nGenerate exactly {} multiple-choice questions now.",
        topic.trim(),
        count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_user_prompt_includes_topic_and_count() {
        let prompt = quiz_user_prompt("  Rust lifetimes ", 30);

        assert!(prompt.contains("Topic: Rust lifetimes\n"));
        assert!(prompt.contains("exactly 30"));
    }
}
