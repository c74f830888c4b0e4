use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const OPTIONS_PER_QUESTION: usize = 4;

/// A single multiple-choice question.
///
/// Field names follow the JSON produced by the generation prompt
/// (`question`, `options`, `correctAnswer`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl Question {
    pub fn new(text: &str, options: [&str; OPTIONS_PER_QUESTION], correct_answer: &str) -> Self {
        Question {
            text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct_answer.to_string(),
        }
    }

    /// Checks the shape rules every question must satisfy before a session may use it.
    pub fn check(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(format!(
                "expected {} options, found {}",
                OPTIONS_PER_QUESTION,
                self.options.len()
            ));
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].contains(option) {
                return Err(format!("duplicate option '{}'", option));
            }
        }
        if !self.has_option(&self.correct_answer) {
            return Err(format!(
                "correct answer '{}' is not one of the options",
                self.correct_answer
            ));
        }
        Ok(())
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer == option
    }
}
