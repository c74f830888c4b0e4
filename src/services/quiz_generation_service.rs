use std::sync::Arc;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::Question,
    services::model_service::{GenerationKind, QuestionGenerator},
};

/// Produces a usable question set for a topic, retrying and topping up as needed.
pub struct QuizGenerationService {
    generator: Arc<dyn QuestionGenerator>,
    target_count: usize,
    min_count: usize,
    max_attempts: u32,
}

impl QuizGenerationService {
    pub fn new(generator: Arc<dyn QuestionGenerator>, config: &Config) -> Self {
        Self {
            generator,
            target_count: config.quiz_question_count,
            min_count: config.quiz_min_question_count.min(config.quiz_question_count),
            max_attempts: config.quiz_generation_attempts.max(1),
        }
    }

    pub async fn generate_quiz(&self, topic: &str) -> AppResult<Vec<Question>> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::ValidationError(
                "Prompt is required and must be a string.".to_string(),
            ));
        }

        let mut best: Vec<Question> = Vec::new();
        let mut last_error: Option<AppError> = None;

        for attempt in 1..=self.max_attempts {
            log::info!(
                "Generating quiz for '{}' (attempt {}/{})",
                topic,
                attempt,
                self.max_attempts
            );

            let questions = match self
                .generator
                .generate(topic, self.target_count, GenerationKind::Full)
                .await
            {
                Ok(questions) => keep_well_formed(questions),
                Err(e) => {
                    log::warn!("Quiz generation attempt {} failed: {}", attempt, e);
                    last_error = Some(e);
                    continue;
                }
            };

            if questions.len() >= self.target_count {
                return Ok(self.truncate(questions));
            }

            if questions.len() >= self.min_count {
                return Ok(self.top_up(topic, questions).await);
            }

            log::warn!(
                "Attempt {} produced {} usable questions, fewer than the minimum {}",
                attempt,
                questions.len(),
                self.min_count
            );
            if questions.len() > best.len() {
                best = questions;
            }
        }

        let details = match last_error {
            Some(AppError::GenerationError(inner)) if best.is_empty() => inner,
            Some(e) if best.is_empty() => e.to_string(),
            _ => format!(
                "Only {} usable questions generated after {} attempts (minimum {})",
                best.len(),
                self.max_attempts,
                self.min_count
            ),
        };
        Err(AppError::GenerationError(details))
    }

    fn truncate(&self, mut questions: Vec<Question>) -> Vec<Question> {
        questions.truncate(self.target_count);
        questions
    }

    /// Requests the missing questions once; a failed top-up keeps the short set.
    async fn top_up(&self, topic: &str, mut questions: Vec<Question>) -> Vec<Question> {
        let missing = self.target_count.saturating_sub(questions.len());
        if missing == 0 {
            return questions;
        }

        log::info!("Requesting {} filler questions for '{}'", missing, topic);
        match self
            .generator
            .generate(topic, missing, GenerationKind::Filler)
            .await
        {
            Ok(extra) => {
                let extra = keep_well_formed(extra);
                for question in extra {
                    if questions.len() >= self.target_count {
                        break;
                    }
                    if !questions.iter().any(|q| q.text == question.text) {
                        questions.push(question);
                    }
                }
            }
            Err(e) => log::warn!(
                "Filler generation failed, keeping {} questions: {}",
                questions.len(),
                e
            ),
        }

        questions
    }
}

fn keep_well_formed(questions: Vec<Question>) -> Vec<Question> {
    questions
        .into_iter()
        .filter(|q| match q.check() {
            Ok(()) => true,
            Err(reason) => {
                log::debug!("Dropping malformed question '{}': {}", q.text, reason);
                false
            }
        })
        .collect()
}
