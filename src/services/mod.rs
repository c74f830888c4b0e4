pub mod model_service;
pub mod quiz_generation_service;
pub mod session_service;

pub use model_service::{GenerationKind, OpenAiQuestionGenerator, QuestionGenerator};
pub use quiz_generation_service::QuizGenerationService;
pub use session_service::QuizSessionService;

#[cfg(test)]
pub use model_service::MockQuestionGenerator;
