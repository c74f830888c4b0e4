use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoQuizAttemptRepository, QuizAttemptRepository},
    services::{
        OpenAiQuestionGenerator, QuestionGenerator, QuizGenerationService, QuizSessionService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub generation_service: Arc<QuizGenerationService>,
    pub session_service: Arc<QuizSessionService>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let attempt_repository =
            Arc::new(MongoQuizAttemptRepository::new(&db, &config.attempts_collection));
        attempt_repository.ensure_indexes().await?;

        let generator = Arc::new(OpenAiQuestionGenerator::new(&config));

        Ok(Self::from_parts(config, generator, attempt_repository))
    }

    /// Wires services around already-built collaborators.
    pub fn from_parts(
        config: Config,
        generator: Arc<dyn QuestionGenerator>,
        attempts: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        let generation_service = Arc::new(QuizGenerationService::new(generator, &config));
        let session_service = Arc::new(
            QuizSessionService::new(
                Arc::clone(&generation_service),
                Arc::clone(&attempts),
                config.session_policy(),
            )
            .with_retention(config.submitted_session_retention()),
        );

        Self {
            generation_service,
            session_service,
            attempts,
            config: Arc::new(config),
        }
    }
}
