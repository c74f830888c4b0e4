pub mod quiz_attempt_repository;

pub use quiz_attempt_repository::{MongoQuizAttemptRepository, QuizAttemptRepository};

#[cfg(test)]
pub use quiz_attempt_repository::MockQuizAttemptRepository;
