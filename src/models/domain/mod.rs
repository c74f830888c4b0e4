pub mod question;
pub mod quiz_attempt;
pub use question::Question;
pub use quiz_attempt::{AttemptAnswer, QuizAttempt};
