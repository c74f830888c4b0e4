pub mod controller;
pub mod policy;
pub mod stats;
pub mod timer;

pub use controller::{
    format_remaining, QuestionView, QuizSession, SessionPhase, SessionSnapshot, Submission,
    SubmissionResult, SubmitCheck, SubmitReason, TabSwitchOutcome,
};
pub use policy::SessionPolicy;
pub use stats::{QuestionStatus, SessionStats};
pub use timer::{interval_ticks, wall_clock_ticks, SessionTimer, TickSource, TickSourceFactory};
