use serde::Serialize;

use crate::models::domain::{Question, QuizAttempt};
use crate::session::{SessionSnapshot, SubmissionResult, SubmitCheck, TabSwitchOutcome};

/// Body returned by `POST /quiz`.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQuizResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub questions: Vec<Question>,
}

impl From<Vec<Question>> for GeneratedQuizResponse {
    fn from(questions: Vec<Question>) -> Self {
        GeneratedQuizResponse {
            kind: "mcq",
            questions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub session: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitCheckResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub check: SubmitCheck,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub session_id: String,
    pub result: SubmissionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityOutcome {
    Ignored,
    Warned,
    ForcedSubmit,
}

impl From<&TabSwitchOutcome> for VisibilityOutcome {
    fn from(outcome: &TabSwitchOutcome) -> Self {
        match outcome {
            TabSwitchOutcome::Ignored => VisibilityOutcome::Ignored,
            TabSwitchOutcome::Warned { .. } => VisibilityOutcome::Warned,
            TabSwitchOutcome::ForcedSubmit(_) => VisibilityOutcome::ForcedSubmit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VisibilityResponse {
    pub outcome: VisibilityOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub session: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptListResponse {
    pub items: Vec<QuizAttempt>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
