use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::domain::Question;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Body of `POST /quiz`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
    pub prompt: String,
}

/// Body of `POST /api/sessions`. Exactly one of `topic` or `questions` must be given.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_session_source"))]
pub struct StartSessionRequest {
    #[validate(length(min = 1, max = 500))]
    pub topic: Option<String>,

    pub questions: Option<Vec<Question>>,

    #[validate(range(min = 1, max = 86400))]
    pub duration_seconds: Option<u32>,

    #[validate(range(min = 1, max = 10))]
    pub tab_switch_limit: Option<u32>,

    /// Session to discard and replace with the new one.
    pub replaces: Option<String>,
}

fn validate_session_source(request: &StartSessionRequest) -> Result<(), ValidationError> {
    match (&request.topic, &request.questions) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => Err(ValidationError::new("exactly_one_of_topic_or_questions")),
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SelectAnswerRequest {
    #[validate(length(min = 1))]
    pub option: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NavigateRequest {
    pub index: usize,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VisibilityRequest {
    pub hidden: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}
